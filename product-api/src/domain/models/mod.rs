pub mod product;

pub use product::{stock_in_range, IdKind, NewProduct, Product, ProductId, MAX_STOCK};
