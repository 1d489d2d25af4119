use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::models::{IdKind, NewProduct, Product, ProductId};
use crate::domain::ports::{ProductRepository, RepositoryError};

const BACKEND: &str = "memory";

/// 进程内仓储，用于本地调试和测试
pub struct InMemoryProductRepository {
    next_id: AtomicU64,
    products: RwLock<BTreeMap<u64, Product>>,
}

impl Default for InMemoryProductRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            products: RwLock::new(BTreeMap::new()),
        }
    }

    fn integer_id(id: &ProductId) -> Result<u64, RepositoryError> {
        id.as_integer().ok_or(RepositoryError::InvalidIdType(BACKEND))
    }

    fn poisoned<E>(_: E) -> RepositoryError {
        RepositoryError::Storage("product store lock poisoned".to_string())
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let product = product.into_product(ProductId::Integer(id));

        self.products
            .write()
            .map_err(Self::poisoned)?
            .insert(id, product.clone());

        Ok(product)
    }

    async fn update(&self, product: &Product) -> Result<(), RepositoryError> {
        let id = Self::integer_id(&product.id)?;
        let mut products = self.products.write().map_err(Self::poisoned)?;

        let existing = products.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        existing.name = product.name.clone();
        existing.stock = product.stock;
        Ok(())
    }

    async fn get_by_id(&self, id: &ProductId) -> Result<Product, RepositoryError> {
        let id = Self::integer_id(id)?;

        self.products
            .read()
            .map_err(Self::poisoned)?
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = self.products.read().map_err(Self::poisoned)?;
        Ok(products.values().cloned().collect())
    }

    async fn delete(&self, id: &ProductId) -> Result<(), RepositoryError> {
        let id = Self::integer_id(id)?;

        self.products
            .write()
            .map_err(Self::poisoned)?
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn id_kind(&self) -> IdKind {
        IdKind::Integer
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn close(&self) {}
}
