use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::domain::models::{IdKind, NewProduct, Product, ProductId};
use crate::domain::ports::{ProductRepository, RepositoryError};

const BACKEND: &str = "postgres";

/// PostgreSQL 没有无符号类型，id 为 BIGSERIAL，stock 为 INTEGER（带 CHECK >= 0）
#[derive(Debug, FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    stock: i32,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let id = u64::try_from(row.id)
            .map_err(|_| RepositoryError::Storage(format!("negative product id {}", row.id)))?;
        let stock = u32::try_from(row.stock)
            .map_err(|_| RepositoryError::Storage(format!("negative stock for product {}", row.id)))?;

        Ok(Product {
            id: ProductId::Integer(id),
            name: row.name,
            stock,
        })
    }
}

pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 超出 BIGINT 范围的 id 不可能存在
    fn integer_id(id: &ProductId) -> Result<Option<i64>, RepositoryError> {
        let id = id.as_integer().ok_or(RepositoryError::InvalidIdType(BACKEND))?;
        Ok(i64::try_from(id).ok())
    }

    fn stock(stock: u32) -> Result<i32, RepositoryError> {
        i32::try_from(stock)
            .map_err(|_| RepositoryError::InvalidInput(format!("stock {} out of range", stock)))
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let (id,): (i64,) =
            sqlx::query_as(r#"INSERT INTO products (name, stock) VALUES ($1, $2) RETURNING id"#)
                .bind(&product.name)
                .bind(Self::stock(product.stock)?)
                .fetch_one(&self.pool)
                .await?;

        let id = u64::try_from(id)
            .map_err(|_| RepositoryError::Storage(format!("negative product id {}", id)))?;
        Ok(product.into_product(ProductId::Integer(id)))
    }

    async fn update(&self, product: &Product) -> Result<(), RepositoryError> {
        let Some(id) = Self::integer_id(&product.id)? else {
            return Err(RepositoryError::NotFound);
        };

        let updated: Option<(i64,)> = sqlx::query_as(
            r#"UPDATE products SET name = $1, stock = $2 WHERE id = $3 RETURNING id"#,
        )
        .bind(&product.name)
        .bind(Self::stock(product.stock)?)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        updated.map(|_| ()).ok_or(RepositoryError::NotFound)
    }

    async fn get_by_id(&self, id: &ProductId) -> Result<Product, RepositoryError> {
        let Some(id) = Self::integer_id(id)? else {
            return Err(RepositoryError::NotFound);
        };

        let row: ProductRow =
            sqlx::query_as(r#"SELECT id, name, stock FROM products WHERE id = $1"#)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> =
            sqlx::query_as(r#"SELECT id, name, stock FROM products ORDER BY id"#)
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn delete(&self, id: &ProductId) -> Result<(), RepositoryError> {
        let Some(id) = Self::integer_id(id)? else {
            return Err(RepositoryError::NotFound);
        };

        let result = sqlx::query(r#"DELETE FROM products WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn id_kind(&self) -> IdKind {
        IdKind::Integer
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
