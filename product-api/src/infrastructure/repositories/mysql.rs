use async_trait::async_trait;
use sqlx::{FromRow, MySqlPool};

use crate::domain::models::{IdKind, NewProduct, Product, ProductId};
use crate::domain::ports::{ProductRepository, RepositoryError};

const BACKEND: &str = "mysql";

#[derive(Debug, FromRow)]
struct ProductRow {
    id: u64,
    name: String,
    stock: u32,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: ProductId::Integer(row.id),
            name: row.name,
            stock: row.stock,
        }
    }
}

pub struct MySqlProductRepository {
    pool: MySqlPool,
}

impl MySqlProductRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn integer_id(id: &ProductId) -> Result<u64, RepositoryError> {
        id.as_integer().ok_or(RepositoryError::InvalidIdType(BACKEND))
    }
}

#[async_trait]
impl ProductRepository for MySqlProductRepository {
    async fn create(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let result = sqlx::query(r#"INSERT INTO products (name, stock) VALUES (?, ?)"#)
            .bind(&product.name)
            .bind(product.stock)
            .execute(&self.pool)
            .await?;

        Ok(product.into_product(ProductId::Integer(result.last_insert_id())))
    }

    async fn update(&self, product: &Product) -> Result<(), RepositoryError> {
        let id = Self::integer_id(&product.id)?;

        // 行锁保证检查与更新之间记录不会被删除
        let mut tx = self.pool.begin().await?;

        let exists: Option<(u64,)> =
            sqlx::query_as(r#"SELECT id FROM products WHERE id = ? FOR UPDATE"#)
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        if exists.is_none() {
            tx.rollback().await?;
            return Err(RepositoryError::NotFound);
        }

        sqlx::query(r#"UPDATE products SET name = ?, stock = ? WHERE id = ?"#)
            .bind(&product.name)
            .bind(product.stock)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_by_id(&self, id: &ProductId) -> Result<Product, RepositoryError> {
        let id = Self::integer_id(id)?;

        let row: ProductRow =
            sqlx::query_as(r#"SELECT id, name, stock FROM products WHERE id = ?"#)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> =
            sqlx::query_as(r#"SELECT id, name, stock FROM products ORDER BY id"#)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn delete(&self, id: &ProductId) -> Result<(), RepositoryError> {
        let id = Self::integer_id(id)?;

        let result = sqlx::query(r#"DELETE FROM products WHERE id = ?"#)
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
