use std::sync::Arc;

use crate::domain::models::{IdKind, NewProduct, Product, ProductId};
use crate::domain::ports::{ProductRepository, RepositoryError};

/// 产品服务，直接转发到注入的仓储实现
#[derive(Clone)]
pub struct ProductService {
    repository: Arc<dyn ProductRepository>,
}

impl ProductService {
    pub fn new(repository: Arc<dyn ProductRepository>) -> Self {
        Self { repository }
    }

    pub async fn create_product(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        self.repository.create(product).await
    }

    pub async fn update_product(&self, product: &Product) -> Result<(), RepositoryError> {
        self.repository.update(product).await
    }

    pub async fn get_product(&self, id: &ProductId) -> Result<Product, RepositoryError> {
        self.repository.get_by_id(id).await
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        self.repository.list().await
    }

    pub async fn delete_product(&self, id: &ProductId) -> Result<(), RepositoryError> {
        self.repository.delete(id).await
    }

    pub fn id_kind(&self) -> IdKind {
        self.repository.id_kind()
    }

    pub async fn ping(&self) -> Result<(), RepositoryError> {
        self.repository.ping().await
    }

    pub async fn close(&self) {
        self.repository.close().await
    }
}
