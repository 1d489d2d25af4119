use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::{IdKind, NewProduct, Product, ProductId};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("ID Not Found")]
    NotFound,

    /// 传入的标识类型与后端不符，只会在装配错误时出现
    #[error("invalid id type for {0} backend")]
    InvalidIdType(&'static str),

    /// 输入超出该后端可存储的范围
    #[error("{0}")]
    InvalidInput(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound,
            other => RepositoryError::Storage(other.to_string()),
        }
    }
}

impl From<mongodb::error::Error> for RepositoryError {
    fn from(err: mongodb::error::Error) -> Self {
        RepositoryError::Storage(err.to_string())
    }
}

/// 产品仓储端口
///
/// 每个存储后端实现一份；所有接收 `ProductId` 的方法只接受 [`ProductRepository::id_kind`]
/// 对应的变体，其余返回 [`RepositoryError::InvalidIdType`]。
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// 持久化新产品并返回带存储层 id 的记录
    async fn create(&self, product: NewProduct) -> Result<Product, RepositoryError>;

    /// 按 `product.id` 覆盖 name/stock，不存在时返回 `NotFound`
    async fn update(&self, product: &Product) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: &ProductId) -> Result<Product, RepositoryError>;

    async fn list(&self) -> Result<Vec<Product>, RepositoryError>;

    async fn delete(&self, id: &ProductId) -> Result<(), RepositoryError>;

    fn id_kind(&self) -> IdKind;

    /// 存储连接存活检查
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// 释放底层连接
    async fn close(&self);
}
