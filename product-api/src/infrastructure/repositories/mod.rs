pub mod memory;
pub mod mongo;
pub mod mysql;
pub mod postgres;

use std::sync::Arc;

use crate::config::{Backend, DatabaseConfig};
use crate::domain::ports::ProductRepository;
use crate::error::AppError;
use crate::infrastructure::database::{mongo::init_mongodb, mysql::init_mysql, postgres::init_postgres};

pub use memory::InMemoryProductRepository;
pub use mongo::MongoProductRepository;
pub use mysql::MySqlProductRepository;
pub use postgres::PgProductRepository;

/// 按配置的后端打开唯一的存储连接并构建对应仓储
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn ProductRepository>, AppError> {
    let repository: Arc<dyn ProductRepository> = match config.backend {
        Backend::Mysql => Arc::new(MySqlProductRepository::new(init_mysql(&config.mysql).await?)),
        Backend::Postgres => {
            Arc::new(PgProductRepository::new(init_postgres(&config.postgres).await?))
        }
        Backend::Mongodb => {
            let (client, db) = init_mongodb(&config.mongodb).await?;
            Arc::new(MongoProductRepository::new(client, db))
        }
        Backend::Memory => Arc::new(InMemoryProductRepository::new()),
    };

    tracing::info!(backend = %config.backend, "Storage backend ready");
    Ok(repository)
}
