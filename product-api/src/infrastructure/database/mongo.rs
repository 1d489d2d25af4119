use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};

use crate::config::ConnectionConfig;
use crate::error::AppError;

/// 建立 MongoDB 连接并 ping 一次，返回客户端与目标库
pub async fn init_mongodb(config: &ConnectionConfig) -> Result<(Client, Database), AppError> {
    tracing::info!(host = %config.host, database = %config.database, "Initializing MongoDB client");

    let mut options = ClientOptions::parse(config.mongodb_uri()).await?;
    options.max_pool_size = Some(config.max_connections);
    options.app_name = Some(env!("CARGO_PKG_NAME").to_string());

    let client = Client::with_options(options)?;
    let db = client.database(&config.database);

    // 测试连接
    db.run_command(doc! { "ping": 1 }).await?;

    Ok((client, db))
}
