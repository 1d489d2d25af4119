use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::MySqlPool;

use crate::config::ConnectionConfig;
use crate::error::AppError;

pub async fn init_mysql(config: &ConnectionConfig) -> Result<MySqlPool, AppError> {
    tracing::info!(host = %config.host, database = %config.database, "Initializing MySQL connection pool");

    let options = MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.database)
        .charset("utf8mb4");

    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    Ok(pool)
}
