use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;

use crate::config::ConnectionConfig;
use crate::error::AppError;

pub async fn init_postgres(config: &ConnectionConfig) -> Result<PgPool, AppError> {
    tracing::info!(host = %config.host, database = %config.database, "Initializing PostgreSQL connection pool");

    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.database)
        .ssl_mode(PgSslMode::Disable);

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    Ok(pool)
}
