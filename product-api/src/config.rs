use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use strum_macros::{Display, EnumString, VariantNames};

use crate::error::AppError;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, EnumString, VariantNames, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Backend {
    Mysql,
    Postgres,
    Mongodb,
    Memory,
}

impl Backend {
    /// 日志与健康检查中展示的名称
    pub fn label(&self) -> &'static str {
        match self {
            Backend::Mysql => "MySQL",
            Backend::Postgres => "PostgreSQL",
            Backend::Mongodb => "MongoDB",
            Backend::Memory => "Memory",
        }
    }

    /// 健康检查路径，例如 `/check-mysql`
    pub fn check_path(&self) -> String {
        format!("/check-{}", self)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub backend: Backend,
    pub mysql: ConnectionConfig,
    pub postgres: ConnectionConfig,
    pub mongodb: ConnectionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    #[serde(default)]
    pub password: String,
    pub database: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

/// 命令行覆盖项
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub backend: Option<Backend>,
    pub port: Option<u16>,
}

impl Config {
    /// 加载顺序：内置默认值 → `<dir>/default.toml`（可选）→ `APP__*` 环境变量
    pub fn load(config_dir: Option<PathBuf>) -> Result<Self, AppError> {
        let config_dir = config_dir.unwrap_or_else(|| {
            PathBuf::from(env::var("CONFIG_PATH").unwrap_or_else(|_| "config".to_string()))
        });

        let builder = Self::defaults()?
            .add_source(config::File::from(Path::new(&config_dir).join("default")).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        let config: Config = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, AppError> {
        let builder = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.backend", "mysql")?
            .set_default("database.mysql.host", "127.0.0.1")?
            .set_default("database.mysql.port", 3306)?
            .set_default("database.mysql.user", "root")?
            .set_default("database.mysql.password", "")?
            .set_default("database.mysql.database", "db_store_go")?
            .set_default("database.mysql.max_connections", 10)?
            .set_default("database.postgres.host", "localhost")?
            .set_default("database.postgres.port", 5432)?
            .set_default("database.postgres.user", "postgres")?
            .set_default("database.postgres.password", "admin")?
            .set_default("database.postgres.database", "db_store_go")?
            .set_default("database.postgres.max_connections", 10)?
            .set_default("database.mongodb.host", "localhost")?
            .set_default("database.mongodb.port", 27017)?
            .set_default("database.mongodb.user", "")?
            .set_default("database.mongodb.password", "")?
            .set_default("database.mongodb.database", "mydb")?
            .set_default("database.mongodb.max_connections", 10)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?;
        Ok(builder)
    }

    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(backend) = overrides.backend {
            self.database.backend = backend;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        self
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl ConnectionConfig {
    /// MongoDB 连接串，未配置用户时不带认证信息
    pub fn mongodb_uri(&self) -> String {
        if self.user.is_empty() {
            format!("mongodb://{}:{}", self.host, self.port)
        } else {
            format!(
                "mongodb://{}:{}@{}:{}",
                self.user, self.password, self.host, self.port
            )
        }
    }
}
