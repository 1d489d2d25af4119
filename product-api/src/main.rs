use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use strum::VariantNames;

use product_api::config::{Backend, Config, Overrides};
use product_api::error::AppError;
use product_api::logging::init_logging;
use product_api::server;

#[derive(Parser, Debug)]
#[command(name = "product-api")]
#[command(about = "Product CRUD service with pluggable storage", long_about = None)]
struct Cli {
    /// 存储后端：mysql、postgres、mongodb 或 memory
    #[arg(long = "db", value_parser = parse_backend)]
    db: Option<Backend>,

    /// 配置目录，读取其中的 default.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 监听端口
    #[arg(short, long)]
    port: Option<u16>,
}

fn parse_backend(raw: &str) -> Result<Backend, String> {
    Backend::from_str(raw).map_err(|_| {
        format!(
            "unknown database type `{}`, expected one of: {}",
            raw,
            Backend::VARIANTS.join(", ")
        )
    })
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 加载环境变量
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // 加载配置
    let config = Config::load(cli.config)?.apply(Overrides {
        backend: cli.db,
        port: cli.port,
    });

    // 初始化日志
    init_logging(&config.logging)?;

    tracing::info!(backend = %config.database.backend, "Starting product API");

    server::run(config).await
}
