use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};
use crate::error::AppError;

const FALLBACK_LEVEL: &str = "info";

fn parse_level(level: &str) -> Result<EnvFilter, String> {
    EnvFilter::try_new(level).map_err(|e| e.to_string())
}

/// 日志过滤：`RUST_LOG` 优先，其次配置中的 level，level 写错时退回 info
fn build_filter(level: &str) -> (EnvFilter, Option<String>) {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return (filter, None);
    }

    match parse_level(level) {
        Ok(filter) => (filter, None),
        Err(reason) => (EnvFilter::new(FALLBACK_LEVEL), Some(reason)),
    }
}

pub fn init_logging(config: &LoggingConfig) -> Result<(), AppError> {
    let (env_filter, invalid_level) = build_filter(&config.level);

    let formatting_layer = match config.format {
        LogFormat::Json => fmt::layer().json().with_current_span(true).boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
    };

    registry()
        .with(env_filter)
        .with(formatting_layer)
        .try_init()
        .map_err(|e| AppError::Internal(format!("Failed to initialize logging: {}", e)))?;

    if let Some(reason) = invalid_level {
        tracing::warn!(level = %config.level, %reason, "invalid log level, falling back to {}", FALLBACK_LEVEL);
    }
    tracing::debug!(format = %config.format, "logging initialized");

    Ok(())
}
