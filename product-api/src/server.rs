use axum::Router;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::api::{health, products};
use crate::config::{Backend, Config};
use crate::domain::ports::ProductRepository;
use crate::domain::services::ProductService;
use crate::error::AppError;
use crate::infrastructure::repositories;

#[derive(Clone)]
pub struct AppState {
    pub backend: Backend,
    pub products: ProductService,
}

impl AppState {
    pub fn new(backend: Backend, repository: Arc<dyn ProductRepository>) -> Self {
        Self {
            backend,
            products: ProductService::new(repository),
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let health_routes = health::routes(&state);

    Router::new()
        .merge(products::routes())
        .merge(health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(Arc::new(state))
}

/// 打开存储、启动 HTTP 服务，收到退出信号后关闭存储连接
pub async fn run(config: Config) -> Result<(), AppError> {
    let repository = repositories::connect(&config.database).await?;
    let state = AppState::new(config.database.backend, repository);
    let service = state.products.clone();

    let app = create_app(state);
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(backend = %config.database.backend, "Listening on {}", &addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    tracing::info!("Shutting down, closing storage connection");
    service.close().await;

    served?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C"),
        () = terminate => tracing::info!("Received SIGTERM"),
    }
}
