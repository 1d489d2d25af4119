use axum::{extract::State, http::StatusCode, routing::get, Router};
use std::sync::Arc;

use crate::server::AppState;

/// 存储连接检查，路径随后端变化，例如 `/check-mysql`
pub fn routes(state: &AppState) -> Router<Arc<AppState>> {
    Router::new().route(&state.backend.check_path(), get(check_storage))
}

async fn check_storage(State(state): State<Arc<AppState>>) -> (StatusCode, String) {
    let label = state.backend.label();

    match state.products.ping().await {
        Ok(()) => (StatusCode::OK, format!("Successfully connected to {}", label)),
        Err(e) => {
            tracing::warn!(backend = %state.backend, error = %e, "storage ping failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to connect to {}", label),
            )
        }
    }
}
