use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::models::{stock_in_range, NewProduct, Product, ProductId, MAX_STOCK};
use crate::error::AppError;
use crate::server::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

/// 创建请求，缺失字段按空值处理，只拒绝格式错误的 JSON
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub stock: u32,
}

/// 更新请求，空 name 与 0 stock 视为不修改
#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub stock: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

fn parse_id(state: &AppState, raw: &str) -> Result<ProductId, AppError> {
    state
        .products
        .id_kind()
        .parse(raw)
        .ok_or_else(AppError::invalid_id)
}

fn bad_body(rejection: JsonRejection) -> AppError {
    AppError::BadRequest(rejection.body_text())
}

fn check_stock(stock: u32) -> Result<(), AppError> {
    if stock_in_range(stock) {
        return Ok(());
    }
    Err(AppError::BadRequest(format!(
        "stock must be between 0 and {}",
        MAX_STOCK
    )))
}

async fn list_products(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Product>>, AppError> {
    let products = state.products.list_products().await?;

    Ok(Json(products))
}

async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Product>, AppError> {
    let id = parse_id(&state, &id)?;

    let product = state.products.get_product(&id).await?;

    Ok(Json(product))
}

async fn create_product(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let Json(payload) = payload.map_err(bad_body)?;
    check_stock(payload.stock)?;

    let product = state
        .products
        .create_product(NewProduct::new(payload.name, payload.stock))
        .await?;

    tracing::info!(id = %product.id, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateProductRequest>, JsonRejection>,
) -> Result<Json<Product>, AppError> {
    let id = parse_id(&state, &id)?;

    // 先确认记录存在，再解析请求体
    let mut product = state.products.get_product(&id).await?;

    let Json(payload) = payload.map_err(bad_body)?;
    if let Some(stock) = payload.stock {
        check_stock(stock)?;
    }
    product.merge(payload.name, payload.stock);

    state.products.update_product(&product).await?;

    tracing::info!(id = %product.id, "product updated");
    Ok(Json(product))
}

async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&state, &id)?;

    state.products.delete_product(&id).await?;

    tracing::info!(id = %id, "product deleted");
    Ok(Json(MessageResponse {
        message: "Product deleted successfully",
    }))
}
