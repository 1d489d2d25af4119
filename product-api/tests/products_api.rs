use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use mongodb::bson::oid::ObjectId;

use product_api::config::Backend;
use product_api::domain::models::{IdKind, NewProduct, Product, ProductId};
use product_api::domain::ports::{ProductRepository, RepositoryError};
use product_api::infrastructure::repositories::InMemoryProductRepository;
use product_api::server::{create_app, AppState};

const OBJECT_ID: &str = "65f1a2b3c4d5e6f708192a3b";

fn app() -> Router {
    let repository = Arc::new(InMemoryProductRepository::new());
    create_app(AppState::new(Backend::Memory, repository))
}

/// 固定行为的仓储替身：`Object` 模式只认一个 ObjectId，`Failing` 模式所有操作都返回存储错误
enum StubRepository {
    Object(ObjectId),
    Failing,
}

impl StubRepository {
    fn storage_down() -> RepositoryError {
        RepositoryError::Storage("connection refused".to_string())
    }

    fn find(&self, id: &ProductId) -> Result<Product, RepositoryError> {
        match self {
            StubRepository::Failing => Err(Self::storage_down()),
            StubRepository::Object(oid) => match id.as_object() {
                None => Err(RepositoryError::InvalidIdType("mongodb")),
                Some(requested) if requested == *oid => Ok(Product {
                    id: *id,
                    name: "Widget".to_string(),
                    stock: 10,
                }),
                Some(_) => Err(RepositoryError::NotFound),
            },
        }
    }
}

#[async_trait]
impl ProductRepository for StubRepository {
    async fn create(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        match self {
            StubRepository::Failing => Err(Self::storage_down()),
            StubRepository::Object(oid) => Ok(product.into_product(ProductId::Object(*oid))),
        }
    }

    async fn update(&self, product: &Product) -> Result<(), RepositoryError> {
        self.find(&product.id).map(|_| ())
    }

    async fn get_by_id(&self, id: &ProductId) -> Result<Product, RepositoryError> {
        self.find(id)
    }

    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        match self {
            StubRepository::Failing => Err(Self::storage_down()),
            StubRepository::Object(oid) => Ok(vec![self.find(&ProductId::Object(*oid))?]),
        }
    }

    async fn delete(&self, id: &ProductId) -> Result<(), RepositoryError> {
        self.find(id).map(|_| ())
    }

    fn id_kind(&self) -> IdKind {
        match self {
            StubRepository::Object(_) => IdKind::Object,
            StubRepository::Failing => IdKind::Integer,
        }
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        match self {
            StubRepository::Failing => Err(Self::storage_down()),
            StubRepository::Object(_) => Ok(()),
        }
    }

    async fn close(&self) {}
}

fn object_app() -> Router {
    let oid = ObjectId::parse_str(OBJECT_ID).unwrap();
    create_app(AppState::new(Backend::Mongodb, Arc::new(StubRepository::Object(oid))))
}

fn failing_app() -> Router {
    create_app(AppState::new(Backend::Mysql, Arc::new(StubRepository::Failing)))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

#[tokio::test]
async fn test_create_then_get() {
    let app = app();

    let (status, body) = send(
        &app,
        "POST",
        "/products",
        Some(json!({"name": "Widget", "stock": 10})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"id": 1, "name": "Widget", "stock": 10}));

    let (status, body) = send(&app, "GET", "/products/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": 1, "name": "Widget", "stock": 10}));
}

#[tokio::test]
async fn test_create_assigns_distinct_ids_and_ignores_client_id() {
    let app = app();

    let (_, first) = send(&app, "POST", "/products", Some(json!({"id": 42, "name": "A", "stock": 1}))).await;
    let (_, second) = send(&app, "POST", "/products", Some(json!({"name": "B", "stock": 2}))).await;

    assert_eq!(first["id"], json!(1));
    assert_eq!(second["id"], json!(2));
}

#[tokio::test]
async fn test_create_rejects_malformed_body() {
    let app = app();

    let (status, body) = send(
        &app,
        "POST",
        "/products",
        Some(json!({"name": "Widget", "stock": "AAAA"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, "POST", "/products", Some(json!({"name": "Widget", "stock": -1}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method("POST")
        .uri("/products")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "GET", "/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_get_missing_is_not_found() {
    let app = app();

    let (status, body) = send(&app, "GET", "/products/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "ID Not Found"}));
}

#[tokio::test]
async fn test_partial_update() {
    let app = app();
    send(&app, "POST", "/products", Some(json!({"name": "Widget", "stock": 10}))).await;

    let (status, body) = send(
        &app,
        "PUT",
        "/products/1",
        Some(json!({"name": "", "stock": 20})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": 1, "name": "Widget", "stock": 20}));

    let (status, body) = send(&app, "PUT", "/products/1", Some(json!({"name": "Gadget"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": 1, "name": "Gadget", "stock": 20}));

    let (_, body) = send(&app, "GET", "/products/1", None).await;
    assert_eq!(body, json!({"id": 1, "name": "Gadget", "stock": 20}));
}

#[tokio::test]
async fn test_update_missing_does_not_create() {
    let app = app();

    let (status, body) = send(
        &app,
        "PUT",
        "/products/1",
        Some(json!({"name": "Product A", "stock": 100})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "ID Not Found"}));

    let (_, body) = send(&app, "GET", "/products", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_update_rejects_malformed_body() {
    let app = app();
    send(&app, "POST", "/products", Some(json!({"name": "Widget", "stock": 10}))).await;

    let (status, _) = send(&app, "PUT", "/products/1", Some(json!({"stock": "many"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, "GET", "/products/1", None).await;
    assert_eq!(body, json!({"id": 1, "name": "Widget", "stock": 10}));
}

#[tokio::test]
async fn test_delete_twice() {
    let app = app();
    send(&app, "POST", "/products", Some(json!({"name": "Widget", "stock": 10}))).await;

    let (status, body) = send(&app, "DELETE", "/products/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Product deleted successfully"}));

    let (status, body) = send(&app, "DELETE", "/products/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "ID Not Found"}));

    let (status, _) = send(&app, "GET", "/products/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list() {
    let app = app();

    let (status, body) = send(&app, "GET", "/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    send(&app, "POST", "/products", Some(json!({"name": "Product A", "stock": 100}))).await;
    send(&app, "POST", "/products", Some(json!({"name": "Product B", "stock": 50}))).await;

    let (status, body) = send(&app, "GET", "/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"id": 1, "name": "Product A", "stock": 100},
            {"id": 2, "name": "Product B", "stock": 50}
        ])
    );
}

#[tokio::test]
async fn test_invalid_id_on_every_route() {
    let app = app();
    send(&app, "POST", "/products", Some(json!({"name": "Widget", "stock": 10}))).await;

    // 非数字、负数，以及与 memory 后端不匹配的 ObjectId
    for raw in ["abc", "-1", "1.5", "65f1a2b3c4d5e6f708192a3b"] {
        let uri = format!("/products/{}", raw);

        let (status, body) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "GET {}", raw);
        assert_eq!(body, json!({"error": "Invalid product ID"}));

        let (status, _) = send(&app, "PUT", &uri, Some(json!({"name": "X"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "PUT {}", raw);

        let (status, _) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "DELETE {}", raw);
    }

    let (_, body) = send(&app, "GET", "/products/1", None).await;
    assert_eq!(body, json!({"id": 1, "name": "Widget", "stock": 10}));
}

#[tokio::test]
async fn test_storage_check_route() {
    let app = app();

    let (status, body) = send(&app, "GET", "/check-memory", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("Successfully connected to Memory"));

    let (status, _) = send(&app, "GET", "/check-mysql", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stock_above_storable_range_is_bad_request() {
    let app = app();

    let (status, body) = send(
        &app,
        "POST",
        "/products",
        Some(json!({"name": "Widget", "stock": 3_000_000_000u64})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        "POST",
        "/products",
        Some(json!({"name": "Widget", "stock": i32::MAX})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        "PUT",
        "/products/1",
        Some(json!({"stock": 3_000_000_000u64})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, "GET", "/products/1", None).await;
    assert_eq!(body["stock"], json!(i32::MAX));
}

#[tokio::test]
async fn test_storage_failure_is_internal_error() {
    let app = failing_app();

    let (status, body) = send(&app, "GET", "/products", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("connection refused"));

    let (status, body) = send(&app, "GET", "/products/1", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, "POST", "/products", Some(json!({"name": "Widget", "stock": 1}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = send(&app, "PUT", "/products/1", Some(json!({"name": "Gadget"}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, body) = send(&app, "DELETE", "/products/1", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());

    let (status, body) = send(&app, "GET", "/check-mysql", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!("Failed to connect to MySQL"));
}

#[tokio::test]
async fn test_object_id_backend_routing() {
    let app = object_app();
    let uri = format!("/products/{}", OBJECT_ID);

    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": OBJECT_ID, "name": "Widget", "stock": 10}));

    let (status, body) = send(&app, "PUT", &uri, Some(json!({"name": "Gadget", "stock": 0}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": OBJECT_ID, "name": "Gadget", "stock": 10}));

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Product deleted successfully"}));

    let (status, body) = send(&app, "POST", "/products", Some(json!({"name": "Widget", "stock": 3}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], json!(OBJECT_ID));

    let (status, _) = send(&app, "GET", "/products/ffffffffffffffffffffffff", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // 整数 id 在 ObjectId 后端上不会到达仓储
    for (method, body) in [("GET", None), ("PUT", Some(json!({"name": "X"}))), ("DELETE", None)] {
        let (status, body) = send(&app, method, "/products/1", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} /products/1", method);
        assert_eq!(body, json!({"error": "Invalid product ID"}));
    }

    let (status, body) = send(&app, "GET", "/check-mongodb", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("Successfully connected to MongoDB"));
}
