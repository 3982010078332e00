//! Router tests driven through `tower::ServiceExt::oneshot`

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use ebook_lending_server::{
    api,
    repository::InMemoryStore,
    services::{gateway::GatewayFailure, notifications::LogNotifier},
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use crate::common::*;

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn app(store: Arc<InMemoryStore>) -> Router {
    api::router(app_state(services(store)))
}

#[tokio::test]
async fn test_health_and_ready() {
    let app = app(Arc::new(InMemoryStore::new()));

    let (status, body) = send(&app, request("GET", "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, request("GET", "/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_rent_list_and_terminate() {
    let store = Arc::new(InMemoryStore::new());
    let user = add_user(&store, "Alice").await;
    let title = add_ebook(&store, "Dune", 1, 14).await;
    let app = app(store.clone());

    let uri = format!("/api/loan/rent?userId={}&ebookId={}", user.id, title.id);
    let (status, loan) = send(&app, request("POST", &uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loan["status"], "active");
    assert_eq!(loan["userId"], user.id.to_string());
    assert_eq!(loan["ebookId"], title.id.to_string());

    let (status, body) = send(&app, request("POST", &uri)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "OutOfStock");

    let (status, loans) = send(&app, request("GET", &format!("/api/loan/list?userId={}", user.id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loans.as_array().unwrap().len(), 1);

    let loan_id = loan["id"].as_str().unwrap().to_string();
    let (status, ended) = send(&app, request("PATCH", &format!("/api/loan/{}", loan_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ended["status"], "ended");

    let (status, body) = send(&app, request("PATCH", &format!("/api/loan/{}", loan_id))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "LoanAlreadyEnded");
    assert_eq!(quantity(&store, &title).await, 1);
}

#[tokio::test]
async fn test_rent_errors_are_structured() {
    let store = Arc::new(InMemoryStore::new());
    let user = add_user(&store, "Alice").await;
    let app = app(store);

    let (status, body) = send(&app, request("POST", &format!("/api/loan/rent?userId={}", user.id))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");

    let uri = format!("/api/loan/rent?userId={}&ebookId={}", user.id, Uuid::new_v4());
    let (status, body) = send(&app, request("POST", &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NoSuchData");
    assert!(body["message"].as_str().unwrap().contains("not found"));

    let (status, _) = send(&app, request("PATCH", "/api/loan/not-a-uuid")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, request("PATCH", &format!("/api/loan/{}", Uuid::new_v4()))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, request("GET", &format!("/api/loan/list?userId={}", Uuid::new_v4()))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_submit_payment_records_on_success() {
    let store = Arc::new(InMemoryStore::new());
    let user = add_user(&store, "Alice").await;
    let app = app(store);

    let body = json!({ "userId": user.id, "amount": 4.99 });
    let (status, payment) = send(&app, json_request("POST", "/api/payments", body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(payment["userId"], user.id.to_string());

    let (status, payments) = send(&app, request("GET", "/api/payments")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payments.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_rejected_payment_is_not_recorded() {
    let store = Arc::new(InMemoryStore::new());
    let user = add_user(&store, "Alice").await;
    let services = services_with(
        store,
        Arc::new(StubGateway::failing(GatewayFailure::Rejected("insufficient funds".into()))),
        Arc::new(LogNotifier),
    );
    let app = api::router(app_state(services));

    let body = json!({ "userId": user.id, "amount": 10 });
    let (status, error) = send(&app, json_request("POST", "/api/payments", body)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(error["error"], "PaymentFailure");
    assert!(error["message"].as_str().unwrap().contains("insufficient funds"));

    let (_, payments) = send(&app, request("GET", "/api/payments")).await;
    assert!(payments.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_payment_requests() {
    let store = Arc::new(InMemoryStore::new());
    let user = add_user(&store, "Alice").await;
    let app = app(store);

    let negative = json!({ "userId": user.id, "amount": -1 });
    let (status, _) = send(&app, json_request("POST", "/api/payments", negative)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let unknown = json!({ "userId": Uuid::new_v4(), "amount": 1 });
    let (status, _) = send(&app, json_request("POST", "/api/payments", unknown)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let sub_penny = json!({ "userId": user.id, "amount": "1.005" });
    let (status, body) = send(&app, json_request("POST", "/api/payments", sub_penny)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");

    let too_large = json!({ "userId": user.id, "amount": "10000000000.00" });
    let (status, _) = send(&app, json_request("POST", "/api/payments", too_large)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let missing = json!({ "amount": 1 });
    let (status, _) = send(&app, json_request("POST", "/api/payments", missing)).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_catalog_endpoints() {
    let store = Arc::new(InMemoryStore::new());
    let mut first = None;
    for i in 0..10 {
        let ebook = add_ebook(&store, &format!("Title {:02}", i), 1, 14).await;
        first.get_or_insert(ebook);
    }
    let app = app(store);

    let (status, all) = send(&app, request("GET", "/api/ebooks")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 10);

    let (status, picks) = send(&app, request("GET", "/api/ebooks/recommended")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(picks.as_array().unwrap().len(), 4);

    let first = first.unwrap();
    let (status, ebook) = send(&app, request("GET", &format!("/api/ebooks/{}", first.id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ebook["title"], "Title 00");
    assert_eq!(ebook["quantityAvailable"], 1);

    let (status, _) = send(&app, request("GET", &format!("/api/ebooks/{}", Uuid::new_v4()))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = app(Arc::new(InMemoryStore::new()));

    let (status, doc) = send(&app, request("GET", "/api-docs/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/loan/rent"].is_object());
    assert!(doc["paths"]["/api/payments"].is_object());
    assert!(doc["paths"]["/health"].is_object());
    assert!(doc["servers"].is_null());
}
