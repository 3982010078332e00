//! HorsePay adapter against a local stub server

use std::{sync::Arc, time::Duration};

use axum::{http::StatusCode, routing::post, Json, Router};
use ebook_lending_server::{
    config::PaymentConfig,
    error::AppError,
    repository::{InMemoryStore, LendingStore},
    services::{
        gateway::{GatewayFailure, HorsePayGateway, PaymentGateway},
        notifications::LogNotifier,
    },
};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use crate::common::*;

/// Serve `app` on an ephemeral port and return the endpoint URL
async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/HorsePay.php", addr)
}

fn config(endpoint: String, timeout_secs: u64) -> PaymentConfig {
    PaymentConfig {
        endpoint,
        timeout_secs,
        ..PaymentConfig::default()
    }
}

/// Accepts only well-formed requests from the configured store
async fn strict_horsepay(Json(body): Json<Value>) -> Json<Value> {
    let well_formed = body["storeID"] == "Team13"
        && body["customerID"].is_string()
        && body["transactionAmount"].is_number()
        && body["currencyCode"] == "GBP"
        && body["forcePaymentSatusReturnType"] == true;

    Json(json!({ "paymentSuccess": { "Status": well_formed, "reason": "bad request" } }))
}

async fn payment(gateway: HorsePayGateway) -> Result<(), GatewayFailure> {
    let payment = ebook_lending_server::models::Payment::new(
        uuid::Uuid::new_v4(),
        Decimal::new(499, 2),
        chrono::Local::now(),
    );
    gateway.check(&payment).await
}

#[tokio::test]
async fn test_accepted_payment() {
    let endpoint = serve(Router::new().route("/HorsePay.php", post(strict_horsepay))).await;
    let gateway = HorsePayGateway::new(&config(endpoint, 5)).unwrap();

    assert_eq!(payment(gateway).await, Ok(()));
}

#[tokio::test]
async fn test_explicit_rejection() {
    let app = Router::new().route(
        "/HorsePay.php",
        post(|| async { Json(json!({ "paymentSuccess": { "Status": false } })) }),
    );
    let gateway = HorsePayGateway::new(&config(serve(app).await, 5)).unwrap();

    assert!(matches!(payment(gateway).await, Err(GatewayFailure::Rejected(_))));
}

#[tokio::test]
async fn test_empty_body_is_distinct_failure() {
    let app = Router::new().route("/HorsePay.php", post(|| async { "" }));
    let gateway = HorsePayGateway::new(&config(serve(app).await, 5)).unwrap();

    assert_eq!(payment(gateway).await, Err(GatewayFailure::EmptyResponse));
}

#[tokio::test]
async fn test_server_error_fails() {
    let app = Router::new().route(
        "/HorsePay.php",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let gateway = HorsePayGateway::new(&config(serve(app).await, 5)).unwrap();

    assert_eq!(payment(gateway).await, Err(GatewayFailure::HttpStatus(500)));
}

#[tokio::test]
async fn test_slow_gateway_times_out() {
    let app = Router::new().route(
        "/HorsePay.php",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({ "paymentSuccess": { "Status": true } }))
        }),
    );
    let gateway = HorsePayGateway::new(&config(serve(app).await, 1)).unwrap();

    assert_eq!(payment(gateway).await, Err(GatewayFailure::Timeout(1)));
}

#[tokio::test]
async fn test_unreachable_gateway() {
    // Bind then drop to get a port with nothing listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let gateway = HorsePayGateway::new(&config(format!("http://{}/", addr), 2)).unwrap();
    assert!(matches!(payment(gateway).await, Err(GatewayFailure::Unavailable(_))));
}

#[tokio::test]
async fn test_rejected_payment_is_not_persisted() {
    let app = Router::new().route(
        "/HorsePay.php",
        post(|| async { Json(json!({ "paymentSuccess": { "Status": false } })) }),
    );
    let gateway = HorsePayGateway::new(&config(serve(app).await, 5)).unwrap();

    let store = Arc::new(InMemoryStore::new());
    let user = add_user(&store, "Alice").await;
    let services = services_with(store.clone(), Arc::new(gateway), Arc::new(LogNotifier));

    let err = services
        .payments
        .submit_payment(user.id, Decimal::new(250, 2))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::PaymentGateway(_)));
    assert!(store.list_payments().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_accepted_payment_is_persisted() {
    let endpoint = serve(Router::new().route("/HorsePay.php", post(strict_horsepay))).await;
    let gateway = HorsePayGateway::new(&config(endpoint, 5)).unwrap();

    let store = Arc::new(InMemoryStore::new());
    let user = add_user(&store, "Alice").await;
    let services = services_with(store.clone(), Arc::new(gateway), Arc::new(LogNotifier));

    let payment = services
        .payments
        .submit_payment(user.id, Decimal::new(250, 2))
        .await
        .unwrap();

    assert_eq!(store.list_payments().await.unwrap(), vec![payment]);
}
