//! API handlers for the lending REST endpoints

pub mod ebooks;
pub mod health;
pub mod loans;
pub mod openapi;
pub mod payments;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::AppState;

/// Build the application router (without transport layers)
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        // Loans
        .route("/loan/rent", post(loans::rent_ebook))
        .route("/loan/list", get(loans::list_loans))
        .route("/loan/:loan_id", patch(loans::terminate_loan))
        // Payments
        .route("/payments", post(payments::submit_payment))
        .route("/payments", get(payments::list_payments))
        // Catalog
        .route("/ebooks", get(ebooks::list_ebooks))
        .route("/ebooks/recommended", get(ebooks::recommended_ebooks))
        .route("/ebooks/:id", get(ebooks::get_ebook));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/api", api)
        .with_state(state)
        .merge(openapi::create_openapi_router())
}
