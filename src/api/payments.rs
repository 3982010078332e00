//! Payment endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    error::AppResult,
    models::{amount_problem, Payment},
    AppState,
};

/// Submit payment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPaymentRequest {
    /// Paying user
    pub user_id: Uuid,
    /// Amount in the store currency
    #[validate(custom(function = "recordable_amount"))]
    #[schema(value_type = f64, example = 4.99)]
    pub amount: Decimal,
}

fn recordable_amount(amount: &Decimal) -> Result<(), ValidationError> {
    match amount_problem(amount) {
        Some(problem) => Err(ValidationError::new("amount").with_message(problem.into())),
        None => Ok(()),
    }
}

/// Submit a payment for verification by the payment gateway
#[utoipa::path(
    post,
    path = "/api/payments",
    tag = "payments",
    request_body = SubmitPaymentRequest,
    responses(
        (status = 201, description = "Payment accepted and recorded", body = Payment),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse),
        (status = 502, description = "Payment gateway failure or decline", body = crate::error::ErrorResponse)
    )
)]
pub async fn submit_payment(
    State(state): State<AppState>,
    request: Result<Json<SubmitPaymentRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Payment>)> {
    let Json(request) = request?;
    request.validate()?;

    let payment = state
        .services
        .payments
        .submit_payment(request.user_id, request.amount)
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// List recorded payments
#[utoipa::path(
    get,
    path = "/api/payments",
    tag = "payments",
    responses(
        (status = 200, description = "All recorded payments", body = Vec<Payment>)
    )
)]
pub async fn list_payments(State(state): State<AppState>) -> AppResult<Json<Vec<Payment>>> {
    let payments = state.services.payments.list_payments().await?;
    Ok(Json(payments))
}
