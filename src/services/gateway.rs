//! Payment gateway adapter for the external HorsePay payment-check service
//!
//! One POST per payment, no retries. Transport errors, timeouts, empty or
//! malformed bodies and explicit declines all surface as
//! [`AppError::PaymentGateway`] with distinct messages.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use serde_json::Value;

use crate::{
    config::PaymentConfig,
    error::{AppError, AppResult},
    models::Payment,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayFailure {
    #[error("Payment gateway could not be reached: {0}")]
    Unavailable(String),

    #[error("Payment gateway did not answer within {0} seconds")]
    Timeout(u64),

    #[error("Payment gateway returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Payment gateway returned an empty response")]
    EmptyResponse,

    #[error("Payment gateway returned a malformed response: {0}")]
    Malformed(String),

    #[error("Payment gateway response did not include a payment status")]
    MissingStatus,

    #[error("Payment was declined by the payment gateway: {0}")]
    Rejected(String),
}

impl From<GatewayFailure> for AppError {
    fn from(failure: GatewayFailure) -> Self {
        AppError::PaymentGateway(failure.to_string())
    }
}

/// Verdict source for a payment
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn check(&self, payment: &Payment) -> Result<(), GatewayFailure>;
}

/// Request body expected by HorsePay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentPayload {
    #[serde(rename = "storeID")]
    pub store_id: String,
    #[serde(rename = "customerID")]
    pub customer_id: String,
    pub date: String,
    pub time: String,
    #[serde(rename = "timeZone")]
    pub time_zone: String,
    #[serde(rename = "transactionAmount")]
    pub transaction_amount: f64,
    #[serde(rename = "currencyCode")]
    pub currency_code: String,
    // Field name as spelled by the service
    #[serde(rename = "forcePaymentSatusReturnType")]
    pub force_payment_status_return_type: bool,
}

pub struct HorsePayGateway {
    client: Client,
    endpoint: Url,
    timeout: Duration,
    store_id: String,
    time_zone: String,
    currency_code: String,
}

impl HorsePayGateway {
    /// Build the adapter with a client bounded by the configured timeout
    pub fn new(config: &PaymentConfig) -> AppResult<Self> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| AppError::Internal(format!("Invalid payment endpoint: {}", e)))?;
        let timeout = config.timeout();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            timeout,
            store_id: config.store_id.clone(),
            time_zone: config.time_zone.clone(),
            currency_code: config.currency_code.clone(),
        })
    }

    pub fn payload(&self, payment: &Payment) -> PaymentPayload {
        PaymentPayload {
            store_id: self.store_id.clone(),
            customer_id: payment.user_id.to_string(),
            date: payment.payment_date.format("%Y-%m-%d").to_string(),
            time: payment.payment_time.format("%H:%M:%S").to_string(),
            time_zone: self.time_zone.clone(),
            transaction_amount: payment.amount.to_f64().unwrap_or_default(),
            currency_code: self.currency_code.clone(),
            force_payment_status_return_type: true,
        }
    }

    fn transport_failure(&self, error: reqwest::Error) -> GatewayFailure {
        if error.is_timeout() {
            GatewayFailure::Timeout(self.timeout.as_secs())
        } else {
            GatewayFailure::Unavailable(error.to_string())
        }
    }
}

#[async_trait]
impl PaymentGateway for HorsePayGateway {
    async fn check(&self, payment: &Payment) -> Result<(), GatewayFailure> {
        let payload = self.payload(payment);
        tracing::debug!(payment_id = %payment.id, endpoint = %self.endpoint, "Submitting payment check");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.transport_failure(e))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.transport_failure(e))?;
        interpret_response(status, &body)
    }
}

/// Only a literal `true` at `paymentSuccess.Status` counts as success
pub fn interpret_response(status: StatusCode, body: &[u8]) -> Result<(), GatewayFailure> {
    if !status.is_success() {
        return Err(GatewayFailure::HttpStatus(status.as_u16()));
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(GatewayFailure::EmptyResponse);
    }

    let value: Value =
        serde_json::from_slice(body).map_err(|e| GatewayFailure::Malformed(e.to_string()))?;
    if value.is_null() {
        return Err(GatewayFailure::EmptyResponse);
    }

    let verdict = value
        .get("paymentSuccess")
        .ok_or(GatewayFailure::MissingStatus)?;

    match verdict.get("Status") {
        Some(Value::Bool(true)) => Ok(()),
        Some(Value::Bool(false)) => {
            let reason = verdict
                .get("reason")
                .and_then(Value::as_str)
                .filter(|reason| !reason.is_empty())
                .unwrap_or("no reason given");
            Err(GatewayFailure::Rejected(reason.to_string()))
        }
        Some(other) => Err(GatewayFailure::Malformed(format!(
            "payment status is not a boolean: {}",
            other
        ))),
        None => Err(GatewayFailure::MissingStatus),
    }
}
