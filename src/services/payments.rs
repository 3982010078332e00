//! Payment submission service

use std::sync::Arc;

use chrono::Local;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{gateway::PaymentGateway, quota::user_not_found};
use crate::{
    error::{AppError, AppResult},
    models::{amount_problem, Payment},
    repository::LendingStore,
};

#[derive(Clone)]
pub struct PaymentsService {
    store: Arc<dyn LendingStore>,
    gateway: Arc<dyn PaymentGateway>,
}

impl PaymentsService {
    pub fn new(store: Arc<dyn LendingStore>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { store, gateway }
    }

    /// Verify a payment with the gateway and record it only once accepted
    pub async fn submit_payment(&self, user_id: Uuid, amount: Decimal) -> AppResult<Payment> {
        // Checked before the gateway call
        if let Some(problem) = amount_problem(&amount) {
            return Err(AppError::Validation(problem.to_string()));
        }

        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or_else(|| user_not_found(user_id))?;

        let payment = Payment::new(user.id, amount, Local::now());

        if let Err(failure) = self.gateway.check(&payment).await {
            tracing::warn!(user_id = %user.id, amount = %amount, "Payment not accepted: {}", failure);
            return Err(failure.into());
        }

        self.store.insert_payment(&payment).await?;
        tracing::info!(payment_id = %payment.id, user_id = %user.id, amount = %amount, "Payment recorded");
        Ok(payment)
    }

    pub async fn list_payments(&self) -> AppResult<Vec<Payment>> {
        self.store.list_payments().await
    }
}
