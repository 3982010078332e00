//! Loan notifications (confirmation, cancellation, due-date reminder)

use async_trait::async_trait;

use crate::{error::AppResult, models::Loan};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanEvent {
    Created,
    Ended,
    DueSoon,
}

/// Delivery of loan notifications. Callers log failures and carry on.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: LoanEvent, loan: &Loan) -> AppResult<()>;
}

/// Notifier that only records the event in the trace log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, event: LoanEvent, loan: &Loan) -> AppResult<()> {
        tracing::info!(
            event = ?event,
            loan_id = %loan.id,
            user_id = %loan.user_id,
            due_date = %loan.due_date,
            "Loan notification"
        );
        Ok(())
    }
}
