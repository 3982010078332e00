//! Loan lifecycle management
//!
//! Creating and terminating a loan each run as one transaction spanning
//! the inventory ledger, the user quota and the loan record. Any failure
//! rolls back every reservation already applied in that transaction.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{
    inventory::InventoryLedger,
    notifications::{LoanEvent, Notifier},
    quota::{user_not_found, LoanQuota},
};
use crate::{
    error::{AppError, AppResult},
    models::Loan,
    repository::{LendingStore, LendingTx},
};

#[derive(Clone)]
pub struct LoansService {
    store: Arc<dyn LendingStore>,
    ledger: InventoryLedger,
    quota: LoanQuota,
    notifier: Arc<dyn Notifier>,
}

impl LoansService {
    pub fn new(store: Arc<dyn LendingStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            ledger: InventoryLedger::new(),
            quota: LoanQuota::default(),
            notifier,
        }
    }

    pub fn with_quota(mut self, quota: LoanQuota) -> Self {
        self.quota = quota;
        self
    }

    /// Rent a title: reserve a copy, admit the loan against the user's quota, record it
    pub async fn create_loan(&self, user_id: Uuid, ebook_id: Uuid) -> AppResult<Loan> {
        let mut tx = self.store.begin().await?;
        let result = self.open_loan(tx.as_mut(), user_id, ebook_id, Utc::now()).await;
        let loan = finish(tx, result).await?;

        tracing::info!(
            loan_id = %loan.id,
            user_id = %loan.user_id,
            ebook_id = %loan.ebook_id,
            due_date = %loan.due_date,
            "Loan created"
        );
        self.notify(LoanEvent::Created, &loan);
        Ok(loan)
    }

    /// End an active loan and give back its copy and quota slot
    pub async fn terminate_loan(&self, loan_id: Uuid) -> AppResult<Loan> {
        let mut tx = self.store.begin().await?;
        let result = self.close_loan(tx.as_mut(), loan_id, Utc::now()).await;
        let loan = finish(tx, result).await?;

        tracing::info!(loan_id = %loan.id, user_id = %loan.user_id, "Loan ended");
        self.notify(LoanEvent::Ended, &loan);
        Ok(loan)
    }

    /// All loans of a user, active and ended
    pub async fn list_loans_for_user(&self, user_id: Uuid) -> AppResult<Vec<Loan>> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or_else(|| user_not_found(user_id))?;
        self.store.list_loans_for_user(user_id).await
    }

    pub async fn get_loan(&self, loan_id: Uuid) -> AppResult<Loan> {
        self.store
            .get_loan(loan_id)
            .await?
            .ok_or_else(|| loan_not_found(loan_id))
    }

    async fn open_loan(
        &self,
        tx: &mut dyn LendingTx,
        user_id: Uuid,
        ebook_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Loan> {
        // Lock order is user, then e-book, matching close_loan.
        let user = tx
            .lock_user(user_id)
            .await?
            .ok_or_else(|| user_not_found(user_id))?;

        if !user.logged_in {
            return Err(AppError::NotLoggedIn(format!(
                "User {} must be logged in to borrow",
                user.id
            )));
        }

        let ebook = tx
            .lock_ebook(ebook_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("EBook with id {} not found", ebook_id)))?;

        self.ledger.reserve_copy(tx, ebook.id).await?;
        self.quota.admit_loan(tx, user.id).await?;

        let loan = Loan::start(user.id, &ebook, now);
        tx.insert_loan(&loan).await?;
        Ok(loan)
    }

    async fn close_loan(
        &self,
        tx: &mut dyn LendingTx,
        loan_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Loan> {
        let mut loan = tx
            .lock_loan(loan_id)
            .await?
            .ok_or_else(|| loan_not_found(loan_id))?;

        if !loan.end(now) {
            return Err(AppError::AlreadyEnded(format!(
                "Loan {} has already ended",
                loan.id
            )));
        }

        self.quota.release_loan(tx, loan.user_id).await?;
        self.ledger.release_copy(tx, loan.ebook_id).await?;
        tx.save_loan(&loan).await?;
        Ok(loan)
    }

    /// Deliver in the background; the caller never waits on the notifier
    fn notify(&self, event: LoanEvent, loan: &Loan) {
        let notifier = self.notifier.clone();
        let loan = loan.clone();

        tokio::spawn(async move {
            if let Err(e) = notifier.notify(event, &loan).await {
                tracing::warn!("Failed to send {:?} notification for loan {}: {}", event, loan.id, e);
            }
        });
    }
}

/// Commit on success, otherwise roll back before handing the error back
async fn finish<T>(tx: Box<dyn LendingTx>, result: AppResult<T>) -> AppResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_error) = tx.rollback().await {
                tracing::error!("Rollback failed: {}", rollback_error);
            }
            tracing::warn!("Lending operation rolled back: {}", e);
            Err(e)
        }
    }
}

fn loan_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Loan with id {} not found", id))
}
