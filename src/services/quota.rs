//! Per-user concurrent loan quota

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{User, MAX_CONCURRENT_LOANS},
    repository::LendingTx,
};

#[derive(Debug, Clone, Copy)]
pub struct LoanQuota {
    max_loans: i32,
}

impl Default for LoanQuota {
    fn default() -> Self {
        Self {
            max_loans: MAX_CONCURRENT_LOANS,
        }
    }
}

impl LoanQuota {
    pub fn new(max_loans: i32) -> Self {
        Self { max_loans }
    }

    /// Count one more loan against a logged-in user
    pub async fn admit_loan(&self, tx: &mut dyn LendingTx, user_id: Uuid) -> AppResult<User> {
        let mut user = tx
            .lock_user(user_id)
            .await?
            .ok_or_else(|| user_not_found(user_id))?;

        if !user.logged_in {
            return Err(AppError::NotLoggedIn(format!(
                "User {} must be logged in to borrow",
                user.id
            )));
        }

        if user.total_loaned >= self.max_loans {
            return Err(AppError::LoanLimitExceeded(format!(
                "Maximum loans reached ({}/{})",
                user.total_loaned, self.max_loans
            )));
        }

        user.total_loaned += 1;
        tx.set_total_loaned(user.id, user.total_loaned).await?;
        Ok(user)
    }

    /// Give back one loan slot, never going below zero
    pub async fn release_loan(&self, tx: &mut dyn LendingTx, user_id: Uuid) -> AppResult<User> {
        let mut user = tx
            .lock_user(user_id)
            .await?
            .ok_or_else(|| user_not_found(user_id))?;

        user.total_loaned = (user.total_loaned - 1).max(0);
        tx.set_total_loaned(user.id, user.total_loaned).await?;
        Ok(user)
    }
}

pub(crate) fn user_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("User with id {} not found", id))
}
