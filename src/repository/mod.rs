//! Repository layer for database operations
//!
//! The lending core talks to persistence through [`LendingStore`] and the
//! transactions it opens. Counter mutations (`quantity_available`,
//! `total_loaned`) and loan state changes only happen inside a
//! [`LendingTx`], whose row locks serialize concurrent requests for the
//! same title, user or loan across every process sharing the store.

pub mod ebooks;
pub mod loans;
pub mod memory;
pub mod payments;
pub mod transaction;
pub mod users;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{EBook, Loan, Payment, User},
};

pub use memory::InMemoryStore;
pub use transaction::PgLendingTx;

/// Read access and transaction factory for the lending core
#[async_trait]
pub trait LendingStore: Send + Sync {
    /// Check that the backing store is reachable
    async fn ping(&self) -> AppResult<()>;

    /// Open a transaction. Dropping it without `commit` rolls it back.
    async fn begin(&self) -> AppResult<Box<dyn LendingTx>>;

    async fn get_user(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn get_ebook(&self, id: Uuid) -> AppResult<Option<EBook>>;

    async fn list_ebooks(&self) -> AppResult<Vec<EBook>>;

    async fn get_loan(&self, id: Uuid) -> AppResult<Option<Loan>>;

    /// All loans of a user in any state, oldest first
    async fn list_loans_for_user(&self, user_id: Uuid) -> AppResult<Vec<Loan>>;

    /// Active loans due before `cutoff` that have not been reminded yet
    async fn list_loans_due_before(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<Loan>>;

    /// Stamp `reminder_sent_at` on a still-active, unreminded loan.
    /// Returns false if another sweep already claimed it.
    async fn claim_reminder(&self, loan_id: Uuid, at: DateTime<Utc>) -> AppResult<bool>;

    /// Undo a claim made at `at` so a later sweep retries the loan
    async fn release_reminder(&self, loan_id: Uuid, at: DateTime<Utc>) -> AppResult<()>;

    async fn insert_payment(&self, payment: &Payment) -> AppResult<()>;

    async fn list_payments(&self) -> AppResult<Vec<Payment>>;
}

/// A unit of work holding row locks until commit or rollback
#[async_trait]
pub trait LendingTx: Send {
    async fn lock_user(&mut self, id: Uuid) -> AppResult<Option<User>>;

    async fn lock_ebook(&mut self, id: Uuid) -> AppResult<Option<EBook>>;

    async fn lock_loan(&mut self, id: Uuid) -> AppResult<Option<Loan>>;

    async fn set_quantity_available(&mut self, ebook_id: Uuid, quantity: i32) -> AppResult<()>;

    async fn set_total_loaned(&mut self, user_id: Uuid, total: i32) -> AppResult<()>;

    async fn insert_loan(&mut self, loan: &Loan) -> AppResult<()>;

    /// Persist status and `ended_at` of an existing loan
    async fn save_loan(&mut self, loan: &Loan) -> AppResult<()>;

    async fn commit(self: Box<Self>) -> AppResult<()>;

    async fn rollback(self: Box<Self>) -> AppResult<()>;
}

/// Postgres-backed store holding the connection pool and per-table repositories
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub users: users::UsersRepository,
    pub ebooks: ebooks::EbooksRepository,
    pub loans: loans::LoansRepository,
    pub payments: payments::PaymentsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            ebooks: ebooks::EbooksRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            payments: payments::PaymentsRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl LendingStore for Repository {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn begin(&self) -> AppResult<Box<dyn LendingTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgLendingTx::new(tx)))
    }

    async fn get_user(&self, id: Uuid) -> AppResult<Option<User>> {
        self.users.get_by_id(id).await
    }

    async fn get_ebook(&self, id: Uuid) -> AppResult<Option<EBook>> {
        self.ebooks.get_by_id(id).await
    }

    async fn list_ebooks(&self) -> AppResult<Vec<EBook>> {
        self.ebooks.list_all().await
    }

    async fn get_loan(&self, id: Uuid) -> AppResult<Option<Loan>> {
        self.loans.get_by_id(id).await
    }

    async fn list_loans_for_user(&self, user_id: Uuid) -> AppResult<Vec<Loan>> {
        self.loans.list_for_user(user_id).await
    }

    async fn list_loans_due_before(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<Loan>> {
        self.loans.list_due_before(cutoff).await
    }

    async fn claim_reminder(&self, loan_id: Uuid, at: DateTime<Utc>) -> AppResult<bool> {
        self.loans.claim_reminder(loan_id, at).await
    }

    async fn release_reminder(&self, loan_id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        self.loans.release_reminder(loan_id, at).await
    }

    async fn insert_payment(&self, payment: &Payment) -> AppResult<()> {
        self.payments.insert(payment).await
    }

    async fn list_payments(&self) -> AppResult<Vec<Payment>> {
        self.payments.list_all().await
    }
}
