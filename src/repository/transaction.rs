//! Postgres transaction backing the lending core

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use super::{
    ebooks::EbooksRepository, loans::LoansRepository, users::UsersRepository, LendingTx,
};
use crate::{
    error::AppResult,
    models::{EBook, Loan, User},
};

/// Read-committed transaction; `lock_*` take `FOR UPDATE` row locks
pub struct PgLendingTx {
    tx: Transaction<'static, Postgres>,
}

impl PgLendingTx {
    pub fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl LendingTx for PgLendingTx {
    async fn lock_user(&mut self, id: Uuid) -> AppResult<Option<User>> {
        UsersRepository::lock_by_id(&mut self.tx, id).await
    }

    async fn lock_ebook(&mut self, id: Uuid) -> AppResult<Option<EBook>> {
        EbooksRepository::lock_by_id(&mut self.tx, id).await
    }

    async fn lock_loan(&mut self, id: Uuid) -> AppResult<Option<Loan>> {
        LoansRepository::lock_by_id(&mut self.tx, id).await
    }

    async fn set_quantity_available(&mut self, ebook_id: Uuid, quantity: i32) -> AppResult<()> {
        EbooksRepository::set_quantity_available(&mut self.tx, ebook_id, quantity).await
    }

    async fn set_total_loaned(&mut self, user_id: Uuid, total: i32) -> AppResult<()> {
        UsersRepository::set_total_loaned(&mut self.tx, user_id, total).await
    }

    async fn insert_loan(&mut self, loan: &Loan) -> AppResult<()> {
        LoansRepository::insert(&mut self.tx, loan).await
    }

    async fn save_loan(&mut self, loan: &Loan) -> AppResult<()> {
        LoansRepository::update_status(&mut self.tx, loan).await
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
