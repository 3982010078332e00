//! Process-local store with the same transactional semantics as Postgres
//!
//! A transaction takes exclusive ownership of the tables and works on a
//! staged copy, so concurrent lending operations serialize and an
//! uncommitted transaction leaves no trace.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{LendingStore, LendingTx};
use crate::{
    error::{AppError, AppResult},
    models::{EBook, Loan, Payment, User},
};

#[derive(Debug, Clone, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    ebooks: HashMap<Uuid, EBook>,
    loans: HashMap<Uuid, Loan>,
    payments: Vec<Payment>,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user (account management lives outside the lending core)
    pub async fn insert_user(&self, user: User) {
        self.tables.lock().await.users.insert(user.id, user);
    }

    /// Seed a catalog title
    pub async fn insert_ebook(&self, ebook: EBook) {
        self.tables.lock().await.ebooks.insert(ebook.id, ebook);
    }
}

#[async_trait]
impl LendingStore for InMemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn begin(&self) -> AppResult<Box<dyn LendingTx>> {
        let guard = self.tables.clone().lock_owned().await;
        let staged = Tables::clone(&guard);
        Ok(Box::new(InMemoryTx { guard, staged }))
    }

    async fn get_user(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn get_ebook(&self, id: Uuid) -> AppResult<Option<EBook>> {
        Ok(self.tables.lock().await.ebooks.get(&id).cloned())
    }

    async fn list_ebooks(&self) -> AppResult<Vec<EBook>> {
        let mut ebooks: Vec<EBook> = self.tables.lock().await.ebooks.values().cloned().collect();
        ebooks.sort_by(|a, b| (&a.title, &a.author).cmp(&(&b.title, &b.author)));
        Ok(ebooks)
    }

    async fn get_loan(&self, id: Uuid) -> AppResult<Option<Loan>> {
        Ok(self.tables.lock().await.loans.get(&id).cloned())
    }

    async fn list_loans_for_user(&self, user_id: Uuid) -> AppResult<Vec<Loan>> {
        let mut loans: Vec<Loan> = self
            .tables
            .lock()
            .await
            .loans
            .values()
            .filter(|loan| loan.user_id == user_id)
            .cloned()
            .collect();
        loans.sort_by_key(|loan| (loan.start_date, loan.id));
        Ok(loans)
    }

    async fn list_loans_due_before(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<Loan>> {
        let mut loans: Vec<Loan> = self
            .tables
            .lock()
            .await
            .loans
            .values()
            .filter(|loan| loan.is_live() && loan.due_date < cutoff && loan.reminder_sent_at.is_none())
            .cloned()
            .collect();
        loans.sort_by_key(|loan| loan.due_date);
        Ok(loans)
    }

    async fn claim_reminder(&self, loan_id: Uuid, at: DateTime<Utc>) -> AppResult<bool> {
        let mut tables = self.tables.lock().await;
        let loan = tables
            .loans
            .get_mut(&loan_id)
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))?;

        if !loan.is_live() || loan.reminder_sent_at.is_some() {
            return Ok(false);
        }
        loan.reminder_sent_at = Some(at);
        Ok(true)
    }

    async fn release_reminder(&self, loan_id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        let mut tables = self.tables.lock().await;
        if let Some(loan) = tables.loans.get_mut(&loan_id) {
            if loan.reminder_sent_at == Some(at) {
                loan.reminder_sent_at = None;
            }
        }
        Ok(())
    }

    async fn insert_payment(&self, payment: &Payment) -> AppResult<()> {
        self.tables.lock().await.payments.push(payment.clone());
        Ok(())
    }

    async fn list_payments(&self) -> AppResult<Vec<Payment>> {
        Ok(self.tables.lock().await.payments.clone())
    }
}

struct InMemoryTx {
    guard: OwnedMutexGuard<Tables>,
    staged: Tables,
}

#[async_trait]
impl LendingTx for InMemoryTx {
    async fn lock_user(&mut self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.staged.users.get(&id).cloned())
    }

    async fn lock_ebook(&mut self, id: Uuid) -> AppResult<Option<EBook>> {
        Ok(self.staged.ebooks.get(&id).cloned())
    }

    async fn lock_loan(&mut self, id: Uuid) -> AppResult<Option<Loan>> {
        Ok(self.staged.loans.get(&id).cloned())
    }

    async fn set_quantity_available(&mut self, ebook_id: Uuid, quantity: i32) -> AppResult<()> {
        let ebook = self
            .staged
            .ebooks
            .get_mut(&ebook_id)
            .ok_or_else(|| AppError::NotFound(format!("EBook with id {} not found", ebook_id)))?;
        ebook.quantity_available = quantity;
        Ok(())
    }

    async fn set_total_loaned(&mut self, user_id: Uuid, total: i32) -> AppResult<()> {
        let user = self
            .staged
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", user_id)))?;
        user.total_loaned = total;
        Ok(())
    }

    async fn insert_loan(&mut self, loan: &Loan) -> AppResult<()> {
        self.staged.loans.insert(loan.id, loan.clone());
        Ok(())
    }

    async fn save_loan(&mut self, loan: &Loan) -> AppResult<()> {
        let stored = self
            .staged
            .loans
            .get_mut(&loan.id)
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan.id)))?;
        stored.status = loan.status;
        stored.ended_at = loan.ended_at;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let InMemoryTx { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
}
