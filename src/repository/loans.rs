//! Loans repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Loan, LoanStatus},
};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(loan)
    }

    /// Get all loans for a user, active and ended
    pub async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(
            "SELECT * FROM loans WHERE user_id = $1 ORDER BY start_date, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }

    /// Active loans due before the cutoff that still need a reminder
    pub async fn list_due_before(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(
            r#"
            SELECT * FROM loans
            WHERE status = $1 AND due_date < $2 AND reminder_sent_at IS NULL
            ORDER BY due_date
            "#,
        )
        .bind(LoanStatus::Active)
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }

    /// Conditional update, so concurrent sweeps claim each loan at most once
    pub async fn claim_reminder(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE loans SET reminder_sent_at = $1
            WHERE id = $2 AND status = $3 AND reminder_sent_at IS NULL
            "#,
        )
        .bind(at)
        .bind(id)
        .bind(LoanStatus::Active)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn release_reminder(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE loans SET reminder_sent_at = NULL WHERE id = $1 AND reminder_sent_at = $2")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Get loan by ID, locking the row until the transaction ends
    pub async fn lock_by_id(conn: &mut PgConnection, id: Uuid) -> AppResult<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?;
        Ok(loan)
    }

    /// Create a new loan
    pub async fn insert(conn: &mut PgConnection, loan: &Loan) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO loans (id, user_id, ebook_id, start_date, due_date, status, ended_at, reminder_sent_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(loan.id)
        .bind(loan.user_id)
        .bind(loan.ebook_id)
        .bind(loan.start_date)
        .bind(loan.due_date)
        .bind(loan.status)
        .bind(loan.ended_at)
        .bind(loan.reminder_sent_at)
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn update_status(conn: &mut PgConnection, loan: &Loan) -> AppResult<()> {
        sqlx::query("UPDATE loans SET status = $1, ended_at = $2 WHERE id = $3")
            .bind(loan.status)
            .bind(loan.ended_at)
            .bind(loan.id)
            .execute(conn)
            .await?;
        Ok(())
    }
}
