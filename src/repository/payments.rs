//! Payments repository for database operations

use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::Payment};

#[derive(Clone)]
pub struct PaymentsRepository {
    pool: Pool<Postgres>,
}

impl PaymentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, payment: &Payment) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO payments (id, user_id, amount, payment_date, payment_time)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(payment.id)
        .bind(payment.user_id)
        .bind(payment.amount)
        .bind(payment.payment_date)
        .bind(payment.payment_time)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn list_all(&self) -> AppResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments ORDER BY payment_date, payment_time",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(payments)
    }
}
