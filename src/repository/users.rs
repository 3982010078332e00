//! Users repository for database operations

use sqlx::{PgConnection, Pool, Postgres};
use uuid::Uuid;

use crate::{error::AppResult, models::User};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Get user by ID, locking the row until the transaction ends
    pub async fn lock_by_id(conn: &mut PgConnection, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?;
        Ok(user)
    }

    pub async fn set_total_loaned(conn: &mut PgConnection, id: Uuid, total: i32) -> AppResult<()> {
        sqlx::query("UPDATE users SET total_loaned = $1 WHERE id = $2")
            .bind(total)
            .bind(id)
            .execute(conn)
            .await?;
        Ok(())
    }
}
