//! E-books repository for database operations

use sqlx::{PgConnection, Pool, Postgres};
use uuid::Uuid;

use crate::{error::AppResult, models::EBook};

#[derive(Clone)]
pub struct EbooksRepository {
    pool: Pool<Postgres>,
}

impl EbooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get e-book by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Option<EBook>> {
        let ebook = sqlx::query_as::<_, EBook>("SELECT * FROM ebooks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(ebook)
    }

    /// List the whole catalog ordered by title
    pub async fn list_all(&self) -> AppResult<Vec<EBook>> {
        let ebooks = sqlx::query_as::<_, EBook>("SELECT * FROM ebooks ORDER BY title, author")
            .fetch_all(&self.pool)
            .await?;
        Ok(ebooks)
    }

    /// Get e-book by ID, locking the row until the transaction ends
    pub async fn lock_by_id(conn: &mut PgConnection, id: Uuid) -> AppResult<Option<EBook>> {
        let ebook = sqlx::query_as::<_, EBook>("SELECT * FROM ebooks WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?;
        Ok(ebook)
    }

    pub async fn set_quantity_available(
        conn: &mut PgConnection,
        id: Uuid,
        quantity: i32,
    ) -> AppResult<()> {
        sqlx::query("UPDATE ebooks SET quantity_available = $1 WHERE id = $2")
            .bind(quantity)
            .bind(id)
            .execute(conn)
            .await?;
        Ok(())
    }
}
