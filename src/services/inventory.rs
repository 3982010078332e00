//! Inventory ledger: the only writer of a title's available-copy count

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::EBook,
    repository::LendingTx,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryLedger;

impl InventoryLedger {
    pub fn new() -> Self {
        Self
    }

    /// Take one copy of a title out of stock
    pub async fn reserve_copy(&self, tx: &mut dyn LendingTx, ebook_id: Uuid) -> AppResult<EBook> {
        let mut ebook = tx
            .lock_ebook(ebook_id)
            .await?
            .ok_or_else(|| ebook_not_found(ebook_id))?;

        if !ebook.in_stock() {
            return Err(AppError::OutOfStock(format!(
                "No copies of '{}' are available",
                ebook.title
            )));
        }

        ebook.quantity_available -= 1;
        tx.set_quantity_available(ebook.id, ebook.quantity_available)
            .await?;

        tracing::debug!(
            ebook_id = %ebook.id,
            remaining = ebook.quantity_available,
            "Reserved copy"
        );
        Ok(ebook)
    }

    /// Return one copy of a title to stock
    pub async fn release_copy(&self, tx: &mut dyn LendingTx, ebook_id: Uuid) -> AppResult<EBook> {
        let mut ebook = tx
            .lock_ebook(ebook_id)
            .await?
            .ok_or_else(|| ebook_not_found(ebook_id))?;

        // No upper bound: original stock is not tracked separately.
        ebook.quantity_available += 1;
        tx.set_quantity_available(ebook.id, ebook.quantity_available)
            .await?;

        tracing::debug!(
            ebook_id = %ebook.id,
            available = ebook.quantity_available,
            "Released copy"
        );
        Ok(ebook)
    }
}

fn ebook_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("EBook with id {} not found", id))
}
