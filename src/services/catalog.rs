//! Catalog browsing and recommendations

use std::sync::Arc;

use rand::{seq::SliceRandom, Rng};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::EBook,
    repository::LendingStore,
};

/// Number of titles on the recommendation shelf
pub const RECOMMENDATION_COUNT: usize = 4;

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn LendingStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn LendingStore>) -> Self {
        Self { store }
    }

    pub async fn get_ebook(&self, id: Uuid) -> AppResult<EBook> {
        self.store
            .get_ebook(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("E-book with id {} not found", id)))
    }

    /// Every title, in stock or not
    pub async fn list_ebooks(&self) -> AppResult<Vec<EBook>> {
        self.store.list_ebooks().await
    }

    /// Up to `count` distinct titles drawn at random from the catalog
    pub async fn recommend<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> AppResult<Vec<EBook>> {
        let mut ebooks = self.store.list_ebooks().await?;
        ebooks.shuffle(rng);
        ebooks.truncate(count);
        Ok(ebooks)
    }
}
