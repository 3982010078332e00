//! E-book (catalog title) model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Catalog title. `quantity_available` is only ever written by the inventory ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EBook {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub category: String,
    pub price: Decimal,
    pub description: String,
    pub cover_url: Option<String>,
    pub quantity_available: i32,
    /// Maximum loan length in days
    pub max_loan_duration: i32,
    pub avg_rating: f64,
}

impl EBook {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        quantity_available: i32,
        category: impl Into<String>,
        price: Decimal,
        max_loan_duration: i32,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            author: author.into(),
            category: category.into(),
            price,
            description: description.into(),
            cover_url: None,
            quantity_available,
            max_loan_duration,
            avg_rating: 0.0,
        }
    }

    pub fn in_stock(&self) -> bool {
        self.quantity_available > 0
    }
}
