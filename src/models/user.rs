//! User model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Maximum number of loans a user may hold at once
pub const MAX_CONCURRENT_LOANS: i32 = 10;

/// Borrower account. Only `total_loaned` is owned by the lending core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub balance: Decimal,
    pub logged_in: bool,
    pub admin: bool,
    pub total_loaned: i32,
}

impl User {
    /// New account with the registration defaults
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            balance: Decimal::ZERO,
            logged_in: false,
            admin: false,
            total_loaned: 0,
        }
    }

    pub fn logged_in(mut self) -> Self {
        self.logged_in = true;
        self
    }
}
