//! Payment model

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Decimal places stored for an amount
pub const AMOUNT_SCALE: u32 = 2;

/// Largest amount in minor units that fits `NUMERIC(12, 2)`
const MAX_AMOUNT_MINOR_UNITS: i64 = 999_999_999_999;

/// Why an amount cannot be recorded as-is, if it cannot
pub fn amount_problem(amount: &Decimal) -> Option<&'static str> {
    if *amount < Decimal::ZERO {
        return Some("Payment amount must not be negative");
    }
    if amount.normalize().scale() > AMOUNT_SCALE {
        return Some("Payment amount must have at most 2 decimal places");
    }
    if *amount > Decimal::new(MAX_AMOUNT_MINOR_UNITS, AMOUNT_SCALE) {
        return Some("Payment amount is too large");
    }
    None
}

/// A payment accepted by the external gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    #[schema(value_type = String, example = "14:05:09")]
    pub payment_time: NaiveTime,
}

impl Payment {
    pub fn new<Tz: TimeZone>(user_id: Uuid, amount: Decimal, at: DateTime<Tz>) -> Self {
        let local = at.naive_local();
        Self {
            id: Uuid::new_v4(),
            user_id,
            amount,
            payment_date: local.date(),
            payment_time: local.time(),
        }
    }
}
