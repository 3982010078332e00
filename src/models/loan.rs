//! Loan model and lifecycle state

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;

use super::ebook::EBook;

/// Loan lifecycle state. `Ended` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Active,
    Ended,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "active",
            LoanStatus::Ended => "ended",
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(LoanStatus::Active),
            "ended" => Ok(LoanStatus::Ended),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

// SQLx conversion for LoanStatus
impl sqlx::Type<Postgres> for LoanStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for LoanStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// A user borrowing one title. References are identifiers only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ebook_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub status: LoanStatus,
    pub ended_at: Option<DateTime<Utc>>,
    pub reminder_sent_at: Option<DateTime<Utc>>,
}

impl Loan {
    /// Open a new active loan, due after the title's maximum loan duration
    pub fn start(user_id: Uuid, ebook: &EBook, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            ebook_id: ebook.id,
            start_date: now,
            due_date: now + Duration::days(i64::from(ebook.max_loan_duration)),
            status: LoanStatus::Active,
            ended_at: None,
            reminder_sent_at: None,
        }
    }

    pub fn is_live(&self) -> bool {
        self.status == LoanStatus::Active
    }

    /// Move to `Ended`. Returns false if the loan had already ended.
    pub fn end(&mut self, now: DateTime<Utc>) -> bool {
        if !self.is_live() {
            return false;
        }
        self.status = LoanStatus::Ended;
        self.ended_at = Some(now);
        true
    }
}
