//! Data models for the lending core

pub mod ebook;
pub mod loan;
pub mod payment;
pub mod user;

// Re-export commonly used types
pub use ebook::EBook;
pub use loan::{Loan, LoanStatus};
pub use payment::{amount_problem, Payment};
pub use user::{User, MAX_CONCURRENT_LOANS};
