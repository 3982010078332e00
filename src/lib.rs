//! E-book lending server
//!
//! REST JSON API for renting e-books: an inventory ledger of available
//! copies, a per-user concurrent loan quota, the loan lifecycle tying the
//! two together, and payment verification through an external gateway.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
