//! Newsroom Common Library
//!
//! Shared code for the Newsroom services including:
//! - Database models and repository patterns
//! - Listing filters and pagination
//! - Error types and handling
//! - Configuration management
//! - Authentication utilities
//! - Metrics and observability

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::{DashboardSnapshot, DbPool, Page, Repository};
pub use errors::{AppError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Newspapers per listing page
pub const NEWSPAPER_PAGE_SIZE: u64 = 5;

/// Redactors per listing page
pub const REDACTOR_PAGE_SIZE: u64 = 4;

/// Newspapers shown in the dashboard highlight list
pub const DASHBOARD_LATEST_COUNT: u64 = 3;
