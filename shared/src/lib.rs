//! Shared types for the Conch storefront
//!
//! Common types used by the store server and admin tooling: entity models,
//! the unified error system, and utility helpers.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use serde::{Deserialize, Serialize};
