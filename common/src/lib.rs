//! Common types and utilities for the account platform
//!
//! This library contains the shared domain model, decimal helpers, error
//! taxonomy and database plumbing used by the account service and the API
//! gateway.

pub mod error;
pub mod model;
pub mod decimal;
pub mod db;

/// Re-export important types
pub use error::{Error, ErrorKind, Result, ErrorExt};
pub use decimal::*;

// Re-export utoipa for use in model ToSchema derives
#[cfg(feature = "utoipa")]
pub use utoipa;
