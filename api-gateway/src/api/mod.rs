//! API handlers
//!
//! Each handler follows a consistent pattern:
//! - Extract state and parameters using Axum extractors
//! - Validate input at the boundary
//! - Call the account service
//! - Map the result to a standardized response format

pub mod account;
pub mod response;
pub mod validation;

// Re-export the response module for easy access
pub use response::{ApiListResponse, ApiResponse};
