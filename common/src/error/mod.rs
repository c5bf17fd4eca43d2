//! Error types for the account platform
//!
//! This module provides a unified error handling system for the account
//! service and its HTTP surface. Every failure carries a variant naming its
//! cause and a human-readable message; [`Error::kind`] folds the variants into
//! the coarse taxonomy callers map to status codes.

use std::fmt::Display;
use thiserror::Error;

/// PostgreSQL SQLSTATE for unique constraint violations
const UNIQUE_VIOLATION: &str = "23505";

/// Account platform error type
#[derive(Debug, Error)]
pub enum Error {
    /// Error when an account cannot be found
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Error when an active account already uses the account number
    #[error("Account number already exists: {0}")]
    DuplicateAccountNumber(String),

    /// Error when a balance operation targets an account that is not ACTIVE
    #[error("Account not active: {0}")]
    AccountNotActive(String),

    /// Error when an account has insufficient funds
    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),

    /// Error when a deposit would push the balance past the storable maximum
    #[error("Balance limit exceeded: {0}")]
    BalanceLimitExceeded(String),

    /// Error when the stored record changed between read and write
    #[error("Concurrent modification: {0}")]
    ConcurrentModification(String),

    /// Generic validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Database migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Decimal conversion error
    #[error("Decimal conversion error: {0}")]
    DecimalError(String),
}

/// Coarse error classification used at the service boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The requested record does not resolve to a visible account
    NotFound,
    /// A business rule rejected the operation
    Conflict,
    /// The input was malformed
    Validation,
    /// Anything else
    Internal,
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::AccountNotFound(_) => ErrorKind::NotFound,
            Error::DuplicateAccountNumber(_)
            | Error::AccountNotActive(_)
            | Error::InsufficientBalance(_)
            | Error::BalanceLimitExceeded(_)
            | Error::ConcurrentModification(_) => ErrorKind::Conflict,
            Error::ValidationError(_) => ErrorKind::Validation,
            Error::ConfigurationError(_)
            | Error::Internal(_)
            | Error::Database(_)
            | Error::Migration(_)
            | Error::DecimalError(_) => ErrorKind::Internal,
        }
    }

    /// Translate a unique-constraint violation into a duplicate account number error.
    ///
    /// Any other database error is returned unchanged.
    pub fn from_insert(err: sqlx::Error, account_number: &str) -> Self {
        let is_unique_violation = err
            .as_database_error()
            .and_then(|db| db.code())
            .map(|code| code == UNIQUE_VIOLATION)
            .unwrap_or(false);

        if is_unique_violation {
            Error::DuplicateAccountNumber(account_number.to_string())
        } else {
            Error::Database(err)
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait to add context to error results
pub trait ErrorExt<T> {
    /// Add context information to an error
    fn with_context<C, F>(self, context_fn: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Display;
}

impl<T> ErrorExt<T> for Result<T> {
    fn with_context<C, F>(self, context_fn: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Display,
    {
        self.map_err(|e| {
            let context = context_fn().to_string();
            match e {
                Error::AccountNotFound(msg) => Error::AccountNotFound(format!("{}: {}", context, msg)),
                Error::DuplicateAccountNumber(msg) => Error::DuplicateAccountNumber(format!("{}: {}", context, msg)),
                Error::AccountNotActive(msg) => Error::AccountNotActive(format!("{}: {}", context, msg)),
                Error::InsufficientBalance(msg) => Error::InsufficientBalance(format!("{}: {}", context, msg)),
                Error::BalanceLimitExceeded(msg) => Error::BalanceLimitExceeded(format!("{}: {}", context, msg)),
                Error::ConcurrentModification(msg) => Error::ConcurrentModification(format!("{}: {}", context, msg)),
                Error::ValidationError(msg) => Error::ValidationError(format!("{}: {}", context, msg)),
                Error::ConfigurationError(msg) => Error::ConfigurationError(format!("{}: {}", context, msg)),
                Error::Internal(msg) => Error::Internal(format!("{}: {}", context, msg)),
                Error::Database(e) => Error::Database(e),
                Error::Migration(e) => Error::Migration(e),
                Error::DecimalError(msg) => Error::DecimalError(format!("{}: {}", context, msg)),
            }
        })
    }
}

/// Convert string messages into an error
impl From<String> for Error {
    fn from(message: String) -> Self {
        Error::Internal(message)
    }
}

/// Convert static string references into an error
impl From<&str> for Error {
    fn from(message: &str) -> Self {
        Error::Internal(message.to_string())
    }
}

/// From rust_decimal::Error
impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::DecimalError(err.to_string())
    }
}
