//! Domain models for the account platform

pub mod account;

pub use account::{Account, AccountStatus, AccountType, CreateAccountRequest, UpdateAccountRequest};
