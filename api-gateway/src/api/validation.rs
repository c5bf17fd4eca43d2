//! Request validation at the HTTP boundary.
//!
//! The account service trusts its inputs; malformed shapes are rejected here
//! before they reach it.

use common::decimal::{precision, Amount};
use common::model::account::{CreateAccountRequest, UpdateAccountRequest};
use uuid::Uuid;

use crate::error::ApiError;

/// Check the `NNN-NNNNNNNNN` account number layout
pub fn validate_account_number(number: &str) -> Result<(), ApiError> {
    let mut parts = number.splitn(2, '-');
    let branch = parts.next().unwrap_or_default();
    let serial = parts.next().unwrap_or_default();

    let all_digits = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_digit());
    if all_digits(branch, 3) && all_digits(serial, 9) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "account_number must look like 001-123456789, got '{}'",
            number
        )))
    }
}

fn validate_precision(field: &str, amount: Amount) -> Result<(), ApiError> {
    if !precision::within_money_range(amount) {
        return Err(ApiError::BadRequest(format!(
            "{} must not exceed {}",
            field,
            precision::MAX_MONEY
        )));
    }
    if precision::has_money_precision(amount) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "{} allows at most {} decimal places",
            field,
            precision::MONEY_SCALE
        )))
    }
}

/// Opening or overwritten balances may be zero but not negative
pub fn validate_balance(balance: Amount) -> Result<(), ApiError> {
    if balance < Amount::ZERO {
        return Err(ApiError::BadRequest("balance must not be negative".to_string()));
    }
    validate_precision("balance", balance)
}

/// Deposit and withdrawal amounts must be strictly positive
pub fn validate_amount(amount: Amount) -> Result<(), ApiError> {
    if amount <= Amount::ZERO {
        return Err(ApiError::BadRequest("amount must be greater than zero".to_string()));
    }
    validate_precision("amount", amount)
}

fn validate_owner(owner_id: Uuid) -> Result<(), ApiError> {
    if owner_id.is_nil() {
        return Err(ApiError::BadRequest("owner_id must not be the nil UUID".to_string()));
    }
    Ok(())
}

pub fn validate_create(request: &CreateAccountRequest) -> Result<(), ApiError> {
    validate_owner(request.owner_id)?;
    validate_account_number(&request.account_number)?;
    validate_balance(request.balance)
}

pub fn validate_update(request: &UpdateAccountRequest) -> Result<(), ApiError> {
    if let Some(owner_id) = request.owner_id {
        validate_owner(owner_id)?;
    }
    if let Some(number) = &request.account_number {
        validate_account_number(number)?;
    }
    if let Some(balance) = request.balance {
        validate_balance(balance)?;
    }
    Ok(())
}
