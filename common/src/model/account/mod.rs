//! Account models and related types

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{precision, Amount};
use crate::error::{Error, Result};
#[cfg(feature = "utoipa")]
use crate::utoipa::ToSchema;

/// Operational state of an account, gating deposits and withdrawals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    /// Open for deposits and withdrawals
    Active,
    /// Temporarily frozen
    Suspended,
    /// Closed; only reachable through deletion
    Cancelled,
}

impl AccountStatus {
    /// Stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "ACTIVE",
            AccountStatus::Suspended => "SUSPENDED",
            AccountStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ACTIVE" => Ok(AccountStatus::Active),
            "SUSPENDED" => Ok(AccountStatus::Suspended),
            "CANCELLED" => Ok(AccountStatus::Cancelled),
            other => Err(Error::Internal(format!("Unknown account status: {}", other))),
        }
    }
}

/// Account classification; carries no behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Savings,
    Checking,
    TermDeposit,
}

impl AccountType {
    /// Stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Savings => "SAVINGS",
            AccountType::Checking => "CHECKING",
            AccountType::TermDeposit => "TERM_DEPOSIT",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "SAVINGS" => Ok(AccountType::Savings),
            "CHECKING" => Ok(AccountType::Checking),
            "TERM_DEPOSIT" => Ok(AccountType::TermDeposit),
            other => Err(Error::Internal(format!("Unknown account type: {}", other))),
        }
    }
}

/// Account model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct Account {
    /// Unique account ID
    pub id: Uuid,
    /// Member holding the account
    pub owner_id: Uuid,
    /// Account number, unique among active accounts
    pub account_number: String,
    /// Current balance
    #[cfg_attr(feature = "utoipa", schema(value_type = String, example = "1000.00"))]
    pub balance: Amount,
    /// Operational status
    pub status: AccountStatus,
    /// Account classification
    pub account_type: AccountType,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
    /// Soft-delete flag; false hides the account from every lookup
    pub active: bool,
    /// Write counter used for optimistic concurrency
    pub version: i64,
}

/// Create account request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct CreateAccountRequest {
    /// Client-chosen ID; generated when absent
    #[serde(default)]
    pub id: Option<Uuid>,
    /// Member holding the account
    pub owner_id: Uuid,
    /// Account number, e.g. `001-123456789`
    pub account_number: String,
    /// Opening balance
    #[cfg_attr(feature = "utoipa", schema(value_type = String, example = "1000.00"))]
    pub balance: Amount,
    /// Account classification
    pub account_type: AccountType,
}

/// Update account request; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct UpdateAccountRequest {
    #[serde(default)]
    pub owner_id: Option<Uuid>,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    #[cfg_attr(feature = "utoipa", schema(value_type = Option<String>))]
    pub balance: Option<Amount>,
    #[serde(default)]
    pub account_type: Option<AccountType>,
    /// Only ACTIVE and SUSPENDED are accepted here
    #[serde(default)]
    pub status: Option<AccountStatus>,
}

impl Account {
    /// Open a new account from a create request
    pub fn open(request: CreateAccountRequest) -> Self {
        let now = Utc::now();
        Self {
            id: request.id.unwrap_or_else(Uuid::new_v4),
            owner_id: request.owner_id,
            account_number: request.account_number,
            balance: precision::round_money(request.balance),
            status: AccountStatus::Active,
            account_type: request.account_type,
            created_at: now,
            updated_at: now,
            active: true,
            version: 0,
        }
    }

    /// Visible to lookups (not soft-deleted)
    pub fn is_visible(&self) -> bool {
        self.active
    }

    /// Visible and not cancelled
    pub fn is_open(&self) -> bool {
        self.active && self.status != AccountStatus::Cancelled
    }

    /// Fail unless the account accepts balance operations
    pub fn ensure_active(&self) -> Result<()> {
        if self.status != AccountStatus::Active {
            return Err(Error::AccountNotActive(format!(
                "account {} is {}",
                self.account_number, self.status
            )));
        }
        Ok(())
    }

    /// Add funds to the balance
    pub fn deposit(&mut self, amount: Amount) -> Result<()> {
        self.ensure_active()?;

        let balance = self
            .balance
            .checked_add(amount)
            .filter(|b| precision::within_money_range(*b))
            .ok_or_else(|| {
                Error::BalanceLimitExceeded(format!(
                    "depositing {} into account {} would exceed {}",
                    amount,
                    self.account_number,
                    precision::MAX_MONEY
                ))
            })?;

        self.balance = precision::round_money(balance);
        self.touch();
        Ok(())
    }

    /// Remove funds from the balance; withdrawing the full balance is allowed
    pub fn withdraw(&mut self, amount: Amount) -> Result<()> {
        self.ensure_active()?;

        if amount > self.balance {
            return Err(Error::InsufficientBalance(format!(
                "requested {} but account {} holds {}",
                amount, self.account_number, self.balance
            )));
        }

        let balance = self.balance.checked_sub(amount).ok_or_else(|| {
            Error::InsufficientBalance(format!(
                "requested {} from account {} is out of range",
                amount, self.account_number
            ))
        })?;
        self.balance = precision::round_money(balance);
        self.touch();
        Ok(())
    }

    /// Apply every supplied field of an update request
    pub fn apply_update(&mut self, request: UpdateAccountRequest) -> Result<()> {
        if request.status == Some(AccountStatus::Cancelled) {
            return Err(Error::ValidationError(
                "accounts are cancelled by deleting them".to_string(),
            ));
        }

        if let Some(owner_id) = request.owner_id {
            self.owner_id = owner_id;
        }
        if let Some(account_number) = request.account_number {
            self.account_number = account_number;
        }
        if let Some(balance) = request.balance {
            self.balance = precision::round_money(balance);
        }
        if let Some(account_type) = request.account_type {
            self.account_type = account_type;
        }
        if let Some(status) = request.status {
            self.status = status;
        }

        self.touch();
        Ok(())
    }

    /// Soft-delete the account
    pub fn cancel(&mut self) {
        self.active = false;
        self.status = AccountStatus::Cancelled;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::dec;

    fn sample_request() -> CreateAccountRequest {
        CreateAccountRequest {
            id: None,
            owner_id: Uuid::new_v4(),
            account_number: "001-123456789".to_string(),
            balance: dec!(1000),
            account_type: AccountType::Savings,
        }
    }

    #[test]
    fn test_open_account() {
        let account = Account::open(sample_request());

        assert_eq!(account.status, AccountStatus::Active);
        assert!(account.active);
        assert_eq!(account.balance.to_string(), "1000.00");
        assert_eq!(account.version, 0);
        assert_eq!(account.created_at, account.updated_at);
    }

    #[test]
    fn test_open_keeps_supplied_id() {
        let id = Uuid::new_v4();
        let account = Account::open(CreateAccountRequest { id: Some(id), ..sample_request() });
        assert_eq!(account.id, id);

        let first = Account::open(sample_request());
        let second = Account::open(sample_request());
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_balance_operations() {
        let mut account = Account::open(sample_request());

        account.deposit(dec!(500)).unwrap();
        assert_eq!(account.balance, dec!(1500));

        account.withdraw(dec!(300)).unwrap();
        assert_eq!(account.balance, dec!(1200));

        account.withdraw(dec!(1200)).unwrap();
        assert_eq!(account.balance, dec!(0));

        let result = account.withdraw(dec!(0.01));
        assert!(matches!(result, Err(Error::InsufficientBalance(_))));
        assert_eq!(account.balance, dec!(0));
    }

    #[test]
    fn test_deposit_past_storable_maximum() {
        let mut account = Account::open(sample_request());
        let before = account.clone();

        for amount in [Amount::MAX, precision::MAX_MONEY] {
            let result = account.deposit(amount);
            assert!(matches!(result, Err(Error::BalanceLimitExceeded(_))));
            assert_eq!(account, before);
        }

        account.deposit(precision::MAX_MONEY - dec!(1000)).unwrap();
        assert_eq!(account.balance, precision::MAX_MONEY);
    }

    #[test]
    fn test_inactive_account_rejects_balance_operations() {
        for status in [AccountStatus::Suspended, AccountStatus::Cancelled] {
            let mut account = Account::open(sample_request());
            account.status = status;

            assert!(matches!(account.deposit(dec!(1)), Err(Error::AccountNotActive(_))));
            assert!(matches!(account.withdraw(dec!(1)), Err(Error::AccountNotActive(_))));
            assert_eq!(account.balance, dec!(1000));
        }
    }

    #[test]
    fn test_apply_update_rejects_cancellation() {
        let mut account = Account::open(sample_request());
        let request = UpdateAccountRequest {
            status: Some(AccountStatus::Cancelled),
            ..Default::default()
        };

        assert!(matches!(account.apply_update(request), Err(Error::ValidationError(_))));
        assert_eq!(account.status, AccountStatus::Active);
    }

    #[test]
    fn test_apply_update_touches_only_supplied_fields() {
        let mut account = Account::open(sample_request());
        let owner = account.owner_id;

        account
            .apply_update(UpdateAccountRequest {
                account_type: Some(AccountType::Checking),
                status: Some(AccountStatus::Suspended),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(account.account_type, AccountType::Checking);
        assert_eq!(account.status, AccountStatus::Suspended);
        assert_eq!(account.owner_id, owner);
        assert_eq!(account.account_number, "001-123456789");
    }

    #[test]
    fn test_cancel() {
        let mut account = Account::open(sample_request());
        account.cancel();

        assert!(!account.is_visible());
        assert!(!account.is_open());
        assert_eq!(account.status, AccountStatus::Cancelled);
    }

    #[test]
    fn test_enum_wire_format() {
        assert_eq!(serde_json::to_string(&AccountType::TermDeposit).unwrap(), "\"TERM_DEPOSIT\"");
        assert_eq!(serde_json::to_string(&AccountStatus::Suspended).unwrap(), "\"SUSPENDED\"");
        assert_eq!("CHECKING".parse::<AccountType>().unwrap(), AccountType::Checking);
        assert!("CLOSED".parse::<AccountStatus>().is_err());
    }
}
