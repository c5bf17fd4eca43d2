use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::decimal::parse_amount;
use crate::error::{Error, ErrorExt, Result};
use crate::model::account::Account;

/// Column list shared by every account query; the balance comes back as text
pub const ACCOUNT_COLUMNS: &str = "id, owner_id, account_number, balance::text AS balance, \
     status, account_type, created_at, updated_at, active, version";

/// Database model for the accounts table
#[derive(Debug, Clone, FromRow)]
pub struct DbAccount {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub account_number: String,
    pub balance: String,
    pub status: String,
    pub account_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub active: bool,
    pub version: i64,
}

impl TryFrom<DbAccount> for Account {
    type Error = Error;

    fn try_from(row: DbAccount) -> Result<Self> {
        let balance = parse_amount(&row.balance)
            .with_context(|| format!("Invalid balance for account {}", row.id))?;

        Ok(Account {
            id: row.id,
            owner_id: row.owner_id,
            account_number: row.account_number,
            balance,
            status: row.status.parse()?,
            account_type: row.account_type.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
            active: row.active,
            version: row.version,
        })
    }
}
