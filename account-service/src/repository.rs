//! Repository for account data

use async_trait::async_trait;
use common::db::models::ACCOUNT_COLUMNS;
use common::db::{init_db_pool, DbAccount};
use common::error::{Error, Result};
use common::model::account::{Account, AccountStatus};
use dashmap::DashMap;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

/// Account repository trait defining the interface for account data storage
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Persist a new account
    async fn insert(&self, account: Account) -> Result<Account>;

    /// Get an account by ID, including soft-deleted ones
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>>;

    /// Get a visible account by ID
    async fn find_active_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        Ok(self.find_by_id(id).await?.filter(Account::is_visible))
    }

    /// Get the visible account holding an account number
    async fn find_active_by_number(&self, account_number: &str) -> Result<Option<Account>>;

    /// All visible accounts in ACTIVE status
    async fn list_active(&self) -> Result<Vec<Account>>;

    /// Visible accounts of an owner, newest first
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Account>>;

    /// Write back an account and bump its version.
    ///
    /// With `expected_version` set the write only lands if the stored version
    /// still matches, otherwise it fails with `ConcurrentModification`.
    async fn save(&self, account: Account, expected_version: Option<i64>) -> Result<Account>;
}

/// In-memory repository for account data
pub struct InMemoryAccountRepository {
    /// Accounts by ID
    pub accounts: DashMap<Uuid, Account>,
}

impl InMemoryAccountRepository {
    /// Create a new in-memory account repository
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
        }
    }
}

impl Default for InMemoryAccountRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn insert(&self, account: Account) -> Result<Account> {
        if self.accounts.contains_key(&account.id) {
            return Err(Error::ValidationError(format!("Account id already exists: {}", account.id)));
        }

        let number_taken = self
            .accounts
            .iter()
            .any(|entry| entry.active && entry.account_number == account.account_number);
        if number_taken {
            return Err(Error::DuplicateAccountNumber(account.account_number));
        }

        self.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        Ok(self.accounts.get(&id).map(|a| a.clone()))
    }

    async fn find_active_by_number(&self, account_number: &str) -> Result<Option<Account>> {
        Ok(self
            .accounts
            .iter()
            .find(|entry| entry.active && entry.account_number == account_number)
            .map(|entry| entry.value().clone()))
    }

    async fn list_active(&self) -> Result<Vec<Account>> {
        let accounts = self
            .accounts
            .iter()
            .filter(|entry| entry.active && entry.status == AccountStatus::Active)
            .map(|entry| entry.value().clone())
            .collect();

        Ok(accounts)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Account>> {
        let mut accounts: Vec<Account> = self
            .accounts
            .iter()
            .filter(|entry| entry.active && entry.owner_id == owner_id)
            .map(|entry| entry.value().clone())
            .collect();

        accounts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(accounts)
    }

    async fn save(&self, mut account: Account, expected_version: Option<i64>) -> Result<Account> {
        let mut stored = self
            .accounts
            .get_mut(&account.id)
            .ok_or_else(|| Error::AccountNotFound(account.id.to_string()))?;

        if let Some(expected) = expected_version {
            if stored.version != expected {
                return Err(Error::ConcurrentModification(format!(
                    "account {} is at version {}, expected {}",
                    account.id, stored.version, expected
                )));
            }
        }

        account.version = stored.version + 1;
        *stored = account.clone();
        Ok(account)
    }
}

/// PostgreSQL repository for account data
pub struct PostgresAccountRepository {
    /// Database connection pool
    pool: PgPool,
}

impl PostgresAccountRepository {
    /// Create a new PostgreSQL account repository
    pub async fn new(database_url: Option<String>) -> Result<Self> {
        let database_url = match database_url {
            Some(url) => url,
            None => std::env::var("DATABASE_URL")
                .map_err(|_| Error::ConfigurationError("DATABASE_URL must be set".to_string()))?,
        };

        let pool = init_db_pool(&database_url, 5).await?;
        Ok(Self { pool })
    }

    /// Create a new PostgreSQL account repository with configuration
    pub async fn with_config(config: &crate::config::AccountServiceConfig) -> Result<Self> {
        info!("Connecting to PostgreSQL database with pool size: {}", config.db_pool_size);

        let pool = init_db_pool(&config.database_url, config.db_pool_size).await?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_many(&self, sql: &str, bind: Option<Uuid>) -> Result<Vec<Account>> {
        let mut query = sqlx::query_as::<_, DbAccount>(sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Account::try_from).collect()
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn insert(&self, account: Account) -> Result<Account> {
        debug!("Inserting account {} ({})", account.id, account.account_number);

        let sql = format!(
            "INSERT INTO accounts (id, owner_id, account_number, balance, status, account_type, \
             created_at, updated_at, active, version) \
             VALUES ($1, $2, $3, $4::numeric, $5, $6, $7, $8, $9, $10) \
             RETURNING {}",
            ACCOUNT_COLUMNS
        );

        let row = sqlx::query_as::<_, DbAccount>(&sql)
            .bind(account.id)
            .bind(account.owner_id)
            .bind(&account.account_number)
            .bind(account.balance.to_string())
            .bind(account.status.as_str())
            .bind(account.account_type.as_str())
            .bind(account.created_at)
            .bind(account.updated_at)
            .bind(account.active)
            .bind(account.version)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::from_insert(e, &account.account_number))?;

        Account::try_from(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        debug!("Getting account from database: {}", id);

        let sql = format!("SELECT {} FROM accounts WHERE id = $1", ACCOUNT_COLUMNS);
        let row = sqlx::query_as::<_, DbAccount>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Account::try_from).transpose()
    }

    async fn find_active_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        debug!("Getting active account from database: {}", id);

        let sql = format!("SELECT {} FROM accounts WHERE id = $1 AND active", ACCOUNT_COLUMNS);
        let row = sqlx::query_as::<_, DbAccount>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Account::try_from).transpose()
    }

    async fn find_active_by_number(&self, account_number: &str) -> Result<Option<Account>> {
        debug!("Looking up active account number: {}", account_number);

        let sql = format!(
            "SELECT {} FROM accounts WHERE account_number = $1 AND active",
            ACCOUNT_COLUMNS
        );
        let row = sqlx::query_as::<_, DbAccount>(&sql)
            .bind(account_number)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Account::try_from).transpose()
    }

    async fn list_active(&self) -> Result<Vec<Account>> {
        let sql = format!(
            "SELECT {} FROM accounts WHERE active AND status = 'ACTIVE'",
            ACCOUNT_COLUMNS
        );
        self.fetch_many(&sql, None).await
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Account>> {
        debug!("Listing accounts for owner: {}", owner_id);

        let sql = format!(
            "SELECT {} FROM accounts WHERE owner_id = $1 AND active ORDER BY created_at DESC",
            ACCOUNT_COLUMNS
        );
        self.fetch_many(&sql, Some(owner_id)).await
    }

    async fn save(&self, account: Account, expected_version: Option<i64>) -> Result<Account> {
        debug!("Saving account {} (expected version {:?})", account.id, expected_version);

        // A NULL $9 turns the version predicate off for unguarded writes
        let sql = format!(
            "UPDATE accounts SET owner_id = $2, account_number = $3, balance = $4::numeric, \
             status = $5, account_type = $6, updated_at = $7, active = $8, version = version + 1 \
             WHERE id = $1 AND ($9::bigint IS NULL OR version = $9) \
             RETURNING {}",
            ACCOUNT_COLUMNS
        );

        let row = sqlx::query_as::<_, DbAccount>(&sql)
            .bind(account.id)
            .bind(account.owner_id)
            .bind(&account.account_number)
            .bind(account.balance.to_string())
            .bind(account.status.as_str())
            .bind(account.account_type.as_str())
            .bind(account.updated_at)
            .bind(account.active)
            .bind(expected_version)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::from_insert(e, &account.account_number))?;

        match row {
            Some(row) => Account::try_from(row),
            None => match self.find_by_id(account.id).await? {
                Some(current) => Err(Error::ConcurrentModification(format!(
                    "account {} is at version {}, expected {:?}",
                    account.id, current.version, expected_version
                ))),
                None => Err(Error::AccountNotFound(account.id.to_string())),
            },
        }
    }
}
