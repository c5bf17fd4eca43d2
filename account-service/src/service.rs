//! Account service implementation

use std::sync::Arc;

use common::decimal::Amount;
use common::error::{Error, ErrorExt, Result};
use common::model::account::{Account, CreateAccountRequest, UpdateAccountRequest};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{AccountServiceConfig, ConcurrencyControl};
use crate::repository::{AccountRepository, InMemoryAccountRepository, PostgresAccountRepository};

/// Account service managing the account lifecycle and balances
pub struct AccountService {
    /// Repository for account data
    repo: Arc<dyn AccountRepository>,
    /// Write guard strategy
    concurrency: ConcurrencyControl,
}

/// Repository Type
pub enum RepositoryType {
    /// In-memory repository
    InMemory,
    /// PostgreSQL repository
    Postgres(Option<String>),
}

impl Default for AccountService {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountService {
    /// Create a new account service backed by memory
    pub fn new() -> Self {
        Self {
            repo: Arc::new(InMemoryAccountRepository::new()),
            concurrency: ConcurrencyControl::default(),
        }
    }

    /// Create a new account service with a specific repository type
    pub async fn with_repository(repo_type: RepositoryType) -> Result<Self> {
        let repo: Arc<dyn AccountRepository> = match repo_type {
            RepositoryType::InMemory => {
                Arc::new(InMemoryAccountRepository::new())
            },
            RepositoryType::Postgres(database_url) => {
                Arc::new(PostgresAccountRepository::new(database_url).await?)
            }
        };

        Ok(Self::from_repository(repo, ConcurrencyControl::default()))
    }

    /// Create a new account service with a configuration
    pub async fn with_config(config: &AccountServiceConfig) -> Result<Self> {
        let repo: Arc<dyn AccountRepository> = Arc::new(
            PostgresAccountRepository::with_config(config).await?
        );

        Ok(Self::from_repository(repo, config.concurrency))
    }

    /// Create a service over any repository
    pub fn from_repository(repo: Arc<dyn AccountRepository>, concurrency: ConcurrencyControl) -> Self {
        Self { repo, concurrency }
    }

    /// Open a new account.
    ///
    /// The opening balance is taken as given; sign checks belong to the caller.
    pub async fn create_account(&self, request: CreateAccountRequest) -> Result<Account> {
        info!("Creating account {} for owner {}", request.account_number, request.owner_id);

        let existing = self.repo.find_active_by_number(&request.account_number).await
            .with_context(|| format!("Failed to look up account number {}", request.account_number))?;
        if existing.is_some() {
            return Err(Error::DuplicateAccountNumber(request.account_number));
        }

        self.repo.insert(Account::open(request)).await
    }

    /// Apply an update to a visible account
    pub async fn update_account(&self, id: Uuid, request: UpdateAccountRequest) -> Result<Account> {
        info!("Updating account {}", id);

        let current = self.load_active(id).await?;

        if let Some(number) = request.account_number.as_deref() {
            if number != current.account_number {
                self.ensure_number_free(number, id).await?;
            }
        }

        self.write(id, true, |account| account.apply_update(request.clone())).await
    }

    /// Get a visible account by ID
    pub async fn get_account(&self, id: Uuid) -> Result<Account> {
        self.load_active(id).await
    }

    /// All visible accounts in ACTIVE status
    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        self.repo.list_active().await
    }

    /// Visible accounts of an owner, newest first
    pub async fn list_accounts_by_owner(&self, owner_id: Uuid) -> Result<Vec<Account>> {
        self.repo.list_by_owner(owner_id).await
            .with_context(|| format!("Failed to list accounts for owner {}", owner_id))
    }

    /// True if the owner still holds an account that is not cancelled
    pub async fn owner_has_open_accounts(&self, owner_id: Uuid) -> Result<bool> {
        let accounts = self.list_accounts_by_owner(owner_id).await?;
        Ok(accounts.iter().any(Account::is_open))
    }

    /// Soft-delete an account
    pub async fn delete_account(&self, id: Uuid) -> Result<()> {
        info!("Cancelling account {}", id);

        self.write(id, true, |account| {
            account.cancel();
            Ok(())
        }).await?;

        Ok(())
    }

    /// Withdraw funds from an account
    pub async fn withdraw(&self, id: Uuid, amount: Amount) -> Result<Account> {
        info!("Withdrawing {} from account {}", amount, id);

        self.write(id, false, |account| account.withdraw(amount)).await
    }

    /// Deposit funds into an account
    pub async fn deposit(&self, id: Uuid, amount: Amount) -> Result<Account> {
        info!("Depositing {} to account {}", amount, id);

        self.write(id, false, |account| account.deposit(amount)).await
    }

    async fn load_active(&self, id: Uuid) -> Result<Account> {
        self.repo.find_active_by_id(id).await
            .with_context(|| format!("Failed to retrieve account {}", id))?
            .ok_or_else(|| Error::AccountNotFound(id.to_string()))
    }

    async fn load_any(&self, id: Uuid) -> Result<Account> {
        self.repo.find_by_id(id).await
            .with_context(|| format!("Failed to retrieve account {}", id))?
            .ok_or_else(|| Error::AccountNotFound(id.to_string()))
    }

    async fn ensure_number_free(&self, number: &str, id: Uuid) -> Result<()> {
        match self.repo.find_active_by_number(number).await? {
            Some(other) if other.id != id => Err(Error::DuplicateAccountNumber(number.to_string())),
            _ => Ok(()),
        }
    }

    /// Read, mutate and write back one account.
    ///
    /// Every guard in `mutate` runs against a fresh read. Under optimistic
    /// control a lost write re-reads and re-runs the guards, so a withdrawal
    /// that raced another one sees the reduced balance.
    async fn write<F>(&self, id: Uuid, visible_only: bool, mut mutate: F) -> Result<Account>
    where
        F: FnMut(&mut Account) -> Result<()> + Send,
    {
        let max_retries = self.concurrency.max_retries();
        let mut attempt = 0;

        loop {
            let mut account = if visible_only {
                self.load_active(id).await?
            } else {
                self.load_any(id).await?
            };
            let expected_version = self.concurrency.expected_version(account.version);

            mutate(&mut account)?;

            match self.repo.save(account, expected_version).await {
                Ok(saved) => {
                    debug!("Account {} written at version {}", id, saved.version);
                    return Ok(saved);
                }
                Err(Error::ConcurrentModification(msg)) if attempt < max_retries => {
                    attempt += 1;
                    warn!("Retrying write to account {} ({}/{}): {}", id, attempt, max_retries, msg);
                }
                Err(e) => return Err(e),
            }
        }
    }
}
