use crate::account::{Account, AccountConfig};
use crate::AccountError;
use order_queue::Price;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Contract the broker requires from account storage.
pub trait AccountManager: Send + Sync {
    fn get_account(&self, name: &str) -> Result<Arc<Account>, AccountError>;

    fn create_account(
        &self,
        name: &str,
        password: &str,
        balance: Price,
    ) -> Result<Arc<Account>, AccountError>;

    fn delete_account(&self, name: &str) -> Result<(), AccountError>;

    fn validate_login(&self, name: &str, password: &str) -> Result<bool, AccountError>;

    fn close(&self) -> Result<(), AccountError>;
}

/// In-memory account store. Accounts live for the manager's lifetime;
/// mutation goes through the shared [`Account`] handles.
pub struct MemoryAccountManager {
    config: AccountConfig,
    accounts: RwLock<HashMap<String, Arc<Account>>>,
    closed: AtomicBool,
}

impl MemoryAccountManager {
    pub fn new(config: AccountConfig) -> Self {
        Self {
            config,
            accounts: RwLock::new(HashMap::new()),
            closed: AtomicBool::new(false),
        }
    }

    fn ensure_open(&self) -> Result<(), AccountError> {
        if self.closed.load(Ordering::Acquire) {
            Err(AccountError::Closed)
        } else {
            Ok(())
        }
    }
}

impl Default for MemoryAccountManager {
    fn default() -> Self {
        Self::new(AccountConfig::default())
    }
}

impl AccountManager for MemoryAccountManager {
    fn get_account(&self, name: &str) -> Result<Arc<Account>, AccountError> {
        self.ensure_open()?;
        self.accounts
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| AccountError::NotFound(name.to_string()))
    }

    fn create_account(
        &self,
        name: &str,
        password: &str,
        balance: Price,
    ) -> Result<Arc<Account>, AccountError> {
        self.ensure_open()?;
        let account = Arc::new(Account::new(name, password, balance, &self.config)?);
        let mut accounts = self.accounts.write();
        if accounts.contains_key(name) {
            return Err(AccountError::AlreadyExists(name.to_string()));
        }
        accounts.insert(name.to_string(), Arc::clone(&account));
        info!(account = name, %balance, "account created");
        Ok(account)
    }

    fn delete_account(&self, name: &str) -> Result<(), AccountError> {
        self.ensure_open()?;
        match self.accounts.write().remove(name) {
            Some(_) => {
                info!(account = name, "account deleted");
                Ok(())
            }
            None => Err(AccountError::NotFound(name.to_string())),
        }
    }

    fn validate_login(&self, name: &str, password: &str) -> Result<bool, AccountError> {
        let account = self.get_account(name)?;
        Ok(account.check_password(password))
    }

    fn close(&self) -> Result<(), AccountError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
