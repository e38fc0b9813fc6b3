use crate::AccountError;
use order_queue::{Order, Price, Side};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

/// Validation limits applied when accounts are created. Passed in
/// explicitly; there is no process-wide configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AccountConfig {
    pub min_name_len: usize,
    pub min_balance: Price,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            min_name_len: 8,
            min_balance: Price::from_cents(100_000),
        }
    }
}

fn hash_password(password: &str) -> [u8; 32] {
    Sha256::digest(password.as_bytes()).into()
}

/// A brokerage account: holder name, password hash, and cash balance.
/// The balance moves only through [`Account::reflect_order`].
pub struct Account {
    name: String,
    password_hash: [u8; 32],
    balance: RwLock<Price>,
}

impl Account {
    pub(crate) fn new(
        name: &str,
        password: &str,
        balance: Price,
        config: &AccountConfig,
    ) -> Result<Self, AccountError> {
        if name.len() < config.min_name_len {
            return Err(AccountError::NameTooShort {
                name: name.to_string(),
                min_len: config.min_name_len,
            });
        }
        if balance < config.min_balance {
            return Err(AccountError::BelowMinimumBalance {
                balance,
                min_balance: config.min_balance,
            });
        }
        Ok(Self {
            name: name.to_string(),
            password_hash: hash_password(password),
            balance: RwLock::new(balance),
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn balance(&self) -> Price {
        *self.balance.read()
    }

    pub(crate) fn check_password(&self, password: &str) -> bool {
        self.password_hash == hash_password(password)
    }

    /// Applies an executed order to the balance: buys debit, sells credit,
    /// each by execution price times share count.
    pub fn reflect_order(&self, order: &Order, execution_price: Price) {
        let amount = execution_price * order.shares();
        let mut balance = self.balance.write();
        match order.side() {
            Side::Buy => *balance -= amount,
            Side::Sell => *balance += amount,
        }
        info!(
            account = %self.name,
            order = %order.id(),
            %execution_price,
            balance = %*balance,
            "order reflected"
        );
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("name", &self.name)
            .field("balance", &self.balance())
            .finish()
    }
}
