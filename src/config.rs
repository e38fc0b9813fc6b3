//! Configuration management

use accounts::AccountConfig;
use anyhow::Result;
use broker::BrokerConfig;
use order_queue::Price;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolConfig {
    pub ticker: String,
    pub price: Price,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub broker_name: String,
    pub symbols: Vec<SymbolConfig>,
    pub broker: BrokerConfig,
    pub accounts: AccountConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            broker_name: "RTrade".to_string(),
            symbols: vec![
                SymbolConfig {
                    ticker: "BA".to_string(),
                    price: Price::from_cents(10079),
                },
                SymbolConfig {
                    ticker: "F".to_string(),
                    price: Price::from_cents(1340),
                },
                SymbolConfig {
                    ticker: "PG".to_string(),
                    price: Price::from_cents(7279),
                },
                SymbolConfig {
                    ticker: "T".to_string(),
                    price: Price::from_cents(1930),
                },
            ],
            broker: BrokerConfig::default(),
            accounts: AccountConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
