use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use accounts::{AccountManager, MemoryAccountManager};
use broker::Broker;
use exchange::{Exchange, SimulatedExchange};
use order_queue::{Order, Price, Side};
use stocktrader::config::AppConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

const CONFIG_PATH: &str = "stocktrader.toml";
const SETTLE: Duration = Duration::from_millis(250);

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = if Path::new(CONFIG_PATH).exists() {
        AppConfig::load_from_file(CONFIG_PATH)?
    } else {
        AppConfig::default()
    };
    info!("Starting {} v{}", config.broker_name, stocktrader::VERSION);

    let exchange = Arc::new(SimulatedExchange::new(
        config
            .symbols
            .iter()
            .map(|symbol| (symbol.ticker.clone(), symbol.price)),
    ));
    let accounts = Arc::new(MemoryAccountManager::new(config.accounts));
    let broker = Broker::new(
        config.broker_name.clone(),
        Arc::clone(&accounts) as Arc<dyn AccountManager>,
        Arc::clone(&exchange) as Arc<dyn Exchange>,
        &config.broker,
    )?;

    let account = broker.create_account("demo_trader", "t0psecret", Price::from_cents(2_500_000))?;
    info!("Opened account {} with {}", account.name(), account.balance());

    let ba_quote = broker.request_quote("BA")?;
    let f_quote = broker.request_quote("F")?;

    // Market orders placed while the exchange is closed sit in the market
    // queue until the open event releases them.
    broker.place_order(Order::market("demo_trader", "BA", Side::Buy, 100))?;
    broker.place_order(Order::market("demo_trader", "F", Side::Buy, 200))?;
    info!("Placed market orders while closed, balance still {}", account.balance());

    exchange.open();
    thread::sleep(SETTLE);
    info!("After open, balance {}", account.balance());

    // Stop orders wait on their trigger prices: the protective sell sits
    // below the BA market, the stop buy above the F market.
    let sell_trigger = ba_quote.price() - Price::from_cents(500);
    let buy_trigger = f_quote.price() + Price::from_cents(200);
    broker.place_order(Order::stop("demo_trader", "BA", Side::Sell, 100, sell_trigger))?;
    broker.place_order(Order::stop("demo_trader", "F", Side::Buy, 50, buy_trigger))?;

    exchange.set_price("BA", sell_trigger - Price::from_cents(25))?;
    exchange.set_price("F", buy_trigger + Price::from_cents(15))?;
    thread::sleep(SETTLE);
    info!("After price moves, balance {}", account.balance());

    exchange.close();
    broker.close()?;
    info!("Session complete, final balance {}", account.balance());

    Ok(())
}
