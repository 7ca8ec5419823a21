//! Exchange connectivity: REST clients, signing and retries

pub mod client;
pub mod binance;
pub mod kraken;
pub mod signing;
pub mod retry;

pub use client::*;
pub use binance::*;
pub use kraken::*;
pub use retry::*;

use std::sync::Arc;
use crate::{
    config::Config,
    errors::{BotError, BotResult},
};

/// Builds one client per configured exchange.
pub fn build_clients(config: &Config) -> BotResult<Vec<Arc<dyn ExchangeClient>>> {
    config
        .exchanges
        .iter()
        .map(|venue| -> BotResult<Arc<dyn ExchangeClient>> {
            let fees = config.detection.fees.for_venue(venue);
            let credentials = config.credentials_for(venue).cloned();
            match venue.as_str() {
                "binance" => Ok(Arc::new(BinanceClient::new(&config.binance_api_url, credentials, fees)?)),
                "kraken" => Ok(Arc::new(KrakenClient::new(&config.kraken_api_url, credentials, fees)?)),
                other => Err(BotError::config("EXCHANGES", format!("unsupported exchange: {}", other))),
            }
        })
        .collect()
}
