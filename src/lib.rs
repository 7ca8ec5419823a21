//! Spread Arbitrage Bot - cross-exchange spread detection for one spot instrument
//!
//! Polls top-of-book prices for a single instrument on several centralized
//! exchanges, finds fee-adjusted spreads where buying on one venue and
//! selling on another clears a profit threshold, sizes the trade against the
//! balances on both legs and executes it (or simulates it in dry-run mode).

pub mod config;
pub mod types;
pub mod errors;
pub mod network;
pub mod arbitrage;
pub mod execution;
pub mod validation;
pub mod monitor;
pub mod utils;

// Re-export commonly used items
pub use config::Config;
pub use errors::{BotError, BotResult};
pub use types::*;
