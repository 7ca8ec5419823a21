//! Configuration management for the arbitrage bot

pub mod settings;

pub use settings::*;
