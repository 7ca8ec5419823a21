//! Custom error types for the bot

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        retry_count: u32,
    },

    #[error("Exchange error on {venue}: {message}")]
    Exchange {
        venue: String,
        message: String,
    },

    #[error("Invalid configuration for {field}: {reason}")]
    Config {
        field: String,
        reason: String,
    },

    #[error("Data parsing error: {context}")]
    DataParsing {
        context: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Instrument mismatch: expected {expected}, got {found}")]
    InstrumentMismatch {
        expected: String,
        found: String,
    },

    #[error("Circuit breaker active: {reason}")]
    CircuitBreakerOpen {
        reason: String,
        cooldown_remaining: Duration,
    },
}

impl BotError {
    pub fn config(field: &str, reason: impl Into<String>) -> Self {
        BotError::Config {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn exchange(venue: &str, message: impl Into<String>) -> Self {
        BotError::Exchange {
            venue: venue.to_string(),
            message: message.into(),
        }
    }
}

pub type BotResult<T> = Result<T, BotError>;
