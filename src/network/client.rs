//! Exchange client abstraction

use async_trait::async_trait;
use reqwest::Response;
use rust_decimal::prelude::*;
use std::str::FromStr;
use std::time::Duration;
use crate::{
    errors::{BotError, BotResult},
    types::{OrderAck, OrderRequest, PriceSnapshot, VenueFees},
};

pub const HTTP_TIMEOUT_SECS: u64 = 5;

/// One spot venue. Implementations translate venue payloads into the typed
/// values the detection core consumes and reject malformed responses here.
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    fn venue(&self) -> &str;

    async fn fetch_snapshot(&self, instrument: &str, quote: &str) -> BotResult<PriceSnapshot>;

    /// Free balance of `currency`.
    async fn fetch_balance(&self, currency: &str) -> BotResult<Decimal>;

    async fn place_market_order(&self, request: &OrderRequest) -> BotResult<OrderAck>;

    fn trading_fees(&self) -> VenueFees;

    /// Decimal places accepted for order quantities.
    fn quantity_decimals(&self) -> u32;
}

pub fn build_http_client(venue: &str) -> BotResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .build()
        .map_err(|e| BotError::Network {
            message: format!("Failed to build HTTP client for {}", venue),
            source: Some(e.into()),
            retry_count: 0,
        })
}

pub fn transport_error(venue: &str, error: reqwest::Error) -> BotError {
    BotError::Network {
        message: format!("{} request failed", venue),
        source: Some(error.into()),
        retry_count: 0,
    }
}

/// Server errors are treated as transient, client errors as final.
pub async fn read_json(venue: &str, response: Response) -> BotResult<serde_json::Value> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = format!("HTTP {}: {}", status, body);
        if status.is_server_error() {
            return Err(BotError::Network {
                message: format!("{} {}", venue, message),
                source: None,
                retry_count: 0,
            });
        }
        return Err(BotError::exchange(venue, message));
    }

    response.json().await.map_err(|e| BotError::DataParsing {
        context: format!("{} response body", venue),
        source: e.into(),
    })
}

pub fn parse_decimal(venue: &str, field: &str, value: &serde_json::Value) -> BotResult<Decimal> {
    let raw = value
        .as_str()
        .ok_or_else(|| BotError::DataParsing {
            context: format!("{}: missing '{}'", venue, field),
            source: anyhow::anyhow!("expected a decimal string, got {}", value),
        })?;
    Decimal::from_str(raw).map_err(|e| BotError::DataParsing {
        context: format!("{}: '{}' is not a decimal", venue, field),
        source: e.into(),
    })
}

/// Missing and empty fields become `None` instead of failing the snapshot.
pub fn parse_optional_decimal(venue: &str, field: &str, value: &serde_json::Value) -> BotResult<Option<Decimal>> {
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) if s.is_empty() => Ok(None),
        other => parse_decimal(venue, field, other).map(Some),
    }
}
