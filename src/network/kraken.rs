//! Kraken spot REST client

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};
use crate::{
    config::Credentials,
    errors::{BotError, BotResult},
    network::{
        client::{build_http_client, parse_decimal, parse_optional_decimal, read_json, transport_error, ExchangeClient},
        retry::{retry_with_backoff, RetryConfig},
        signing::kraken_signature,
    },
    types::{OrderAck, OrderRequest, PriceSnapshot, VenueFees},
    validation::sanitize_snapshot,
};

const VENUE: &str = "kraken";

pub struct KrakenClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Option<Credentials>,
    fees: VenueFees,
    quantity_decimals: u32,
    retry: RetryConfig,
    last_nonce: AtomicU64,
}

impl KrakenClient {
    pub fn new(base_url: &str, credentials: Option<Credentials>, fees: VenueFees) -> BotResult<Self> {
        Ok(Self {
            http: build_http_client(VENUE)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            fees,
            quantity_decimals: 8,
            retry: RetryConfig::default(),
            last_nonce: AtomicU64::new(0),
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Kraken names bitcoin XBT.
    fn asset_code(currency: &str) -> String {
        match currency.to_uppercase().as_str() {
            "BTC" => "XBT".to_string(),
            other => other.to_string(),
        }
    }

    pub fn pair(instrument: &str, quote: &str) -> String {
        format!("{}{}", Self::asset_code(instrument), Self::asset_code(quote))
    }

    /// Strictly increasing millisecond nonce, even for calls within the same
    /// millisecond.
    fn next_nonce(&self) -> u64 {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let mut last = self.last_nonce.load(Ordering::SeqCst);
        loop {
            let next = now.max(last + 1);
            match self.last_nonce.compare_exchange(last, next, Ordering::SeqCst, Ordering::SeqCst) {
                Ok(_) => return next,
                Err(actual) => last = actual,
            }
        }
    }

    /// Kraken reports failures in an `error` array, often with HTTP 200.
    fn unwrap_result(json: serde_json::Value) -> BotResult<serde_json::Value> {
        if let Some(errors) = json["error"].as_array() {
            if !errors.is_empty() {
                let message = errors
                    .iter()
                    .filter_map(|e| e.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(BotError::exchange(VENUE, message));
            }
        }
        match json.get("result") {
            Some(result) => Ok(result.clone()),
            None => Err(BotError::DataParsing {
                context: "kraken: response without result".to_string(),
                source: anyhow::anyhow!("{}", json),
            }),
        }
    }

    async fn private_call(&self, path: &str, params: &[(&str, String)]) -> BotResult<serde_json::Value> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or_else(|| BotError::config("KRAKEN_API_KEY", "credentials required for private endpoints"))?;

        let nonce = self.next_nonce();
        let mut body = vec![format!("nonce={}", nonce)];
        body.extend(params.iter().map(|(k, v)| format!("{}={}", k, v)));
        let body = body.join("&");
        let signature = kraken_signature(&credentials.api_secret, path, nonce, &body)?;

        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .header("API-Key", &credentials.api_key)
            .header("API-Sign", signature)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|e| transport_error(VENUE, e))?;
        Self::unwrap_result(read_json(VENUE, response).await?)
    }

    async fn fetch_ticker_once(&self, pair: &str) -> BotResult<serde_json::Value> {
        let response = self
            .http
            .get(format!("{}/0/public/Ticker", self.base_url))
            .query(&[("pair", pair)])
            .send()
            .await
            .map_err(|e| transport_error(VENUE, e))?;
        Self::unwrap_result(read_json(VENUE, response).await?)
    }
}

#[async_trait]
impl ExchangeClient for KrakenClient {
    fn venue(&self) -> &str {
        VENUE
    }

    async fn fetch_snapshot(&self, instrument: &str, quote: &str) -> BotResult<PriceSnapshot> {
        let pair = Self::pair(instrument, quote);
        let result = retry_with_backoff(
            || self.fetch_ticker_once(&pair),
            &self.retry,
            "Kraken ticker fetch",
        )
        .await?;

        // result is keyed by Kraken's internal pair name, e.g. XXLMZUSD
        let ticker = result
            .as_object()
            .and_then(|pairs| pairs.values().next())
            .ok_or_else(|| BotError::exchange(VENUE, format!("no ticker returned for {}", pair)))?;

        let snapshot = PriceSnapshot::new(
            VENUE,
            instrument.to_uppercase(),
            quote.to_uppercase(),
            parse_optional_decimal(VENUE, "b", &ticker["b"][0])?,
            parse_optional_decimal(VENUE, "a", &ticker["a"][0])?,
            Utc::now(),
        )
        .with_last_trade_price(parse_optional_decimal(VENUE, "c", &ticker["c"][0])?);

        debug!(pair = %pair, bid = ?snapshot.bid, ask = ?snapshot.ask, "Kraken ticker");
        Ok(sanitize_snapshot(snapshot))
    }

    async fn fetch_balance(&self, currency: &str) -> BotResult<Decimal> {
        let result = self.private_call("/0/private/Balance", &[]).await?;
        let code = Self::asset_code(currency);

        for key in [code.clone(), format!("X{}", code), format!("Z{}", code)] {
            if let Some(value) = result.get(&key) {
                return parse_decimal(VENUE, &key, value);
            }
        }
        Ok(Decimal::ZERO)
    }

    async fn place_market_order(&self, request: &OrderRequest) -> BotResult<OrderAck> {
        let pair = Self::pair(&request.instrument, &request.quote_currency);
        let volume = request
            .quantity
            .round_dp_with_strategy(self.quantity_decimals, RoundingStrategy::ToZero);
        if volume <= Decimal::ZERO {
            return Err(BotError::exchange(VENUE, format!("volume {} rounds to zero", request.quantity)));
        }

        let result = self
            .private_call(
                "/0/private/AddOrder",
                &[
                    ("ordertype", "market".to_string()),
                    ("type", request.side.to_string()),
                    ("volume", volume.normalize().to_string()),
                    ("pair", pair.clone()),
                ],
            )
            .await?;

        let order_id = result["txid"]
            .as_array()
            .and_then(|ids| ids.first())
            .and_then(|id| id.as_str())
            .ok_or_else(|| BotError::DataParsing {
                context: "kraken: AddOrder response without txid".to_string(),
                source: anyhow::anyhow!("{}", result),
            })?
            .to_string();

        info!("✓ Kraken {} order {} for {} {}", request.side, order_id, volume, pair);
        Ok(OrderAck {
            venue: VENUE.to_string(),
            order_id,
            side: request.side,
            quantity: volume,
            status: "submitted".to_string(),
        })
    }

    fn trading_fees(&self) -> VenueFees {
        self.fees
    }

    fn quantity_decimals(&self) -> u32 {
        self.quantity_decimals
    }
}
