//! Binance(.US) spot REST client

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::prelude::*;
use tracing::{debug, info};
use crate::{
    config::Credentials,
    errors::{BotError, BotResult},
    network::{
        client::{build_http_client, parse_decimal, parse_optional_decimal, read_json, transport_error, ExchangeClient},
        retry::{retry_with_backoff, RetryConfig},
        signing::binance_signature,
    },
    types::{OrderAck, OrderRequest, OrderSide, PriceSnapshot, VenueFees},
    validation::sanitize_snapshot,
};

const VENUE: &str = "binance";
const RECV_WINDOW_MS: u64 = 5000;

pub struct BinanceClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Option<Credentials>,
    fees: VenueFees,
    quantity_decimals: u32,
    retry: RetryConfig,
}

impl BinanceClient {
    pub fn new(base_url: &str, credentials: Option<Credentials>, fees: VenueFees) -> BotResult<Self> {
        Ok(Self {
            http: build_http_client(VENUE)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            fees,
            quantity_decimals: 1,
            retry: RetryConfig::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn symbol(instrument: &str, quote: &str) -> String {
        format!("{}{}", instrument.to_uppercase(), quote.to_uppercase())
    }

    fn credentials(&self) -> BotResult<&Credentials> {
        self.credentials
            .as_ref()
            .ok_or_else(|| BotError::config("BINANCE_API_KEY", "credentials required for signed endpoints"))
    }

    /// Appends timestamp, receive window and signature to `params`.
    fn signed_query(&self, params: &[(&str, String)]) -> BotResult<String> {
        let credentials = self.credentials()?;
        let mut query: Vec<String> = params.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        query.push(format!("recvWindow={}", RECV_WINDOW_MS));
        query.push(format!("timestamp={}", Utc::now().timestamp_millis()));
        let query = query.join("&");
        let signature = binance_signature(&credentials.api_secret, &query)?;
        Ok(format!("{}&signature={}", query, signature))
    }

    async fn fetch_ticker_once(&self, symbol: &str) -> BotResult<serde_json::Value> {
        let response = self
            .http
            .get(format!("{}/api/v3/ticker/24hr", self.base_url))
            .query(&[("symbol", symbol)])
            .send()
            .await
            .map_err(|e| transport_error(VENUE, e))?;
        read_json(VENUE, response).await
    }
}

#[async_trait]
impl ExchangeClient for BinanceClient {
    fn venue(&self) -> &str {
        VENUE
    }

    async fn fetch_snapshot(&self, instrument: &str, quote: &str) -> BotResult<PriceSnapshot> {
        let symbol = Self::symbol(instrument, quote);
        let json = retry_with_backoff(
            || self.fetch_ticker_once(&symbol),
            &self.retry,
            "Binance ticker fetch",
        )
        .await?;

        let snapshot = PriceSnapshot::new(
            VENUE,
            instrument.to_uppercase(),
            quote.to_uppercase(),
            parse_optional_decimal(VENUE, "bidPrice", &json["bidPrice"])?,
            parse_optional_decimal(VENUE, "askPrice", &json["askPrice"])?,
            Utc::now(),
        )
        .with_last_trade_price(parse_optional_decimal(VENUE, "lastPrice", &json["lastPrice"])?);

        debug!(symbol = %symbol, bid = ?snapshot.bid, ask = ?snapshot.ask, "Binance ticker");
        Ok(sanitize_snapshot(snapshot))
    }

    async fn fetch_balance(&self, currency: &str) -> BotResult<Decimal> {
        let query = self.signed_query(&[])?;
        let response = self
            .http
            .get(format!("{}/api/v3/account?{}", self.base_url, query))
            .header("X-MBX-APIKEY", &self.credentials()?.api_key)
            .send()
            .await
            .map_err(|e| transport_error(VENUE, e))?;
        let json = read_json(VENUE, response).await?;

        let balances = json["balances"].as_array().ok_or_else(|| BotError::DataParsing {
            context: "binance: account response without balances".to_string(),
            source: anyhow::anyhow!("{}", json),
        })?;

        for entry in balances {
            if entry["asset"].as_str().is_some_and(|a| a.eq_ignore_ascii_case(currency)) {
                return parse_decimal(VENUE, "free", &entry["free"]);
            }
        }
        Ok(Decimal::ZERO)
    }

    async fn place_market_order(&self, request: &OrderRequest) -> BotResult<OrderAck> {
        let symbol = Self::symbol(&request.instrument, &request.quote_currency);
        let quantity = request
            .quantity
            .round_dp_with_strategy(self.quantity_decimals, RoundingStrategy::ToZero);
        if quantity <= Decimal::ZERO {
            return Err(BotError::exchange(VENUE, format!("quantity {} rounds to zero", request.quantity)));
        }

        let side = match request.side {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        };
        let query = self.signed_query(&[
            ("symbol", symbol.clone()),
            ("side", side.to_string()),
            ("type", "MARKET".to_string()),
            ("quantity", quantity.normalize().to_string()),
        ])?;

        let response = self
            .http
            .post(format!("{}/api/v3/order?{}", self.base_url, query))
            .header("X-MBX-APIKEY", &self.credentials()?.api_key)
            .send()
            .await
            .map_err(|e| transport_error(VENUE, e))?;
        let json = read_json(VENUE, response).await?;

        let order_id = match &json["orderId"] {
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::String(s) => s.clone(),
            _ => {
                return Err(BotError::DataParsing {
                    context: "binance: order response without orderId".to_string(),
                    source: anyhow::anyhow!("{}", json),
                })
            }
        };
        let filled = parse_optional_decimal(VENUE, "executedQty", &json["executedQty"])?.unwrap_or(quantity);

        info!("✓ Binance {} order {} for {} {}", request.side, order_id, filled, symbol);
        Ok(OrderAck {
            venue: VENUE.to_string(),
            order_id,
            side: request.side,
            quantity: filled,
            status: json["status"].as_str().unwrap_or("UNKNOWN").to_string(),
        })
    }

    fn trading_fees(&self) -> VenueFees {
        self.fees
    }

    fn quantity_decimals(&self) -> u32 {
        self.quantity_decimals
    }
}
