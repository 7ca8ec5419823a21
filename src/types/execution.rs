//! Order and trade execution types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => f.write_str("buy"),
            OrderSide::Sell => f.write_str("sell"),
        }
    }
}

/// Market order for `quantity` base units of `instrument/quote_currency`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    pub instrument: String,
    pub quote_currency: String,
    pub side: OrderSide,
    pub quantity: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderAck {
    pub venue: String,
    pub order_id: String,
    pub side: OrderSide,
    pub quantity: Decimal,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TradeExecution {
    pub id: String,
    pub pair: String,
    pub timestamp: DateTime<Utc>,
    pub status: ExecutionStatus,
    pub quantity: Decimal,
    pub buy_order: Option<OrderAck>,
    pub sell_order: Option<OrderAck>,
    pub expected_profit: Decimal,
    pub execution_time_ms: u64,
    pub error_message: Option<String>,
}

impl TradeExecution {
    /// The buy leg filled but the sell leg did not: inventory is now
    /// unhedged and a human has to unwind it.
    pub fn requires_manual_intervention(&self) -> bool {
        matches!(self.status, ExecutionStatus::SellFailedAfterBuy)
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, ExecutionStatus::Success | ExecutionStatus::Simulated)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExecutionStatus {
    Simulated,
    Success,
    BuyFailed,
    SellFailedAfterBuy,
}
