//! Top-of-book price snapshots

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One venue's best bid/ask for an instrument at a point in time.
///
/// `bid` and `ask` are optional because a venue may answer without a side
/// (empty book, maintenance) or the fetch may have been partially rejected at
/// the boundary. A snapshot missing either side never takes part in pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub venue: String,
    pub instrument: String,
    pub quote_currency: String,
    pub bid: Option<Decimal>,
    pub ask: Option<Decimal>,
    pub last_trade_price: Option<Decimal>,
    pub observed_at: DateTime<Utc>,
}

impl PriceSnapshot {
    pub fn new(
        venue: impl Into<String>,
        instrument: impl Into<String>,
        quote_currency: impl Into<String>,
        bid: Option<Decimal>,
        ask: Option<Decimal>,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            venue: venue.into(),
            instrument: instrument.into(),
            quote_currency: quote_currency.into(),
            bid,
            ask,
            last_trade_price: None,
            observed_at,
        }
    }

    pub fn with_last_trade_price(mut self, last: Option<Decimal>) -> Self {
        self.last_trade_price = last;
        self
    }

    /// Both sides of the book are present.
    pub fn is_valid(&self) -> bool {
        self.bid.is_some() && self.ask.is_some()
    }

    /// `(bid, ask)` when the snapshot is valid.
    pub fn quotes(&self) -> Option<(Decimal, Decimal)> {
        Some((self.bid?, self.ask?))
    }

    /// Market label such as `XLM/USDT`.
    pub fn market(&self) -> String {
        format!("{}/{}", self.instrument, self.quote_currency)
    }
}
