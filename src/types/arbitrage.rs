//! Arbitrage opportunity types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// A fee-adjusted, directional spread between two venues that cleared the
/// profit threshold at one instant. Produced by the evaluator and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArbitrageOpportunity {
    pub buy_venue: String,
    pub sell_venue: String,
    pub instrument: String,
    pub quote_currency: String,
    /// Ask on the buy venue.
    pub buy_price: Decimal,
    /// Bid on the sell venue.
    pub sell_price: Decimal,
    pub gross_spread_pct: Decimal,
    pub fee_pct: Decimal,
    pub net_profit_pct: Decimal,
    /// Quote-currency notional the profit estimate was computed for.
    pub reference_notional: Decimal,
    pub estimated_profit: Decimal,
    pub detected_at: DateTime<Utc>,
}

impl ArbitrageOpportunity {
    /// Directional pair label, e.g. `binance->kraken`.
    pub fn pair_id(&self) -> String {
        format!("{}->{}", self.buy_venue, self.sell_venue)
    }
}

impl fmt::Display for ArbitrageOpportunity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Buy {} on {} at {:.6} {}, sell on {} at {:.6} | Net: {:.2}% (~{:.2} {})",
            self.instrument,
            self.buy_venue,
            self.buy_price,
            self.quote_currency,
            self.sell_venue,
            self.sell_price,
            self.net_profit_pct,
            self.estimated_profit,
            self.quote_currency,
        )
    }
}

/// Why a directional pair did not produce an opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Rejection {
    MissingQuote,
    SameVenue,
    QuoteCurrencyMismatch,
    NonPositivePrice,
    /// Prices so extreme that the spread or profit cannot be represented.
    PriceOutOfRange,
    BelowThreshold { net_profit_pct: Decimal },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::MissingQuote => write!(f, "missing-quote"),
            Rejection::SameVenue => write!(f, "same-venue"),
            Rejection::QuoteCurrencyMismatch => write!(f, "quote-currency-mismatch"),
            Rejection::NonPositivePrice => write!(f, "non-positive-price"),
            Rejection::PriceOutOfRange => write!(f, "price-out-of-range"),
            Rejection::BelowThreshold { net_profit_pct } => {
                write!(f, "below-threshold ({:.3}%)", net_profit_pct)
            }
        }
    }
}
