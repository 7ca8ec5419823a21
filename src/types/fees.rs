//! Trading fee schedules

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maker/taker fee of one venue, in percent (0.1 = 0.1%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueFees {
    pub maker_pct: Decimal,
    pub taker_pct: Decimal,
}

impl Default for VenueFees {
    fn default() -> Self {
        Self {
            maker_pct: dec!(0.1),
            taker_pct: dec!(0.1),
        }
    }
}

impl VenueFees {
    pub fn taker(taker_pct: Decimal) -> Self {
        Self {
            taker_pct,
            ..Default::default()
        }
    }

    /// Taker fee as a fraction (0.001 for 0.1%).
    pub fn taker_rate(&self) -> Decimal {
        self.taker_pct / dec!(100)
    }
}

/// Per-venue fees; venues without an entry use [`VenueFees::default`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeeTable {
    venues: HashMap<String, VenueFees>,
}

impl FeeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, venue: impl Into<String>, fees: VenueFees) {
        self.venues.insert(venue.into(), fees);
    }

    pub fn with(mut self, venue: impl Into<String>, fees: VenueFees) -> Self {
        self.insert(venue, fees);
        self
    }

    pub fn for_venue(&self, venue: &str) -> VenueFees {
        self.venues.get(venue).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_venue_falls_back_to_default_fees() {
        let table = FeeTable::new().with("kraken", VenueFees::taker(dec!(0.26)));

        assert_eq!(table.for_venue("kraken").taker_pct, dec!(0.26));
        assert_eq!(table.for_venue("kraken").taker_rate(), dec!(0.0026));
        assert_eq!(table.for_venue("binance"), VenueFees::default());
        assert_eq!(table.for_venue("binance").taker_rate(), dec!(0.001));
    }
}
