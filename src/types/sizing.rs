//! Trade sizing results

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Which constraint bound the sized quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SizeLimit {
    Capital,
    Inventory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SizedTrade {
    /// Base-instrument units to buy on one venue and sell on the other.
    pub quantity: Decimal,
    pub max_buyable: Decimal,
    pub max_sellable: Decimal,
    pub limited_by: SizeLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SizingRejection {
    InsufficientCapital,
    PriceOutOfRange,
}

impl SizingRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizingRejection::InsufficientCapital => "insufficient-capital",
            SizingRejection::PriceOutOfRange => "price-out-of-range",
        }
    }
}

impl fmt::Display for SizingRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
