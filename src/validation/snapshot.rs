//! Quote validation at the exchange boundary

use anyhow::Result;
use rust_decimal::prelude::*;
use tracing::warn;
use crate::types::PriceSnapshot;

pub fn validate_quote(price: Decimal, venue: &str, side: &str) -> Result<()> {
    if price <= Decimal::ZERO {
        return Err(anyhow::anyhow!("{} {} is zero or negative: {}", venue, side, price));
    }
    Ok(())
}

/// Drops unusable quote fields so the detection core only ever sees
/// positive, uncrossed books. A crossed book (bid above ask on the same
/// venue) is a stale or broken feed and both sides are discarded.
pub fn sanitize_snapshot(mut snapshot: PriceSnapshot) -> PriceSnapshot {
    for (side, field) in [("bid", &mut snapshot.bid), ("ask", &mut snapshot.ask)] {
        if let Some(price) = *field {
            if let Err(e) = validate_quote(price, &snapshot.venue, side) {
                warn!("Discarding quote: {}", e);
                *field = None;
            }
        }
    }
    if let Some(last) = snapshot.last_trade_price {
        if last <= Decimal::ZERO {
            snapshot.last_trade_price = None;
        }
    }

    if let (Some(bid), Some(ask)) = (snapshot.bid, snapshot.ask) {
        if bid > ask {
            warn!(
                venue = %snapshot.venue,
                %bid,
                %ask,
                "Crossed book, discarding both sides"
            );
            snapshot.bid = None;
            snapshot.ask = None;
        }
    }
    snapshot
}
