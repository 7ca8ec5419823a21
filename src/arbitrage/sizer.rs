//! Trade sizing against balances on both legs

use rust_decimal::prelude::*;
use crate::{
    config::DetectionConfig,
    types::{ArbitrageOpportunity, SizeLimit, SizedTrade, SizingRejection},
};

/// Largest quantity that can be bought with `buyer_quote_balance` (capped at
/// `reference_notional`) and sold from `seller_base_inventory`, shrunk by the
/// configured safety margin. The sell leg must already hold the asset.
pub fn size_trade(
    opportunity: &ArbitrageOpportunity,
    buyer_quote_balance: Decimal,
    seller_base_inventory: Decimal,
    reference_notional: Decimal,
    config: &DetectionConfig,
) -> Result<SizedTrade, SizingRejection> {
    if opportunity.buy_price <= Decimal::ZERO {
        return Err(SizingRejection::InsufficientCapital);
    }

    let spendable = buyer_quote_balance.min(reference_notional).max(Decimal::ZERO);
    let max_buyable = spendable
        .checked_div(opportunity.buy_price)
        .ok_or(SizingRejection::PriceOutOfRange)?;
    let max_sellable = seller_base_inventory.max(Decimal::ZERO);

    let (raw_quantity, limited_by) = if max_buyable <= max_sellable {
        (max_buyable, SizeLimit::Capital)
    } else {
        (max_sellable, SizeLimit::Inventory)
    };

    let quantity = raw_quantity
        .checked_mul(config.safety_margin)
        .ok_or(SizingRejection::PriceOutOfRange)?;
    if quantity <= Decimal::ZERO {
        return Err(SizingRejection::InsufficientCapital);
    }

    Ok(SizedTrade {
        quantity,
        max_buyable,
        max_sellable,
        limited_by,
    })
}
