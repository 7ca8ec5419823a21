//! Directional evaluation of one snapshot pair

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use crate::{
    config::DetectionConfig,
    errors::{BotError, BotResult},
    types::{ArbitrageOpportunity, PriceSnapshot, Rejection},
};

/// Evaluate buying at `buy`'s ask and selling at `sell`'s bid.
///
/// `Ok(None)` covers every expected steady-state outcome (missing side,
/// unprofitable spread, quote mismatch). Only an instrument mismatch, which
/// means the caller mixed up its snapshot sets, is an error.
pub fn evaluate(
    buy: &PriceSnapshot,
    sell: &PriceSnapshot,
    config: &DetectionConfig,
) -> BotResult<Option<ArbitrageOpportunity>> {
    match assess(buy, sell, config)? {
        Ok(opportunity) => Ok(Some(opportunity)),
        Err(_) => Ok(None),
    }
}

/// Like [`evaluate`] but keeps the reason a pair was declined.
pub fn assess(
    buy: &PriceSnapshot,
    sell: &PriceSnapshot,
    config: &DetectionConfig,
) -> BotResult<Result<ArbitrageOpportunity, Rejection>> {
    if buy.instrument != sell.instrument {
        return Err(BotError::InstrumentMismatch {
            expected: buy.instrument.clone(),
            found: sell.instrument.clone(),
        });
    }
    if buy.venue == sell.venue {
        return Ok(Err(Rejection::SameVenue));
    }
    // USD and USDT books are not comparable without an FX leg
    if buy.quote_currency != sell.quote_currency {
        return Ok(Err(Rejection::QuoteCurrencyMismatch));
    }

    let (Some((_, buy_price)), Some((sell_price, _))) = (buy.quotes(), sell.quotes()) else {
        return Ok(Err(Rejection::MissingQuote));
    };
    if buy_price <= Decimal::ZERO || sell_price <= Decimal::ZERO {
        return Ok(Err(Rejection::NonPositivePrice));
    }

    let Some(gross_spread_pct) = spread_pct(buy_price, sell_price) else {
        return Ok(Err(Rejection::PriceOutOfRange));
    };
    let Some(net_profit_pct) = gross_spread_pct.checked_sub(config.fee_percent_assumption) else {
        return Ok(Err(Rejection::PriceOutOfRange));
    };
    if net_profit_pct < config.min_profit_pct {
        return Ok(Err(Rejection::BelowThreshold { net_profit_pct }));
    }

    let Some(estimated_profit) = estimate_profit(
        buy_price,
        sell_price,
        config.reference_notional,
        config.fees.for_venue(&buy.venue).taker_rate(),
        config.fees.for_venue(&sell.venue).taker_rate(),
    ) else {
        return Ok(Err(Rejection::PriceOutOfRange));
    };

    Ok(Ok(ArbitrageOpportunity {
        buy_venue: buy.venue.clone(),
        sell_venue: sell.venue.clone(),
        instrument: buy.instrument.clone(),
        quote_currency: buy.quote_currency.clone(),
        buy_price,
        sell_price,
        gross_spread_pct,
        fee_pct: config.fee_percent_assumption,
        net_profit_pct,
        reference_notional: config.reference_notional,
        estimated_profit,
        detected_at: buy.observed_at.max(sell.observed_at),
    }))
}

/// `(sell - buy) / buy * 100`, or `None` when `buy` is zero or the result
/// does not fit a `Decimal`.
pub fn spread_pct(buy_price: Decimal, sell_price: Decimal) -> Option<Decimal> {
    sell_price
        .checked_sub(buy_price)?
        .checked_div(buy_price)?
        .checked_mul(dec!(100))
}

/// Profit in quote currency of spending `notional` on the buy leg and selling
/// the same quantity on the other venue, net of both taker fees. `None` on
/// overflow.
pub fn estimate_profit(
    buy_price: Decimal,
    sell_price: Decimal,
    notional: Decimal,
    buy_fee_rate: Decimal,
    sell_fee_rate: Decimal,
) -> Option<Decimal> {
    let quantity = notional.checked_div(buy_price)?;
    let gross_profit = sell_price.checked_sub(buy_price)?.checked_mul(quantity)?;
    let buy_fee = notional.checked_mul(buy_fee_rate)?;
    let sell_fee = quantity.checked_mul(sell_price)?.checked_mul(sell_fee_rate)?;
    gross_profit.checked_sub(buy_fee)?.checked_sub(sell_fee)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use crate::types::{FeeTable, VenueFees};

    fn snapshot(venue: &str, bid: Option<Decimal>, ask: Option<Decimal>) -> PriceSnapshot {
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        PriceSnapshot::new(venue, "XLM", "USD", bid, ask, at)
    }

    fn config() -> DetectionConfig {
        DetectionConfig::default()
    }

    #[test]
    fn profitable_direction_produces_opportunity() {
        let a = snapshot("a", Some(dec!(0.099)), Some(dec!(0.10)));
        let b = snapshot("b", Some(dec!(0.1045)), Some(dec!(0.1050)));

        let opp = evaluate(&a, &b, &config()).unwrap().expect("buy a / sell b");

        assert_eq!(opp.buy_venue, "a");
        assert_eq!(opp.sell_venue, "b");
        assert_eq!(opp.buy_price, dec!(0.10));
        assert_eq!(opp.sell_price, dec!(0.1045));
        assert_eq!(opp.gross_spread_pct, dec!(4.5));
        assert_eq!(opp.net_profit_pct, dec!(4.3));
        // 1000 XLM: 4.5 gross - 0.1 buy fee - 0.1045 sell fee
        assert_eq!(opp.estimated_profit, dec!(4.2955));
        assert_eq!(opp.pair_id(), "a->b");
    }

    #[test]
    fn reverse_direction_is_below_threshold() {
        let a = snapshot("a", Some(dec!(0.099)), Some(dec!(0.10)));
        let b = snapshot("b", Some(dec!(0.1045)), Some(dec!(0.1050)));

        let verdict = assess(&b, &a, &config()).unwrap();
        assert!(matches!(verdict, Err(Rejection::BelowThreshold { net_profit_pct }) if net_profit_pct < Decimal::ZERO));
        assert!(evaluate(&b, &a, &config()).unwrap().is_none());
    }

    #[test]
    fn missing_sides_are_declined() {
        let a = snapshot("a", Some(dec!(0.099)), None);
        let b = snapshot("b", Some(dec!(0.2)), Some(dec!(0.21)));

        assert_eq!(assess(&a, &b, &config()).unwrap(), Err(Rejection::MissingQuote));
        // the unused side is missing too, the snapshot is still unusable
        let c = snapshot("c", None, Some(dec!(0.05)));
        assert_eq!(assess(&c, &b, &config()).unwrap(), Err(Rejection::MissingQuote));
    }

    #[test]
    fn non_positive_prices_are_declined_without_dividing() {
        let zero_ask = snapshot("a", Some(dec!(0)), Some(dec!(0)));
        let negative_bid = snapshot("b", Some(dec!(-1)), Some(dec!(0.2)));
        let fine = snapshot("c", Some(dec!(0.2)), Some(dec!(0.21)));

        assert_eq!(assess(&zero_ask, &fine, &config()).unwrap(), Err(Rejection::NonPositivePrice));
        assert_eq!(assess(&fine, &negative_bid, &config()).unwrap(), Err(Rejection::NonPositivePrice));
    }

    #[test]
    fn same_venue_and_quote_mismatch_are_declined() {
        let a = snapshot("a", Some(dec!(0.099)), Some(dec!(0.10)));
        let mut usdt = snapshot("b", Some(dec!(0.2)), Some(dec!(0.21)));
        usdt.quote_currency = "USDT".to_string();

        assert_eq!(assess(&a, &a, &config()).unwrap(), Err(Rejection::SameVenue));
        assert_eq!(assess(&a, &usdt, &config()).unwrap(), Err(Rejection::QuoteCurrencyMismatch));
    }

    #[test]
    fn instrument_mismatch_is_an_error() {
        let a = snapshot("a", Some(dec!(0.099)), Some(dec!(0.10)));
        let mut b = snapshot("b", Some(dec!(0.2)), Some(dec!(0.21)));
        b.instrument = "ADA".to_string();

        assert!(matches!(
            evaluate(&a, &b, &config()),
            Err(BotError::InstrumentMismatch { .. })
        ));
    }

    #[test]
    fn threshold_is_inclusive() {
        // gross 0.7% - 0.2% fee = exactly 0.5%
        let a = snapshot("a", Some(dec!(0.99)), Some(dec!(1.00)));
        let b = snapshot("b", Some(dec!(1.007)), Some(dec!(1.01)));

        let opp = evaluate(&a, &b, &config()).unwrap().expect("at threshold");
        assert_eq!(opp.net_profit_pct, dec!(0.5));
    }

    #[test]
    fn per_venue_fees_shape_the_profit_estimate() {
        let a = snapshot("a", Some(dec!(0.099)), Some(dec!(0.10)));
        let b = snapshot("b", Some(dec!(0.1045)), Some(dec!(0.1050)));
        let config = DetectionConfig {
            fees: FeeTable::new().with("b", VenueFees::taker(dec!(0.26))),
            ..DetectionConfig::default()
        };

        let opp = evaluate(&a, &b, &config).unwrap().unwrap();
        // 4.5 - 0.1 - 104.5 * 0.0026
        assert_eq!(opp.estimated_profit, dec!(4.1283));
        assert_eq!(opp.net_profit_pct, dec!(4.3));
    }

    #[test]
    fn detected_at_is_the_later_observation() {
        let a = snapshot("a", Some(dec!(0.099)), Some(dec!(0.10)));
        let mut b = snapshot("b", Some(dec!(0.1045)), Some(dec!(0.1050)));
        b.observed_at = a.observed_at + chrono::Duration::seconds(2);

        let opp = evaluate(&a, &b, &config()).unwrap().unwrap();
        assert_eq!(opp.detected_at, b.observed_at);
    }

    #[test]
    fn extreme_prices_are_declined_instead_of_overflowing() {
        let dust = snapshot("a", Some(Decimal::new(1, 28)), Some(Decimal::new(1, 28)));
        let normal = snapshot("b", Some(dec!(1)), Some(dec!(1.01)));

        assert_eq!(assess(&dust, &normal, &config()).unwrap(), Err(Rejection::PriceOutOfRange));
        assert!(evaluate(&dust, &normal, &config()).unwrap().is_none());
        assert_eq!(spread_pct(Decimal::new(1, 28), dec!(1)), None);
        assert_eq!(estimate_profit(Decimal::new(1, 27), dec!(1), dec!(100), dec!(0.001), dec!(0.001)), None);
    }

    #[test]
    fn spread_formula() {
        assert_eq!(spread_pct(dec!(0.10), dec!(0.1045)), Some(dec!(4.5)));
        assert_eq!(spread_pct(dec!(0), dec!(1)), None);
    }
}
