//! Cross-venue opportunity scanning

use std::cmp::Ordering;
use std::collections::BTreeMap;
use crate::{
    config::DetectionConfig,
    errors::BotResult,
    types::{ArbitrageOpportunity, PriceSnapshot},
};
use super::evaluator::evaluate;

/// Snapshots of one polling cycle keyed by venue; `None` marks a failed fetch.
pub type SnapshotSet = BTreeMap<String, Option<PriceSnapshot>>;

/// Evaluate every ordered pair of venues with a usable snapshot and return the
/// qualifying opportunities, best first.
///
/// Fewer than two usable snapshots is the normal outcome of a partial outage
/// and yields an empty list.
pub fn scan(snapshots: &SnapshotSet, config: &DetectionConfig) -> BotResult<Vec<ArbitrageOpportunity>> {
    let valid: Vec<&PriceSnapshot> = snapshots
        .values()
        .filter_map(|s| s.as_ref())
        .filter(|s| s.is_valid())
        .collect();

    let mut opportunities = Vec::new();
    if valid.len() < 2 {
        return Ok(opportunities);
    }

    for (i, first) in valid.iter().enumerate() {
        for second in &valid[i + 1..] {
            if let Some(opp) = evaluate(first, second, config)? {
                opportunities.push(opp);
            }
            if let Some(opp) = evaluate(second, first, config)? {
                opportunities.push(opp);
            }
        }
    }

    rank(&mut opportunities);
    Ok(opportunities)
}

/// Net profit descending, then estimated profit descending, then venue pair.
pub fn rank(opportunities: &mut [ArbitrageOpportunity]) {
    opportunities.sort_by(compare);
}

fn compare(a: &ArbitrageOpportunity, b: &ArbitrageOpportunity) -> Ordering {
    b.net_profit_pct
        .cmp(&a.net_profit_pct)
        .then_with(|| b.estimated_profit.cmp(&a.estimated_profit))
        .then_with(|| a.buy_venue.cmp(&b.buy_venue))
        .then_with(|| a.sell_venue.cmp(&b.sell_venue))
        .then_with(|| a.quote_currency.cmp(&b.quote_currency))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn snapshot(venue: &str, bid: Decimal, ask: Decimal) -> PriceSnapshot {
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        PriceSnapshot::new(venue, "XLM", "USD", Some(bid), Some(ask), at)
    }

    fn set(entries: Vec<(&str, Option<PriceSnapshot>)>) -> SnapshotSet {
        entries.into_iter().map(|(v, s)| (v.to_string(), s)).collect()
    }

    #[test]
    fn reference_scenario_yields_single_direction() {
        let snapshots = set(vec![
            ("a", Some(snapshot("a", dec!(0.099), dec!(0.10)))),
            ("b", Some(snapshot("b", dec!(0.1045), dec!(0.1050)))),
        ]);

        let found = scan(&snapshots, &DetectionConfig::default()).unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].pair_id(), "a->b");
        assert_eq!(found[0].gross_spread_pct, dec!(4.5));
        assert_eq!(found[0].net_profit_pct, dec!(4.3));
    }

    #[test]
    fn identical_books_yield_nothing() {
        let snapshots = set(vec![
            ("a", Some(snapshot("a", dec!(0.10), dec!(0.10)))),
            ("b", Some(snapshot("b", dec!(0.10), dec!(0.10)))),
        ]);

        assert!(scan(&snapshots, &DetectionConfig::default()).unwrap().is_empty());
    }

    #[test]
    fn absent_or_invalid_venues_leave_too_few_to_pair() {
        let absent = set(vec![
            ("a", Some(snapshot("a", dec!(0.099), dec!(0.10)))),
            ("b", None),
        ]);
        let mut one_sided = snapshot("b", dec!(0.1045), dec!(0.1050));
        one_sided.ask = None;
        let invalid = set(vec![
            ("a", Some(snapshot("a", dec!(0.099), dec!(0.10)))),
            ("b", Some(one_sided)),
        ]);

        assert!(scan(&absent, &DetectionConfig::default()).unwrap().is_empty());
        assert!(scan(&invalid, &DetectionConfig::default()).unwrap().is_empty());
        assert!(scan(&SnapshotSet::new(), &DetectionConfig::default()).unwrap().is_empty());
    }

    #[test]
    fn three_venues_are_ranked_by_net_profit() {
        let snapshots = set(vec![
            ("a", Some(snapshot("a", dec!(0.099), dec!(0.100)))),
            ("b", Some(snapshot("b", dec!(0.1045), dec!(0.1050)))),
            ("c", Some(snapshot("c", dec!(0.1100), dec!(0.1110)))),
        ]);

        let found = scan(&snapshots, &DetectionConfig::default()).unwrap();
        let pairs: Vec<String> = found.iter().map(|o| o.pair_id()).collect();

        // a->c 10%, b->c ~4.76%, a->b 4.5%
        assert_eq!(pairs, vec!["a->c", "b->c", "a->b"]);
        assert!(found.windows(2).all(|w| w[0].net_profit_pct >= w[1].net_profit_pct));
    }

    #[test]
    fn ties_fall_back_to_profit_then_venue_names() {
        let snapshots = set(vec![
            ("z", Some(snapshot("z", dec!(0.099), dec!(0.10)))),
            ("y", Some(snapshot("y", dec!(0.099), dec!(0.10)))),
            ("x", Some(snapshot("x", dec!(0.1045), dec!(0.1050)))),
        ]);

        let found = scan(&snapshots, &DetectionConfig::default()).unwrap();
        let pairs: Vec<String> = found.iter().map(|o| o.pair_id()).collect();

        assert_eq!(pairs, vec!["y->x", "z->x"]);
    }

    #[test]
    fn scanning_is_deterministic() {
        let snapshots = set(vec![
            ("a", Some(snapshot("a", dec!(0.099), dec!(0.100)))),
            ("b", Some(snapshot("b", dec!(0.1045), dec!(0.1050)))),
            ("c", Some(snapshot("c", dec!(0.1100), dec!(0.1110)))),
        ]);
        let config = DetectionConfig::default();

        assert_eq!(scan(&snapshots, &config).unwrap(), scan(&snapshots, &config).unwrap());
    }

    #[test]
    fn never_pairs_a_venue_with_itself() {
        // mis-keyed set: two entries carrying the same venue name
        let snapshots = set(vec![
            ("a", Some(snapshot("a", dec!(0.099), dec!(0.10)))),
            ("a-dup", Some(snapshot("a", dec!(0.2), dec!(0.21)))),
        ]);

        let found = scan(&snapshots, &DetectionConfig::default()).unwrap();
        assert!(found.iter().all(|o| o.buy_venue != o.sell_venue));
        assert!(found.is_empty());
    }

    proptest! {
        #[test]
        fn finds_exactly_the_qualifying_directions(
            a_bid in 1u32..200_000,
            a_width in 0u32..5_000,
            b_bid in 1u32..200_000,
            b_width in 0u32..5_000,
        ) {
            let a = (Decimal::new(a_bid as i64, 6), Decimal::new((a_bid + a_width) as i64, 6));
            let b = (Decimal::new(b_bid as i64, 6), Decimal::new((b_bid + b_width) as i64, 6));
            let snapshots = set(vec![
                ("a", Some(snapshot("a", a.0, a.1))),
                ("b", Some(snapshot("b", b.0, b.1))),
            ]);
            let config = DetectionConfig::default();

            // buy at one venue's ask, sell at the other's bid
            let qualifies = |ask: Decimal, bid: Decimal| {
                bid > ask && (bid - ask) / ask * dec!(100) - config.fee_percent_assumption >= config.min_profit_pct
            };
            let mut expected = Vec::new();
            if qualifies(a.1, b.0) {
                expected.push("a->b".to_string());
            }
            if qualifies(b.1, a.0) {
                expected.push("b->a".to_string());
            }

            let found = scan(&snapshots, &config).unwrap();
            let mut pairs: Vec<String> = found.iter().map(|o| o.pair_id()).collect();
            pairs.sort();

            prop_assert_eq!(pairs, expected);
            prop_assert!(found.len() <= 1);
            for opp in &found {
                prop_assert_eq!(opp.net_profit_pct, opp.gross_spread_pct - config.fee_percent_assumption);
                prop_assert!(opp.net_profit_pct >= config.min_profit_pct);
                prop_assert!(opp.sell_price > opp.buy_price);
            }
        }
    }
}
