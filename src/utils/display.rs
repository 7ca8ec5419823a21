//! Display and printing utilities

use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{error, info, warn};
use crate::{
    arbitrage::SnapshotSet,
    config::{credential_value, Config, CREDENTIAL_VARS},
    monitor::ConnectivityCheck,
    types::{ArbitrageOpportunity, ExecutionStatus, StatisticsSnapshot, TradeExecution},
};

pub fn print_config_banner(config: &Config) {
    info!("📈 Spread Arbitrage Bot v{}", env!("CARGO_PKG_VERSION"));
    info!("📋 Configuration:");
    info!("   Symbol: {}", config.symbol);
    info!("   Quote currencies: {}", config.quote_currencies.join(", "));
    info!("   Exchanges: {}", config.exchanges.join(", "));
    info!("   Min Profit: {}%", config.detection.min_profit_pct);
    info!("   Trade Amount: {}", config.detection.reference_notional);
    info!("   Fee Assumption: {}%", config.detection.fee_percent_assumption);
    info!("   Safety Margin: {}", config.detection.safety_margin);
    info!("   Check Interval: {}s", config.check_interval_secs);
    if config.dry_run {
        warn!("   ⚠️  DRY RUN - orders are simulated, balance {} per asset", config.dry_run_balance);
    } else {
        warn!("   🚨 LIVE TRADING - real orders will be placed");
    }
}

/// One line per venue and quote currency; missing sides print as `-`.
pub fn print_prices(snapshots: &BTreeMap<String, SnapshotSet>) {
    for (quote, set) in snapshots {
        for (venue, snapshot) in set {
            match snapshot {
                Some(s) => info!(
                    "💹 {:<8} {:<10} | Bid: {:>12} | Ask: {:>12} | Last: {:>12}",
                    venue,
                    s.market(),
                    fmt_price(s.bid),
                    fmt_price(s.ask),
                    fmt_price(s.last_trade_price),
                ),
                None => warn!("💹 {:<8} {:<10} | unavailable", venue, quote),
            }
        }
    }
}

fn fmt_price(price: Option<rust_decimal::Decimal>) -> String {
    price.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn print_opportunity(opportunity: &ArbitrageOpportunity) {
    warn!("\n🎯 ARBITRAGE OPPORTUNITY {} ({})", opportunity.pair_id(), opportunity.quote_currency);
    warn!("   Buy on {} at {}", opportunity.buy_venue, opportunity.buy_price);
    warn!("   Sell on {} at {}", opportunity.sell_venue, opportunity.sell_price);
    warn!("💰 Profit Analysis:");
    warn!("   Gross Spread: {:.4}%", opportunity.gross_spread_pct);
    warn!("   Fees: {}%", opportunity.fee_pct);
    warn!("   Net Profit: {:.4}%", opportunity.net_profit_pct);
    warn!(
        "   Estimated Profit: {:.4} {} on {} {}",
        opportunity.estimated_profit,
        opportunity.quote_currency,
        opportunity.reference_notional,
        opportunity.quote_currency
    );
}

pub fn print_other_opportunities(others: &[ArbitrageOpportunity]) {
    if others.is_empty() {
        return;
    }
    info!("   Other opportunities ({}):", others.len());
    for opportunity in others {
        info!("     {}", opportunity);
    }
}

pub fn print_trade_execution(execution: &TradeExecution) {
    match execution.status {
        ExecutionStatus::Success | ExecutionStatus::Simulated => {
            warn!("\n✅ TRADE EXECUTION #{}", execution.id);
            warn!("   Pair: {}", execution.pair);
            warn!("   Status: {:?}", execution.status);
            warn!("   Quantity: {}", execution.quantity);
            if let Some(order) = &execution.buy_order {
                warn!("   Buy Order: {} ({})", order.order_id, order.status);
            }
            if let Some(order) = &execution.sell_order {
                warn!("   Sell Order: {} ({})", order.order_id, order.status);
            }
            warn!("   Expected Profit: {:.4}", execution.expected_profit);
            warn!("   Execution Time: {}ms", execution.execution_time_ms);
        }
        ExecutionStatus::BuyFailed => {
            error!("\n❌ TRADE EXECUTION FAILED #{}", execution.id);
            error!("   Error: {}", execution.error_message.as_deref().unwrap_or("Unknown"));
        }
        ExecutionStatus::SellFailedAfterBuy => {
            error!("\n🚨 TRADE EXECUTION INCOMPLETE #{}", execution.id);
            error!("   Bought {} but the sell leg failed", execution.quantity);
            error!("   Error: {}", execution.error_message.as_deref().unwrap_or("Unknown"));
            error!("   MANUAL INTERVENTION REQUIRED");
        }
    }
}

pub fn print_statistics(stats: &StatisticsSnapshot, runtime: Duration) {
    info!("\n📊 Session Statistics ({} minutes)", runtime.as_secs() / 60);
    info!("   Iterations: {}", stats.iterations);
    info!("   Opportunities found: {}", stats.found);
    info!("   Trades executed: {}", stats.executed);
    info!("   Success rate: {:.1}%", stats.success_rate_pct);
    if stats.manual_interventions > 0 {
        error!("   Manual interventions needed: {}", stats.manual_interventions);
    }
}

/// First and last four characters of a secret; short values are fully hidden.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 8 {
        return "***".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

pub fn print_credential_status<F>(lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    info!("🔑 Credentials:");
    for var in CREDENTIAL_VARS {
        match credential_value(&lookup, var) {
            Some(value) => info!("   ✓ {} = {}", var, mask_secret(&value)),
            None => warn!("   ⚠ {} not configured", var),
        }
    }
}

pub fn print_connectivity_checks(checks: &[ConnectivityCheck]) {
    info!("🌐 Exchange connectivity:");
    for check in checks {
        match &check.result {
            Ok(snapshot) => info!(
                "   ✓ {} {} | Bid: {} | Ask: {}",
                check.venue,
                snapshot.market(),
                fmt_price(snapshot.bid),
                fmt_price(snapshot.ask),
            ),
            Err(e) => error!("   ✗ {} {}: {}", check.venue, check.quote, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_are_masked() {
        assert_eq!(mask_secret("abcd1234efgh5678"), "abcd...5678");
        assert_eq!(mask_secret("12345678"), "***");
        assert_eq!(mask_secret(""), "***");
    }
}
