//! Trade execution engine

use rust_decimal::prelude::*;
use std::time::Instant;
use tracing::{error, info, warn};
use crate::{
    config::Config,
    errors::BotResult,
    network::ExchangeClient,
    types::{
        ArbitrageOpportunity, ExecutionStatus, OrderRequest, OrderSide, SizedTrade, TradeExecution,
    },
};

/// Balances that bound a trade: quote currency on the buy venue and the
/// instrument itself on the sell venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegBalances {
    pub buyer_quote: Decimal,
    pub seller_base: Decimal,
}

pub struct TradeExecutionEngine {
    dry_run: bool,
    dry_run_balance: Decimal,
}

impl TradeExecutionEngine {
    pub fn new(config: &Config) -> Self {
        Self {
            dry_run: config.dry_run,
            dry_run_balance: config.dry_run_balance,
        }
    }

    pub async fn fetch_balances(
        &self,
        opportunity: &ArbitrageOpportunity,
        buy_client: &dyn ExchangeClient,
        sell_client: &dyn ExchangeClient,
    ) -> BotResult<LegBalances> {
        if self.dry_run {
            return Ok(LegBalances {
                buyer_quote: self.dry_run_balance,
                seller_base: self.dry_run_balance,
            });
        }

        let (buyer_quote, seller_base) = tokio::try_join!(
            buy_client.fetch_balance(&opportunity.quote_currency),
            sell_client.fetch_balance(&opportunity.instrument),
        )?;
        Ok(LegBalances { buyer_quote, seller_base })
    }

    /// Buys on the cheap venue, then sells on the expensive one. The sized
    /// quantity is rounded down once to the coarser of the two venues' steps
    /// so both legs carry the same amount. A sell failure after a filled buy
    /// leaves an open position and is reported as
    /// [`ExecutionStatus::SellFailedAfterBuy`].
    pub async fn execute(
        &self,
        opportunity: &ArbitrageOpportunity,
        trade: &SizedTrade,
        buy_client: &dyn ExchangeClient,
        sell_client: &dyn ExchangeClient,
    ) -> TradeExecution {
        let started = Instant::now();
        let quantity = leg_quantity(trade.quantity, buy_client, sell_client);
        let mut execution = TradeExecution {
            id: uuid::Uuid::new_v4().to_string(),
            pair: opportunity.pair_id(),
            timestamp: chrono::Utc::now(),
            status: ExecutionStatus::Simulated,
            quantity,
            buy_order: None,
            sell_order: None,
            expected_profit: expected_profit(opportunity, quantity),
            execution_time_ms: 0,
            error_message: None,
        };

        info!("Executing arbitrage trade {}...", execution.id);
        info!("1. Buy {} {} on {}", quantity, opportunity.instrument, opportunity.buy_venue);
        info!("2. Sell {} {} on {}", quantity, opportunity.instrument, opportunity.sell_venue);

        if quantity <= Decimal::ZERO {
            warn!("Sized quantity {} rounds to zero for {}", trade.quantity, execution.pair);
            execution.status = ExecutionStatus::BuyFailed;
            execution.error_message = Some(format!("quantity {} rounds to zero", trade.quantity));
            return execution;
        }

        if self.dry_run {
            info!("[DRY RUN] Orders not sent");
            execution.execution_time_ms = started.elapsed().as_millis() as u64;
            return execution;
        }

        let order = |side| OrderRequest {
            instrument: opportunity.instrument.clone(),
            quote_currency: opportunity.quote_currency.clone(),
            side,
            quantity,
        };

        match buy_client.place_market_order(&order(OrderSide::Buy)).await {
            Ok(ack) => execution.buy_order = Some(ack),
            Err(e) => {
                error!("Failed to place buy order on {}: {}", opportunity.buy_venue, e);
                execution.status = ExecutionStatus::BuyFailed;
                execution.error_message = Some(e.to_string());
                execution.execution_time_ms = started.elapsed().as_millis() as u64;
                return execution;
            }
        }

        match sell_client.place_market_order(&order(OrderSide::Sell)).await {
            Ok(ack) => {
                execution.sell_order = Some(ack);
                execution.status = ExecutionStatus::Success;
            }
            Err(e) => {
                error!("Failed to place sell order on {}: {}", opportunity.sell_venue, e);
                warn!("⚠️  BUY order was executed but SELL failed - manual intervention needed!");
                execution.status = ExecutionStatus::SellFailedAfterBuy;
                execution.error_message = Some(e.to_string());
            }
        }

        execution.execution_time_ms = started.elapsed().as_millis() as u64;
        execution
    }
}

fn leg_quantity(quantity: Decimal, buy_client: &dyn ExchangeClient, sell_client: &dyn ExchangeClient) -> Decimal {
    let decimals = buy_client.quantity_decimals().min(sell_client.quantity_decimals());
    quantity.round_dp_with_strategy(decimals, RoundingStrategy::ToZero)
}

/// The opportunity's estimate scaled from its reference notional to the
/// sized quantity.
fn expected_profit(opportunity: &ArbitrageOpportunity, quantity: Decimal) -> Decimal {
    opportunity
        .reference_notional
        .checked_div(opportunity.buy_price)
        .filter(|reference_quantity| !reference_quantity.is_zero())
        .and_then(|reference_quantity| opportunity.estimated_profit.checked_mul(quantity)?.checked_div(reference_quantity))
        .unwrap_or(Decimal::ZERO)
}
