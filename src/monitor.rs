//! One polling iteration: fetch, scan, size, execute, record

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use crate::{
    arbitrage::{rank, scan, size_trade, SnapshotSet, StatisticsTracker},
    config::Config,
    errors::{BotError, BotResult},
    execution::TradeExecutionEngine,
    network::ExchangeClient,
    types::{ArbitrageOpportunity, PriceSnapshot, SizingRejection, StatisticsSnapshot, TradeExecution},
    utils,
};

/// Snapshot sets keyed by quote currency.
pub type QuoteSnapshots = BTreeMap<String, SnapshotSet>;

#[derive(Debug, Default)]
pub struct IterationReport {
    /// Ranked best first across all quote currencies.
    pub opportunities: Vec<ArbitrageOpportunity>,
    pub execution: Option<TradeExecution>,
    pub skipped: Option<SizingRejection>,
}

/// Outcome of a single snapshot fetch made while verifying setup.
#[derive(Debug)]
pub struct ConnectivityCheck {
    pub venue: String,
    pub quote: String,
    pub result: BotResult<PriceSnapshot>,
}

pub struct Monitor {
    config: Config,
    clients: Vec<Arc<dyn ExchangeClient>>,
    engine: TradeExecutionEngine,
    statistics: StatisticsTracker,
}

impl Monitor {
    /// Detection uses the trading fees each client reports for its venue.
    pub fn new(mut config: Config, clients: Vec<Arc<dyn ExchangeClient>>) -> Self {
        for client in &clients {
            config.detection.fees.insert(client.venue(), client.trading_fees());
        }
        let engine = TradeExecutionEngine::new(&config);
        Self {
            config,
            clients,
            engine,
            statistics: StatisticsTracker::new(),
        }
    }

    pub fn statistics(&self) -> StatisticsSnapshot {
        self.statistics.snapshot()
    }

    fn client(&self, venue: &str) -> BotResult<&dyn ExchangeClient> {
        self.clients
            .iter()
            .find(|c| c.venue() == venue)
            .map(|c| c.as_ref())
            .ok_or_else(|| BotError::config("EXCHANGES", format!("no client for venue {}", venue)))
    }

    /// Fetches every venue for every quote currency concurrently. A failed
    /// fetch is logged and recorded as `None` so the venue simply drops out of
    /// this cycle's pairing.
    pub async fn collect_snapshots(&self) -> QuoteSnapshots {
        let mut tasks = JoinSet::new();
        for quote in &self.config.quote_currencies {
            for client in &self.clients {
                let client = Arc::clone(client);
                let instrument = self.config.symbol.clone();
                let quote = quote.clone();
                tasks.spawn(async move {
                    let result = client.fetch_snapshot(&instrument, &quote).await;
                    (quote, client.venue().to_string(), result)
                });
            }
        }

        let mut snapshots: QuoteSnapshots = self
            .config
            .quote_currencies
            .iter()
            .map(|quote| {
                let set: SnapshotSet = self.clients.iter().map(|c| (c.venue().to_string(), None)).collect();
                (quote.clone(), set)
            })
            .collect();

        while let Some(joined) = tasks.join_next().await {
            let (quote, venue, result) = match joined {
                Ok(output) => output,
                Err(e) => {
                    warn!("Snapshot task failed: {}", e);
                    continue;
                }
            };
            let snapshot = match result {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    warn!("Failed to fetch {}/{} from {}: {}", self.config.symbol, quote, venue, e);
                    None
                }
            };
            if let Some(set) = snapshots.get_mut(&quote) {
                set.insert(venue, snapshot);
            }
        }
        snapshots
    }

    /// Fetches one snapshot per venue and quote currency, keeping the errors.
    pub async fn check_connectivity(&self) -> Vec<ConnectivityCheck> {
        let mut checks = Vec::new();
        for client in &self.clients {
            for quote in &self.config.quote_currencies {
                checks.push(ConnectivityCheck {
                    venue: client.venue().to_string(),
                    quote: quote.clone(),
                    result: client.fetch_snapshot(&self.config.symbol, quote).await,
                });
            }
        }
        checks
    }

    /// Runs one polling cycle. Statistics advance exactly once per call.
    ///
    /// Fails only when no venue answered for any quote currency or when the
    /// balance lookup for the chosen trade fails; venue outages otherwise
    /// just narrow the scan.
    pub async fn run_iteration(&mut self) -> BotResult<IterationReport> {
        self.statistics.record_iteration();

        let snapshots = self.collect_snapshots().await;
        utils::print_prices(&snapshots);

        if snapshots.values().flat_map(|set| set.values()).all(Option::is_none) {
            return Err(BotError::Network {
                message: format!("no venue returned a {} snapshot", self.config.symbol),
                source: None,
                retry_count: 0,
            });
        }

        let mut report = IterationReport {
            opportunities: self.scan_all(&snapshots)?,
            ..Default::default()
        };
        self.statistics.record_found(report.opportunities.len());

        let Some(best) = report.opportunities.first() else {
            info!("No opportunities above {}% this cycle", self.config.detection.min_profit_pct);
            return Ok(report);
        };
        utils::print_opportunity(best);
        utils::print_other_opportunities(&report.opportunities[1..]);

        let buy_client = self.client(&best.buy_venue)?;
        let sell_client = self.client(&best.sell_venue)?;
        let balances = self.engine.fetch_balances(best, buy_client, sell_client).await?;
        debug!(
            buyer_quote = %balances.buyer_quote,
            seller_base = %balances.seller_base,
            "Balances for {}", best.pair_id()
        );

        match size_trade(
            best,
            balances.buyer_quote,
            balances.seller_base,
            self.config.detection.reference_notional,
            &self.config.detection,
        ) {
            Ok(trade) => {
                info!("Sized trade: {} {} (limited by {:?})", trade.quantity, best.instrument, trade.limited_by);
                let execution = self.engine.execute(best, &trade, buy_client, sell_client).await;
                self.statistics.record_executed();
                if execution.requires_manual_intervention() {
                    self.statistics.record_manual_intervention();
                }
                utils::print_trade_execution(&execution);
                report.execution = Some(execution);
            }
            Err(rejection) => {
                warn!("Skipping {}: {}", best.pair_id(), rejection);
                report.skipped = Some(rejection);
            }
        }

        Ok(report)
    }

    fn scan_all(&self, snapshots: &QuoteSnapshots) -> BotResult<Vec<ArbitrageOpportunity>> {
        let mut all = Vec::new();
        for set in snapshots.values() {
            all.extend(scan(set, &self.config.detection)?);
        }
        rank(&mut all);
        Ok(all)
    }
}
