//! Spread Arbitrage Bot - Main Entry Point

use spread_arb_bot::*;
use anyhow::Result;
use std::time::Instant;
use tokio::time;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    utils::setup_output_directories()?;
    let _logging_guard = utils::setup_logging()?;

    if std::env::args().any(|arg| arg == "--check") {
        return run_setup_check().await;
    }

    let config = Config::load()?;
    utils::print_config_banner(&config);

    let clients = network::build_clients(&config)?;
    let circuit_breaker = errors::CircuitBreaker::new(
        config.max_consecutive_errors,
        config.circuit_breaker_cooldown(),
    );
    let mut interval = time::interval(config.check_interval());
    let mut monitor = monitor::Monitor::new(config, clients);

    // Setup shutdown handler
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("\n📛 Received shutdown signal (Ctrl+C)..."),
            Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
        }
        let _ = shutdown_tx.send(());
    });

    let start_time = Instant::now();
    info!("\n🚀 Starting main monitoring loop...\n");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(e) = circuit_breaker.check().await {
                    warn!("⚡ {}", e);
                    continue;
                }
                match monitor.run_iteration().await {
                    Ok(_) => circuit_breaker.record_success().await,
                    Err(e) => {
                        error!("Monitoring cycle error: {}", e);
                        if circuit_breaker.record_error().await {
                            error!("Circuit breaker activated due to monitoring errors");
                        }
                    }
                }
                let stats = monitor.statistics();
                if stats.iterations % 50 == 0 {
                    utils::print_statistics(&stats, start_time.elapsed());
                }
            }
            _ = &mut shutdown_rx => {
                info!("Shutdown signal received, exiting main loop...");
                break;
            }
        }
    }

    info!("\n🛑 Shutting down gracefully...");
    utils::print_statistics(&monitor.statistics(), start_time.elapsed());

    Ok(())
}

/// `--check`: report credentials (masked), trading mode and whether every
/// configured exchange answers, then exit.
async fn run_setup_check() -> Result<()> {
    info!("🔍 Verifying setup...");
    utils::print_credential_status(|key| std::env::var(key).ok());

    let config = Config::load()?;
    if config.dry_run {
        info!("🧪 Mode: DRY RUN (no real orders)");
    } else {
        warn!("🚨 Mode: LIVE TRADING");
    }

    let clients = network::build_clients(&config)?;
    let checks = monitor::Monitor::new(config, clients).check_connectivity().await;
    utils::print_connectivity_checks(&checks);

    let failed = checks.iter().filter(|c| c.result.is_err()).count();
    if failed > 0 {
        return Err(anyhow::anyhow!("{} of {} exchange checks failed", failed, checks.len()));
    }
    info!("✅ Setup looks good");
    Ok(())
}
