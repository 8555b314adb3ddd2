use std::sync::Arc;

use anyhow::Context;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use common::Config;
use engine::{BinanceClient, ScanSettings, Scanner};
use strategy::RsiEmaStrategy;
use telegram_notify::TelegramNotifier;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env().context("invalid configuration")?;
    info!(
        mode = %cfg.market_mode,
        quote = %cfg.quote_asset(),
        lookback = cfg.lookback,
        "Scanbot starting"
    );

    // ── Collaborators ─────────────────────────────────────────────────────────
    let market = Arc::new(
        BinanceClient::new(&cfg.binance_api_key, &cfg.binance_base_url, cfg.fetch_timeout)
            .context("failed to build Binance client")?,
    );
    let notifier = Arc::new(TelegramNotifier::new(&cfg.telegram_token, &cfg.telegram_chat_id));

    // ── Scanner ───────────────────────────────────────────────────────────────
    let scanner = Scanner::new(
        market,
        notifier,
        Box::new(RsiEmaStrategy::default()),
        ScanSettings::from_config(&cfg),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scan_task = tokio::spawn(scanner.run(shutdown_rx));

    // ── Shutdown ──────────────────────────────────────────────────────────────
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("Shutdown signal received. Finishing current symbol.");
    let _ = shutdown_tx.send(true);

    if let Err(e) = scan_task.await {
        warn!(error = %e, "Scanner task ended abnormally");
    }
    info!("Exiting.");
    Ok(())
}
