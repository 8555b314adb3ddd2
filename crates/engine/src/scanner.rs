use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use common::{Config, Error, MarketData, Notifier, Result};
use strategy::{SetupParams, Strategy, TradeSetup};

/// Kline interval requested for every symbol.
pub const KLINE_INTERVAL: &str = "15m";

/// Runtime knobs of the scan loop, fixed for the process lifetime.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    /// Only symbols ending with this asset are scanned.
    pub quote_asset: String,
    pub interval: String,
    /// Candles per window.
    pub lookback: usize,
    /// Pause between two full passes.
    pub scan_interval: Duration,
    /// Upper bound on a single fetch (symbol list or klines).
    pub fetch_timeout: Duration,
    pub setup: SetupParams,
}

impl ScanSettings {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            quote_asset: cfg.quote_asset().to_string(),
            interval: KLINE_INTERVAL.to_string(),
            lookback: cfg.lookback,
            scan_interval: cfg.scan_interval,
            fetch_timeout: cfg.fetch_timeout,
            setup: SetupParams::for_mode(cfg.market_mode, cfg.futures_leverage),
        }
    }
}

/// Outcome counters of one pass over the symbol list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub scanned: usize,
    pub signals: usize,
    pub alerts: usize,
    pub skipped: usize,
    pub delivery_failures: usize,
    /// Shutdown was requested before the pass finished.
    pub interrupted: bool,
}

/// Periodic scan-and-notify loop.
///
/// Each pass lists the symbols for the configured quote asset and, one symbol
/// at a time, fetches a candle window, runs the strategy and sends an alert
/// for every signal. A failing symbol or a failed delivery is logged and the
/// pass moves on.
pub struct Scanner {
    market: Arc<dyn MarketData>,
    notifier: Arc<dyn Notifier>,
    strategy: Box<dyn Strategy>,
    settings: ScanSettings,
}

impl Scanner {
    pub fn new(
        market: Arc<dyn MarketData>,
        notifier: Arc<dyn Notifier>,
        strategy: Box<dyn Strategy>,
        settings: ScanSettings,
    ) -> Self {
        Self {
            market,
            notifier,
            strategy,
            settings,
        }
    }

    /// Run passes until `shutdown` turns `true` or its sender is dropped.
    /// Call from `tokio::spawn`.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            strategy = %self.strategy.name(),
            quote = %self.settings.quote_asset,
            interval = %self.settings.interval,
            every = ?self.settings.scan_interval,
            "Scanner running"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let report = self.scan_once(&shutdown).await;
            info!(
                scanned = report.scanned,
                signals = report.signals,
                alerts = report.alerts,
                skipped = report.skipped,
                delivery_failures = report.delivery_failures,
                "Scan pass complete"
            );

            if report.interrupted || self.wait_for_next_pass(&mut shutdown).await {
                break;
            }
        }
        info!("Scanner stopped");
    }

    /// One full pass over the symbol list.
    pub async fn scan_once(&self, shutdown: &watch::Receiver<bool>) -> ScanReport {
        let mut report = ScanReport::default();

        let symbols = match self.list_symbols().await {
            Ok(symbols) => symbols,
            Err(e) => {
                error!(error = %e, "Failed to list symbols, skipping this pass");
                return report;
            }
        };
        debug!(count = symbols.len(), "Symbols to scan");

        for symbol in &symbols {
            if *shutdown.borrow() {
                report.interrupted = true;
                break;
            }
            report.scanned += 1;

            let setup = match self.scan_symbol(symbol).await {
                Ok(Some(setup)) => setup,
                Ok(None) => continue,
                Err(Error::IncompleteIndicators) => {
                    debug!(symbol = %symbol, "Indicators incomplete, skipping");
                    report.skipped += 1;
                    continue;
                }
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "Skipping symbol");
                    report.skipped += 1;
                    continue;
                }
            };

            report.signals += 1;
            info!(
                symbol = %symbol,
                direction = %setup.direction,
                entry = setup.entry,
                atr = setup.atr,
                "Signal"
            );
            match self.notifier.send(&setup.render()).await {
                Ok(()) => report.alerts += 1,
                Err(e) => {
                    error!(symbol = %symbol, error = %e, "Failed to deliver alert");
                    report.delivery_failures += 1;
                }
            }
        }

        report
    }

    /// Fetch, compute and evaluate one symbol.
    pub async fn scan_symbol(&self, symbol: &str) -> Result<Option<TradeSetup>> {
        let fetch = self.market.recent_candles(
            symbol,
            &self.settings.interval,
            self.settings.lookback,
        );
        let candles = tokio::time::timeout(self.settings.fetch_timeout, fetch)
            .await
            .map_err(|_| Error::data_unavailable(symbol, "request timed out"))?
            .map_err(|e| Error::data_unavailable(symbol, e))?;
        if candles.is_empty() {
            return Err(Error::data_unavailable(symbol, "empty candle window"));
        }

        let series = self.strategy.indicators(&candles);
        let Some(signal) = self.strategy.evaluate(&candles, &series)? else {
            return Ok(None);
        };
        TradeSetup::from_window(symbol, &candles, &series, signal, &self.settings.setup).map(Some)
    }

    async fn list_symbols(&self) -> Result<Vec<String>> {
        tokio::time::timeout(
            self.settings.fetch_timeout,
            self.market.list_symbols(&self.settings.quote_asset),
        )
        .await
        .map_err(|_| Error::Http("symbol listing timed out".into()))?
    }

    /// Sleep until the next pass. Returns `true` if shutdown was requested meanwhile.
    async fn wait_for_next_pass(&self, shutdown: &mut watch::Receiver<bool>) -> bool {
        let sleep = tokio::time::sleep(self.settings.scan_interval);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                _ = &mut sleep => return false,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        return true;
                    }
                }
            }
        }
    }
}
