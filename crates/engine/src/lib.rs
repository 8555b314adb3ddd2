pub mod binance;
pub mod scanner;

pub use binance::BinanceClient;
pub use scanner::{ScanReport, ScanSettings, Scanner, KLINE_INTERVAL};
