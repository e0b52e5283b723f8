// Analyzer module: indicators, trend classifiers and decision tables.

pub mod cross;
pub mod decision;
pub mod market_indicators;
pub mod stage;
pub mod support;

pub use market_indicators::MarketIndicators;
pub use stage::Stage;
