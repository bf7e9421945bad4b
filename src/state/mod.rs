//! Process-local mutable state: strategy parameters and the trade log.

pub mod strategy;
pub mod trades;

pub use strategy::{ArbitrageParams, ParamsUpdate, StrategyState};
pub use trades::{TradeLog, DEFAULT_TRADE_LOG_CAP};
