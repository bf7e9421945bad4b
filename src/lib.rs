//! Oracle-Guarded DEX Arbitrage Bot Library
//!
//! Components for detecting DEX-vs-oracle price spreads on Hedera testnet
//! and executing oracle-guarded swaps through a wallet, a server-held
//! signer, or a delegated signing service.
//!
//! Author: AI-Generated
//! Created: 2026-08-05

pub mod arbitrage;
pub mod config;
pub mod contracts;
pub mod driver;
pub mod errors;
pub mod mirror;
pub mod oracle;
pub mod provider;
pub mod state;
pub mod tokens;
pub mod types;

// Re-export commonly used types
pub use config::{load_config, BotConfig};
pub use driver::{StrategyDriver, TickOutcome};
pub use errors::PipelineError;
pub use types::{ExecutionPath, OracleReading, SwapProposal, SwapQuote, TokenRef, TradeRecord};
