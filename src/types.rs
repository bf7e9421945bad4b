//! Core data structures for the arbitrage pipeline.

use alloy::primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A token or contract identifier as supplied by the operator, together with
/// its resolved on-chain form. Once resolved within a pipeline run the
/// address and decimals are immutable for that run.
#[derive(Debug, Clone, Serialize)]
pub struct TokenRef {
    /// Identifier as given: native entity id (`0.0.x`) or EVM address (`0x…`).
    pub given: String,
    pub address: Address,
    pub decimals: u8,
}

/// Point-in-time router quote for a two-hop path. Never cached across calls.
#[derive(Debug, Clone)]
pub struct SwapQuote {
    pub router: Address,
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
    pub amount_out: U256,
}

/// A single oracle price observation for one feed.
#[derive(Debug, Clone, Copy)]
pub struct OracleReading {
    pub id: B256,
    /// Raw integer price as published by the feed.
    pub price: i64,
    /// Decimal exponent; normalized price = price × 10^expo.
    pub expo: i32,
    /// Confidence interval in the same raw units as `price`.
    pub conf: u64,
    /// Publish timestamp, unix seconds.
    pub publish_time: i64,
}

impl OracleReading {
    /// Normalized price in quote-currency units.
    pub fn normalized(&self) -> f64 {
        self.price as f64 * 10f64.powi(self.expo)
    }
}

/// Fresh binary oracle update payloads plus the on-chain fee to apply them.
/// Fetched immediately before each preparation; time-sensitive, never reused
/// across ticks.
#[derive(Debug, Clone)]
pub struct UpdateBundle {
    pub id: B256,
    pub data: Vec<Bytes>,
    pub fee_wei: U256,
}

/// Fully-specified, slippage- and price-bounded swap proposal. Output of the
/// trade preparer, consumed unchanged by every execution path.
#[derive(Debug, Clone)]
pub struct SwapProposal {
    pub executor: Address,
    pub router: Address,
    pub token_in: TokenRef,
    pub token_out: TokenRef,
    /// Human-readable input amount as supplied.
    pub amount_in: String,
    pub amount_in_wei: U256,
    pub quote_out_wei: U256,
    /// quote_out_wei reduced by the slippage tolerance.
    pub min_amount_out_wei: U256,
    pub fee_wei: U256,
    pub price_id: B256,
    pub max_age_sec: u64,
    pub bounds_bps: u32,
    /// Oracle price scaled to a fixed exponent of −8.
    pub current_price_1e8: i64,
    pub min_price_1e8: i64,
    pub max_price_1e8: i64,
    pub update_data: Vec<Bytes>,
    pub owner: Option<Address>,
    pub allowance_wei: Option<U256>,
    pub needs_approval: Option<bool>,
}

/// How a prepared swap gets signed and submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionPath {
    /// End-user wallet signs; the pipeline only assembles calldata.
    Wallet,
    /// Server-held key signs and submits directly.
    Server,
    /// Third-party delegated signer submits on behalf of a delegator EOA.
    Delegated,
}

impl fmt::Display for ExecutionPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExecutionPath::Wallet => write!(f, "wallet"),
            ExecutionPath::Server => write!(f, "server"),
            ExecutionPath::Delegated => write!(f, "delegated"),
        }
    }
}

impl FromStr for ExecutionPath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wallet" => Ok(ExecutionPath::Wallet),
            "server" => Ok(ExecutionPath::Server),
            "delegated" => Ok(ExecutionPath::Delegated),
            other => Err(format!(
                "unknown execution path '{}' (expected wallet, server, or delegated)",
                other
            )),
        }
    }
}

/// Record of a successfully dispatched trade, most-recent-first in the log.
#[derive(Debug, Clone, Serialize)]
pub struct TradeRecord {
    pub tx_hash: String,
    pub path: ExecutionPath,
    pub amount_in_wei: String,
    pub token_in: Address,
    pub token_out: Address,
    pub recipient: Address,
    /// Unix seconds at dispatch.
    pub at: i64,
}
