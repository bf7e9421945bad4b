//! RPC provider construction.
//!
//! A single HTTP JSON-RPC connection (Hashio relay on testnet) serves all
//! read-only calls. The server-signer path builds its own wallet-filled
//! provider at dispatch time so key material never outlives the call.

use crate::errors::PipelineError;
use alloy::network::Ethereum;
use alloy::providers::RootProvider;
use url::Url;

pub type HttpProvider = RootProvider<Ethereum>;

/// Build a read-only HTTP provider from an RPC endpoint URL.
pub fn connect_http(rpc_url: &str) -> Result<HttpProvider, PipelineError> {
    let url = Url::parse(rpc_url).map_err(|e| PipelineError::InvalidInput {
        reason: format!("invalid RPC URL '{}': {}", rpc_url, e),
    })?;
    Ok(RootProvider::new_http(url))
}
