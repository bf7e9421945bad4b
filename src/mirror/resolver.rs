//! Identifier and Decimals Resolver
//!
//! Maps operator-supplied token/contract identifiers (native `0.0.x` entity
//! ids or `0x…` EVM addresses) to canonical EVM addresses via the Hedera
//! mirror node, and determines token display-decimals.
//!
//! Resolution order: hex passthrough (no network call) → `/contracts/{id}`
//! → `/tokens/{id}` → failure. Decimals order: explicit value → mirror
//! token metadata (entity ids only) → on-chain `decimals()`.
//!
//! No retries here; callers retry a whole pipeline run instead.
//!
//! Author: AI-Generated
//! Created: 2026-08-05

use crate::contracts::IERC20;
use crate::errors::PipelineError;
use crate::provider::HttpProvider;
use alloy::primitives::Address;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_MIRROR_BASE_URL: &str = "https://testnet.mirrornode.hedera.com/api/v1";

/// Per-request timeout. A slow lookup fails over to the next strategy
/// rather than hanging the whole tick.
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Mirror node entity payload (shared shape for contracts and tokens).
/// The mirror API serves `decimals` as a JSON string on some endpoints
/// and a number on others, so it is coerced after the fact.
#[derive(Debug, Deserialize)]
struct EntityResponse {
    evm_address: Option<String>,
    #[serde(default)]
    decimals: Option<serde_json::Value>,
}

/// One row from the mirror token search.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenInfo {
    pub token_id: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    decimals: Option<serde_json::Value>,
    #[serde(default)]
    pub evm_address: Option<String>,
    #[serde(rename = "type", default)]
    pub token_type: Option<String>,
}

impl TokenInfo {
    pub fn decimals(&self) -> Option<u8> {
        coerce_decimals(self.decimals.as_ref())
    }
}

#[derive(Debug, Deserialize)]
struct TokenListResponse {
    #[serde(default)]
    tokens: Vec<TokenInfo>,
}

/// Returns true if `s` already has the canonical EVM address shape.
pub fn is_hex_address(s: &str) -> bool {
    s.len() == 42
        && s.starts_with("0x")
        && s[2..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Returns true if `s` has the native numeric-triplet entity id shape
/// (`shard.realm.num`, e.g. `0.0.429274`).
pub fn is_entity_id(s: &str) -> bool {
    let parts: Vec<&str> = s.split('.').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}

/// Mirror node REST client for identifier resolution.
#[derive(Clone)]
pub struct MirrorClient {
    base_url: String,
    client: reqwest::Client,
}

impl MirrorClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .timeout(LOOKUP_TIMEOUT)
                .build()
                .expect("reqwest client construction cannot fail with static options"),
        }
    }

    /// Resolve an identifier to a canonical EVM address.
    ///
    /// Hex-shaped input is returned unchanged with zero network calls.
    /// Otherwise the contract registry is tried first, then the token
    /// registry; if neither yields an address the identifier is
    /// unresolvable and the run aborts.
    pub async fn resolve_to_evm(&self, id: &str) -> Result<Address, PipelineError> {
        if is_hex_address(id) {
            return id.parse::<Address>().map_err(|e| {
                PipelineError::resolution(id, format!("malformed EVM address: {}", e))
            });
        }

        if let Some(addr) = self.lookup_evm_address("contracts", id).await {
            debug!("Resolved {} via contract lookup: {}", id, addr);
            return Ok(addr);
        }
        if let Some(addr) = self.lookup_evm_address("tokens", id).await {
            debug!("Resolved {} via token lookup: {}", id, addr);
            return Ok(addr);
        }

        Err(PipelineError::resolution(
            id,
            "no contract or token lookup produced an EVM address",
        ))
    }

    /// Determine token decimals for an identifier/address pair.
    ///
    /// An explicit value wins unconditionally. Entity-id identifiers are
    /// looked up in mirror token metadata next. The on-chain `decimals()`
    /// read is the last resort; its failure is fatal to the run.
    pub async fn token_decimals(
        &self,
        provider: &HttpProvider,
        original_id: &str,
        evm_addr: Address,
        provided: Option<u8>,
    ) -> Result<u8, PipelineError> {
        if let Some(dec) = provided {
            return Ok(dec);
        }

        if is_entity_id(original_id) {
            if let Some(dec) = self.lookup_token_decimals(original_id).await {
                debug!("Decimals for {} from mirror metadata: {}", original_id, dec);
                return Ok(dec);
            }
        }

        let erc20 = IERC20::new(evm_addr, provider.clone());
        erc20.decimals().call().await.map_err(|e| {
            PipelineError::resolution(
                original_id,
                format!("decimals() read failed for {}: {}", evm_addr, e),
            )
        })
    }

    /// Search the token registry by symbol and/or name.
    pub async fn search_tokens(
        &self,
        symbol: Option<&str>,
        name: Option<&str>,
        limit: u32,
    ) -> Result<Vec<TokenInfo>, PipelineError> {
        let query = symbol.or(name).unwrap_or("").to_string();
        let mut url = format!("{}/tokens?limit={}", self.base_url, limit);
        if let Some(s) = symbol {
            url.push_str(&format!("&symbol={}", s));
        }
        if let Some(n) = name {
            url.push_str(&format!("&name={}", n));
        }

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PipelineError::resolution(&query, format!("token search failed: {}", e)))?;
        if !resp.status().is_success() {
            return Err(PipelineError::resolution(
                &query,
                format!("token search returned {}", resp.status()),
            ));
        }

        let body: TokenListResponse = resp.json().await.map_err(|e| {
            PipelineError::resolution(&query, format!("malformed token search response: {}", e))
        })?;
        Ok(body.tokens)
    }

    /// Single registry lookup. Any transport/HTTP/parse failure falls
    /// through to the next strategy (returns None), it is not terminal.
    async fn lookup_evm_address(&self, endpoint: &str, id: &str) -> Option<Address> {
        let url = format!("{}/{}/{}", self.base_url, endpoint, id);
        let resp = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Mirror {} lookup failed for {}: {}", endpoint, id, e);
                return None;
            }
        };
        if !resp.status().is_success() {
            debug!(
                "Mirror {} lookup for {} returned {}",
                endpoint,
                id,
                resp.status()
            );
            return None;
        }

        let entity: EntityResponse = resp.json().await.ok()?;
        let evm = entity.evm_address?;
        if !evm.starts_with("0x") {
            return None;
        }
        evm.parse::<Address>().ok()
    }

    async fn lookup_token_decimals(&self, id: &str) -> Option<u8> {
        let url = format!("{}/tokens/{}", self.base_url, id);
        let resp = self.client.get(&url).send().await.ok()?;
        if !resp.status().is_success() {
            return None;
        }
        let entity: EntityResponse = resp.json().await.ok()?;
        coerce_decimals(entity.decimals.as_ref())
    }
}

/// Accept mirror `decimals` as a JSON number or a numeric string.
fn coerce_decimals(value: Option<&serde_json::Value>) -> Option<u8> {
    match value? {
        serde_json::Value::Number(n) => n.as_u64().and_then(|v| u8::try_from(v).ok()),
        serde_json::Value::String(s) => s.parse::<u8>().ok(),
        _ => None,
    }
}
