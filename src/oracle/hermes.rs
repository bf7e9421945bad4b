//! Hermes Oracle Feed Client
//!
//! Two independent operations against the Pyth Hermes aggregation service:
//! a JSON price read (for signal math and price bounds) and a binary
//! update-data fetch (for the on-chain oracle refresh), plus the on-chain
//! `getUpdateFee` quote for submitting those updates.
//!
//! The price read and the update fetch are separate requests and are not
//! synchronized to the same publish instant; preparation always fetches
//! both fresh within one run because the executor contract re-validates
//! freshness against `maxAgeSec` at execution time.
//!
//! Author: AI-Generated
//! Created: 2026-08-05

use crate::contracts::IPyth;
use crate::errors::PipelineError;
use crate::provider::HttpProvider;
use crate::types::{OracleReading, UpdateBundle};
use alloy::primitives::{Address, Bytes, B256, U256};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_HERMES_BASE_URL: &str = "https://hermes.pyth.network";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ── Hermes wire shapes ───────────────────────────────────────────────
// Price and exponent must deserialize as numbers; anything else makes
// the reading unusable for sizing a trade and fails the whole fetch.

#[derive(Debug, Deserialize)]
struct LatestPriceResponse {
    prices: Vec<PriceEntry>,
}

#[derive(Debug, Deserialize)]
struct PriceEntry {
    price: PriceFields,
}

#[derive(Debug, Deserialize)]
struct PriceFields {
    price: i64,
    expo: i32,
    #[serde(default)]
    conf: u64,
    #[serde(default, alias = "publishTime")]
    publish_time: i64,
}

#[derive(Debug, Deserialize)]
struct LatestUpdateResponse {
    binary: BinaryData,
}

#[derive(Debug, Deserialize)]
struct BinaryData {
    data: Vec<String>,
}

/// Hermes REST client.
#[derive(Clone)]
pub struct HermesClient {
    base_url: String,
    client: reqwest::Client,
}

impl HermesClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("reqwest client construction cannot fail with static options"),
        }
    }

    /// Fetch the latest price observation for a feed.
    pub async fn latest_price(&self, id: B256) -> Result<OracleReading, PipelineError> {
        let url = format!(
            "{}/v2/price/latest?ids[]={}",
            self.base_url,
            feed_id_param(&id)
        );
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PipelineError::oracle(format!("price request failed: {}", e)))?;
        if !resp.status().is_success() {
            return Err(PipelineError::oracle(format!(
                "price endpoint returned {}",
                resp.status()
            )));
        }

        let body: LatestPriceResponse = resp
            .json()
            .await
            .map_err(|e| PipelineError::oracle(format!("malformed price response: {}", e)))?;
        let entry = body
            .prices
            .into_iter()
            .next()
            .ok_or_else(|| PipelineError::oracle("price response contained no feeds"))?;

        Ok(OracleReading {
            id,
            price: entry.price.price,
            expo: entry.price.expo,
            conf: entry.price.conf,
            publish_time: entry.price.publish_time,
        })
    }

    /// Fetch fresh binary update payloads for one or more feeds.
    /// Zero payloads is a failure: there is nothing to submit on-chain.
    pub async fn latest_update_data(&self, ids: &[B256]) -> Result<Vec<Bytes>, PipelineError> {
        let mut qs = String::new();
        for id in ids {
            qs.push_str("ids[]=");
            qs.push_str(&feed_id_param(id));
            qs.push('&');
        }
        let url = format!("{}/v2/updates/price/latest?{}encoding=hex", self.base_url, qs);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PipelineError::oracle(format!("update request failed: {}", e)))?;
        if !resp.status().is_success() {
            return Err(PipelineError::oracle(format!(
                "update endpoint returned {}",
                resp.status()
            )));
        }

        let body: LatestUpdateResponse = resp
            .json()
            .await
            .map_err(|e| PipelineError::oracle(format!("malformed update response: {}", e)))?;
        if body.binary.data.is_empty() {
            return Err(PipelineError::oracle("no update data returned"));
        }

        body.binary
            .data
            .iter()
            .map(|s| {
                alloy::hex::decode(s)
                    .map(Bytes::from)
                    .map_err(|e| PipelineError::oracle(format!("invalid update payload hex: {}", e)))
            })
            .collect()
    }

    /// Quote the on-chain fee required to submit the given update payloads.
    pub async fn update_fee(
        &self,
        provider: &HttpProvider,
        pyth: Address,
        update_data: &[Bytes],
    ) -> Result<U256, PipelineError> {
        let contract = IPyth::new(pyth, provider.clone());
        contract
            .getUpdateFee(update_data.to_vec())
            .call()
            .await
            .map_err(|e| PipelineError::oracle(format!("getUpdateFee failed: {}", e)))
    }

    /// Fetch update payloads and their submission fee together, fresh.
    pub async fn fetch_update_bundle(
        &self,
        provider: &HttpProvider,
        pyth: Address,
        id: B256,
    ) -> Result<UpdateBundle, PipelineError> {
        let data = self.latest_update_data(&[id]).await?;
        let fee_wei = self.update_fee(provider, pyth, &data).await?;
        debug!(
            "Update bundle for {}: {} payloads, fee {} wei",
            feed_id_param(&id),
            data.len(),
            fee_wei
        );
        Ok(UpdateBundle { id, data, fee_wei })
    }
}

fn feed_id_param(id: &B256) -> String {
    format!("0x{}", alloy::hex::encode(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_response_parses_numeric_fields() {
        let raw = r#"{"prices":[{"price":{"price":6479273554,"expo":-8,"conf":4358061,"publish_time":1722945600}}]}"#;
        let parsed: LatestPriceResponse = serde_json::from_str(raw).unwrap();
        let p = &parsed.prices[0].price;
        assert_eq!(p.price, 6_479_273_554);
        assert_eq!(p.expo, -8);
        assert_eq!(p.conf, 4_358_061);
        assert_eq!(p.publish_time, 1_722_945_600);
    }

    #[test]
    fn test_price_response_rejects_non_numeric_price() {
        // A stringly-typed price must not deserialize into a usable reading.
        let raw = r#"{"prices":[{"price":{"price":"6479273554","expo":-8}}]}"#;
        assert!(serde_json::from_str::<LatestPriceResponse>(raw).is_err());
    }

    #[test]
    fn test_price_response_accepts_camel_case_publish_time() {
        let raw = r#"{"prices":[{"price":{"price":100,"expo":-8,"publishTime":42}}]}"#;
        let parsed: LatestPriceResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.prices[0].price.publish_time, 42);
    }

    #[test]
    fn test_update_response_parses_hex_payloads() {
        let raw = r#"{"binary":{"encoding":"hex","data":["504e4155","deadbeef"]}}"#;
        let parsed: LatestUpdateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.binary.data.len(), 2);
        let decoded = alloy::hex::decode(&parsed.binary.data[0]).unwrap();
        assert_eq!(decoded, vec![0x50, 0x4e, 0x41, 0x55]);
    }

    #[test]
    fn test_feed_id_param_is_prefixed_hex() {
        let id: B256 = B256::repeat_byte(0xab);
        let s = feed_id_param(&id);
        assert!(s.starts_with("0x"));
        assert_eq!(s.len(), 66);
    }
}
