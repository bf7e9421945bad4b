//! Delegated Execution Service Client
//!
//! Forwards a prepared guarded-swap parameter set to a third-party
//! delegated-signing service that signs and submits on behalf of a
//! delegator-controlled account. This process never sees the delegator's
//! key; permission/session enforcement lives inside the service.
//!
//! Author: AI-Generated
//! Created: 2026-08-05

use crate::errors::PipelineError;
use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Executor parameter set mirrored to the service, wei values as decimal
/// strings and payloads as 0x-prefixed hex.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegatedParams {
    pub executor: String,
    pub router: String,
    pub token_in: String,
    pub token_out: String,
    pub amount_in_wei: String,
    pub min_amount_out_wei: String,
    pub recipient: String,
    pub price_update_data: Vec<String>,
    pub price_id: String,
    pub max_age_sec: u64,
    pub min_price_1e8: String,
    pub max_price_1e8: String,
    pub fee_wei: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExecuteRequest<'a> {
    delegator_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    app_id: Option<u64>,
    params: &'a DelegatedParams,
}

/// Unified service response: success carries a tx hash, failure carries a
/// typed reason plus message.
#[derive(Debug, Deserialize)]
struct ExecuteResponse {
    #[serde(rename = "txHash")]
    tx_hash: Option<String>,
    timestamp: Option<u64>,
    reason: Option<String>,
    #[serde(alias = "error")]
    message: Option<String>,
}

/// Typed refusal reasons defined by the service contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelegatedFailure {
    InsufficientAllowance,
    InsufficientBalance,
    InvalidParams,
}

impl DelegatedFailure {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "INSUFFICIENT_ALLOWANCE" => Some(Self::InsufficientAllowance),
            "INSUFFICIENT_BALANCE" => Some(Self::InsufficientBalance),
            "INVALID_PARAMS" => Some(Self::InvalidParams),
            _ => None,
        }
    }
}

/// Result of a delegated execution attempt.
#[derive(Debug, Clone)]
pub enum DelegatedOutcome {
    Submitted {
        tx_hash: String,
        timestamp: u64,
    },
    /// The service declined without submitting; not a pipeline error.
    Refused {
        reason: DelegatedFailure,
        message: String,
    },
}

/// HTTP client for the delegated execution service.
#[derive(Clone)]
pub struct DelegatedClient {
    base_url: String,
    app_id: Option<u64>,
    client: reqwest::Client,
}

impl DelegatedClient {
    pub fn new(base_url: &str, app_id: Option<u64>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            app_id,
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("reqwest client construction cannot fail with static options"),
        }
    }

    /// Submit the parameter set for delegated signing and relay the result.
    pub async fn execute(
        &self,
        delegator: Address,
        params: &DelegatedParams,
    ) -> Result<DelegatedOutcome, PipelineError> {
        let body = ExecuteRequest {
            delegator_address: delegator.to_string(),
            app_id: self.app_id,
            params,
        };

        debug!("Delegated execute for {} via {}", delegator, self.base_url);

        let resp = self
            .client
            .post(&self.base_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::dispatch(format!("delegated service request failed: {}", e)))?;

        let status = resp.status();
        let parsed: ExecuteResponse = resp.json().await.map_err(|e| {
            PipelineError::dispatch(format!(
                "delegated service returned unreadable body (HTTP {}): {}",
                status, e
            ))
        })?;

        if let Some(tx_hash) = parsed.tx_hash {
            let timestamp = parsed.timestamp.unwrap_or(0);
            info!("Delegated swap submitted: {} at {}", tx_hash, timestamp);
            return Ok(DelegatedOutcome::Submitted { tx_hash, timestamp });
        }

        let message = parsed
            .message
            .unwrap_or_else(|| format!("delegated service HTTP {}", status));

        match parsed.reason.as_deref().and_then(DelegatedFailure::parse) {
            Some(reason) => Ok(DelegatedOutcome::Refused { reason, message }),
            None => Err(PipelineError::dispatch(format!(
                "delegated execution failed: {}",
                message
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_reason_parsing() {
        assert_eq!(
            DelegatedFailure::parse("INSUFFICIENT_ALLOWANCE"),
            Some(DelegatedFailure::InsufficientAllowance)
        );
        assert_eq!(
            DelegatedFailure::parse("INSUFFICIENT_BALANCE"),
            Some(DelegatedFailure::InsufficientBalance)
        );
        assert_eq!(
            DelegatedFailure::parse("INVALID_PARAMS"),
            Some(DelegatedFailure::InvalidParams)
        );
        assert_eq!(DelegatedFailure::parse("SOMETHING_ELSE"), None);
    }

    #[test]
    fn test_success_response_shape() {
        let raw = r#"{"txHash":"0xabc","timestamp":1722945600}"#;
        let parsed: ExecuteResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.tx_hash.as_deref(), Some("0xabc"));
        assert_eq!(parsed.timestamp, Some(1_722_945_600));
        assert!(parsed.reason.is_none());
    }

    #[test]
    fn test_failure_response_shape() {
        let raw = r#"{"reason":"INSUFFICIENT_BALANCE","error":"balance 5 < 10"}"#;
        let parsed: ExecuteResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.tx_hash.is_none());
        assert_eq!(parsed.reason.as_deref(), Some("INSUFFICIENT_BALANCE"));
        assert_eq!(parsed.message.as_deref(), Some("balance 5 < 10"));
    }

    #[test]
    fn test_params_serialize_camel_case() {
        let params = DelegatedParams {
            executor: "0x01".into(),
            router: "0x02".into(),
            token_in: "0x03".into(),
            token_out: "0x04".into(),
            amount_in_wei: "1000".into(),
            min_amount_out_wei: "990".into(),
            recipient: "0x05".into(),
            price_update_data: vec!["0x504e4155".into()],
            price_id: "0x06".into(),
            max_age_sec: 60,
            min_price_1e8: "99500000".into(),
            max_price_1e8: "100500000".into(),
            fee_wei: "7".into(),
        };
        let json = serde_json::to_value(&params).unwrap();
        assert!(json.get("amountInWei").is_some());
        assert!(json.get("minAmountOutWei").is_some());
        assert!(json.get("priceUpdateData").is_some());
        assert!(json.get("maxAgeSec").is_some());
        assert!(json.get("amount_in_wei").is_none());
    }
}
