//! Pipeline Error Taxonomy
//!
//! Every pipeline stage returns its success payload or exactly one of these
//! errors, carrying enough context (stage, identifier, parameter) to act on.
//! Stages never partially populate a result and never substitute defaults
//! for resolved addresses, decimals, or oracle prices.
//!
//! Author: AI-Generated
//! Created: 2026-08-05

use thiserror::Error;

/// Errors surfaced by the arbitrage pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Identifier could not be mapped to an EVM address, or token decimals
    /// could not be determined. Local to one resolution call; aborts the run.
    #[error("resolution failed for '{id}': {reason}")]
    Resolution { id: String, reason: String },

    /// Router quoting call reverted or returned a malformed result.
    #[error("router quote failed: {reason}")]
    Quote { reason: String },

    /// Oracle service unreachable, returned non-numeric price/exponent,
    /// or returned zero update payloads.
    #[error("oracle unavailable: {reason}")]
    OracleUnavailable { reason: String },

    /// Required endpoint/key/address not configured for the requested
    /// execution path. Surfaced immediately, never silently defaulted.
    #[error("missing configuration: {name}")]
    ConfigMissing { name: &'static str },

    /// Insufficient balance or allowance detected before dispatch.
    /// Blocking for the wallet/server paths; the delegated path reports
    /// the same condition as a non-error outcome instead.
    #[error("precheck failed: {what} {have} below required {need}")]
    Precheck {
        what: &'static str,
        have: String,
        need: String,
    },

    /// Transaction reverted, or RPC/network error during submission or
    /// confirmation wait. Never retried automatically.
    #[error("dispatch failed: {reason}")]
    Dispatch { reason: String },

    /// Caller-supplied value that cannot be used (malformed amount,
    /// zero oracle price, out-of-range exponent).
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },
}

impl PipelineError {
    pub fn resolution(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resolution {
            id: id.into(),
            reason: reason.into(),
        }
    }

    pub fn quote(reason: impl Into<String>) -> Self {
        Self::Quote {
            reason: reason.into(),
        }
    }

    pub fn oracle(reason: impl Into<String>) -> Self {
        Self::OracleUnavailable {
            reason: reason.into(),
        }
    }

    pub fn dispatch(reason: impl Into<String>) -> Self {
        Self::Dispatch {
            reason: reason.into(),
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_error_names_identifier() {
        let err = PipelineError::resolution("0.0.429274", "no lookup produced an EVM address");
        let msg = err.to_string();
        assert!(msg.contains("0.0.429274"));
        assert!(msg.contains("resolution failed"));
    }

    #[test]
    fn test_config_missing_names_variable() {
        let err = PipelineError::ConfigMissing {
            name: "SERVER_SIGNER_KEY",
        };
        assert!(err.to_string().contains("SERVER_SIGNER_KEY"));
    }
}
