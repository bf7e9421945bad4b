//! Signal Evaluator
//!
//! Compares the DEX-implied price to the oracle price and decides whether
//! the spread clears the configured threshold. The sign of the spread is
//! preserved (positive = DEX overpriced vs oracle) for downstream
//! directional logic, even though execution triggers symmetrically.
//!
//! Author: AI-Generated
//! Created: 2026-08-05

use crate::errors::PipelineError;
use serde::Serialize;
use tracing::debug;

/// Outcome of one spread evaluation.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Signal {
    pub dex_price: f64,
    pub oracle_price: f64,
    /// (dex − oracle) / oracle × 10000, sign preserved.
    pub spread_bps: f64,
    pub threshold_bps: u32,
    /// True iff |spread_bps| ≥ threshold_bps (inclusive boundary).
    pub should_execute: bool,
}

/// Evaluate the spread between a DEX-implied price and an oracle price,
/// both expressed in the same unit convention.
///
/// A zero or non-finite oracle price is invalid input and fails fast
/// rather than producing an infinite spread.
pub fn evaluate(
    dex_price: f64,
    oracle_price: f64,
    threshold_bps: u32,
) -> Result<Signal, PipelineError> {
    if !oracle_price.is_finite() || oracle_price == 0.0 {
        return Err(PipelineError::invalid(format!(
            "oracle price {} cannot anchor a spread",
            oracle_price
        )));
    }
    if !dex_price.is_finite() {
        return Err(PipelineError::invalid(format!(
            "DEX price {} is not usable",
            dex_price
        )));
    }

    let spread_bps = (dex_price - oracle_price) / oracle_price * 10_000.0;
    let should_execute = spread_bps.abs() >= threshold_bps as f64;

    debug!(
        "Signal: dex={:.8} oracle={:.8} spread={:.2}bps threshold={}bps execute={}",
        dex_price, oracle_price, spread_bps, threshold_bps, should_execute
    );

    Ok(Signal {
        dex_price,
        oracle_price,
        spread_bps,
        threshold_bps,
        should_execute,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spread_sign_convention() {
        // DEX overpriced by 1% => +100 bps
        let s = evaluate(101.0, 100.0, 100).unwrap();
        assert!((s.spread_bps - 100.0).abs() < 1e-9);

        // DEX underpriced by 1% => -100 bps
        let s = evaluate(99.0, 100.0, 100).unwrap();
        assert!((s.spread_bps + 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        // Exactly at threshold triggers in both directions.
        assert!(evaluate(101.0, 100.0, 100).unwrap().should_execute);
        assert!(evaluate(99.0, 100.0, 100).unwrap().should_execute);
        // Just inside the threshold does not.
        assert!(!evaluate(100.5, 100.0, 100).unwrap().should_execute);
        assert!(!evaluate(99.5, 100.0, 100).unwrap().should_execute);
    }

    #[test]
    fn test_zero_oracle_price_fails_fast() {
        let err = evaluate(100.0, 0.0, 100).unwrap_err();
        assert!(err.to_string().contains("oracle price"));
    }

    #[test]
    fn test_non_finite_inputs_rejected() {
        assert!(evaluate(f64::NAN, 100.0, 100).is_err());
        assert!(evaluate(100.0, f64::INFINITY, 100).is_err());
    }
}
