//! Quote Engine
//!
//! Read-only router quoting for a two-hop path via `getAmountsOut`.
//! No state mutation, no caching: every call is a fresh point-in-time
//! snapshot. Multi-hop paths are out of scope for this strategy.
//!
//! Author: AI-Generated
//! Created: 2026-08-05

use crate::contracts::IUniswapV2Router02;
use crate::errors::PipelineError;
use crate::provider::HttpProvider;
use crate::types::SwapQuote;
use alloy::primitives::{Address, U256};
use tracing::debug;

/// Quote the output amount for swapping `amount_in` of `token_in` into
/// `token_out` along the exact path [tokenIn, tokenOut].
pub async fn amounts_out(
    provider: &HttpProvider,
    router: Address,
    token_in: Address,
    token_out: Address,
    amount_in: U256,
) -> Result<SwapQuote, PipelineError> {
    let contract = IUniswapV2Router02::new(router, provider.clone());
    let amounts = contract
        .getAmountsOut(amount_in, vec![token_in, token_out])
        .call()
        .await
        .map_err(|e| PipelineError::quote(format!("getAmountsOut reverted: {}", e)))?;

    // Element [1] is the output leg of the two-hop path.
    if amounts.len() != 2 {
        return Err(PipelineError::quote(format!(
            "getAmountsOut returned {} elements for a 2-hop path",
            amounts.len()
        )));
    }
    let amount_out = amounts[1];

    debug!(
        "Quote: {} -> {} | in={} out={}",
        token_in, token_out, amount_in, amount_out
    );

    Ok(SwapQuote {
        router,
        token_in,
        token_out,
        amount_in,
        amount_out,
    })
}

/// DEX-implied price of one output token in input-token units:
/// amountIn / (amountOut / 10^decimalsOut). Used by the signal evaluator,
/// which compares it against the oracle price in the same unit convention.
pub fn implied_price(
    amount_in_human: f64,
    amount_out_wei: U256,
    decimals_out: u8,
) -> Result<f64, PipelineError> {
    if amount_out_wei.is_zero() {
        return Err(PipelineError::quote("router quoted zero output"));
    }
    let out_human = u256_to_f64(amount_out_wei) / 10f64.powi(decimals_out as i32);
    if out_human <= 0.0 || !out_human.is_finite() {
        return Err(PipelineError::quote(
            "quoted output not representable for price math",
        ));
    }
    Ok(amount_in_human / out_human)
}

/// Lossy conversion for price display/signal math only; wei-scale amounts
/// in proposals stay in U256.
fn u256_to_f64(v: U256) -> f64 {
    v.to_string().parse::<f64>().unwrap_or(f64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_implied_price_basic() {
        // 100 tokens in, 50e18 out (18 decimals) => 2.0 in/out
        let out = U256::from(50u64) * U256::from(10u64).pow(U256::from(18u64));
        let price = implied_price(100.0, out, 18).unwrap();
        assert!((price - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_implied_price_six_decimals() {
        // 10 in, 25_000_000 raw out at 6 decimals = 25.0 out => price 0.4
        let price = implied_price(10.0, U256::from(25_000_000u64), 6).unwrap();
        assert!((price - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_implied_price_zero_output_fails() {
        assert!(implied_price(10.0, U256::ZERO, 18).is_err());
    }
}
