//! Trade Preparer
//!
//! Combines resolution, quoting, and oracle reads into a fully-specified,
//! slippage- and price-bounded swap proposal. All wei-scale and price-bound
//! arithmetic is integer-only; floats never touch values that reach the
//! chain.
//!
//! Every external call in the sequence (address resolution ×3, decimals ×2,
//! quote, update fetch, fee read, price read, optional allowance read) can
//! independently fail, and any failure aborts the whole preparation. There
//! is no partial-success return.
//!
//! Author: AI-Generated
//! Created: 2026-08-05
//! Modified: 2026-08-06 - integer-only price scaling and bounds

use crate::contracts::IERC20;
use crate::errors::PipelineError;
use crate::mirror::MirrorClient;
use crate::oracle::HermesClient;
use crate::provider::HttpProvider;
use crate::types::{SwapProposal, TokenRef};
use alloy::primitives::{Address, B256, U256};
use tracing::info;

/// Fixed target exponent for executor price bounds (1e-8 units).
const TARGET_EXPO: i32 = -8;

/// Inputs for one preparation run. Tolerances carry documented defaults
/// (slippage 50 bps, bounds 50 bps, max age 60 s) applied by the caller;
/// addresses and decimals are never defaulted.
#[derive(Debug, Clone)]
pub struct PrepareRequest {
    pub router: String,
    pub token_in: String,
    pub token_out: String,
    /// Human-readable input amount, e.g. "10" or "0.25".
    pub amount_in: String,
    pub decimals_in: Option<u8>,
    pub decimals_out: Option<u8>,
    pub price_id: B256,
    /// When set, the owner's allowance toward the executor is read and
    /// reported as `needs_approval`.
    pub owner: Option<Address>,
    pub max_age_sec: u64,
    pub slippage_bps: u32,
    pub bounds_bps: u32,
}

/// Builds guarded swap proposals from live resolution, quote, and oracle
/// state.
pub struct TradePreparer {
    provider: HttpProvider,
    mirror: MirrorClient,
    hermes: HermesClient,
    executor: Address,
    pyth: Address,
}

impl TradePreparer {
    pub fn new(
        provider: HttpProvider,
        mirror: MirrorClient,
        hermes: HermesClient,
        executor: Address,
        pyth: Address,
    ) -> Self {
        Self {
            provider,
            mirror,
            hermes,
            executor,
            pyth,
        }
    }

    /// Produce a complete SwapProposal for the given request.
    pub async fn prepare(&self, req: &PrepareRequest) -> Result<SwapProposal, PipelineError> {
        // Resolve all three identifiers concurrently; independent reads
        // within one run may be awaited jointly.
        let (router, token_in_addr, token_out_addr) = futures::try_join!(
            self.mirror.resolve_to_evm(&req.router),
            self.mirror.resolve_to_evm(&req.token_in),
            self.mirror.resolve_to_evm(&req.token_out),
        )?;

        let (decimals_in, decimals_out) = futures::try_join!(
            self.mirror
                .token_decimals(&self.provider, &req.token_in, token_in_addr, req.decimals_in),
            self.mirror.token_decimals(
                &self.provider,
                &req.token_out,
                token_out_addr,
                req.decimals_out
            ),
        )?;

        let token_in = TokenRef {
            given: req.token_in.clone(),
            address: token_in_addr,
            decimals: decimals_in,
        };
        let token_out = TokenRef {
            given: req.token_out.clone(),
            address: token_out_addr,
            decimals: decimals_out,
        };

        let amount_in_wei = to_base_units(&req.amount_in, decimals_in)?;

        let quote = super::quote::amounts_out(
            &self.provider,
            router,
            token_in.address,
            token_out.address,
            amount_in_wei,
        )
        .await?;
        let min_amount_out_wei = min_amount_out(quote.amount_out, req.slippage_bps);

        // Fresh update payloads + fee, then a fresh price for the bounds.
        // Both are fetched within this run; the executor contract
        // re-validates freshness against maxAgeSec at execution time.
        let bundle = self
            .hermes
            .fetch_update_bundle(&self.provider, self.pyth, req.price_id)
            .await?;
        let reading = self.hermes.latest_price(req.price_id).await?;

        let current_price_1e8 = scale_price_1e8(reading.price, reading.expo)?;
        let (min_price_1e8, max_price_1e8) = price_bounds(current_price_1e8, req.bounds_bps)?;

        let (allowance_wei, needs_approval) = match req.owner {
            Some(owner) => {
                let erc20 = IERC20::new(token_in.address, self.provider.clone());
                let allowance = erc20
                    .allowance(owner, self.executor)
                    .call()
                    .await
                    .map_err(|e| {
                        PipelineError::dispatch(format!(
                            "allowance read failed for {}: {}",
                            token_in.address, e
                        ))
                    })?;
                (Some(allowance), Some(allowance < amount_in_wei))
            }
            None => (None, None),
        };

        info!(
            "Prepared swap: {} {} -> {} | in={} quoteOut={} minOut={} | bounds=[{}, {}] fee={}",
            req.amount_in,
            token_in.given,
            token_out.given,
            amount_in_wei,
            quote.amount_out,
            min_amount_out_wei,
            min_price_1e8,
            max_price_1e8,
            bundle.fee_wei
        );

        Ok(SwapProposal {
            executor: self.executor,
            router,
            token_in,
            token_out,
            amount_in: req.amount_in.clone(),
            amount_in_wei,
            quote_out_wei: quote.amount_out,
            min_amount_out_wei,
            fee_wei: bundle.fee_wei,
            price_id: req.price_id,
            max_age_sec: req.max_age_sec,
            bounds_bps: req.bounds_bps,
            current_price_1e8,
            min_price_1e8,
            max_price_1e8,
            update_data: bundle.data,
            owner: req.owner,
            allowance_wei,
            needs_approval,
        })
    }
}

/// Convert a human-readable decimal amount into base units, truncating the
/// fraction toward zero past `decimals` places. Pure string/U256 math.
pub fn to_base_units(amount: &str, decimals: u8) -> Result<U256, PipelineError> {
    let s = amount.trim();
    if s.is_empty() || s.starts_with('-') || s.starts_with('+') {
        return Err(PipelineError::invalid(format!(
            "amount '{}' is not a non-negative decimal",
            amount
        )));
    }

    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, f),
        None => (s, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(PipelineError::invalid(format!("amount '{}' is empty", amount)));
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err(PipelineError::invalid(format!(
            "amount '{}' contains non-digit characters",
            amount
        )));
    }

    let scale = U256::from(10u64).pow(U256::from(decimals as u64));
    let int_val = if int_part.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(int_part, 10)
            .map_err(|e| PipelineError::invalid(format!("amount '{}': {}", amount, e)))?
    };

    // Fraction digits beyond `decimals` are truncated, not rounded.
    let frac_kept: String = frac_part.chars().take(decimals as usize).collect();
    let frac_val = if frac_kept.is_empty() {
        U256::ZERO
    } else {
        let raw = U256::from_str_radix(&frac_kept, 10)
            .map_err(|e| PipelineError::invalid(format!("amount '{}': {}", amount, e)))?;
        raw * U256::from(10u64).pow(U256::from((decimals as usize - frac_kept.len()) as u64))
    };

    int_val
        .checked_mul(scale)
        .and_then(|v| v.checked_add(frac_val))
        .ok_or_else(|| {
            PipelineError::invalid(format!(
                "amount '{}' overflows at {} decimals",
                amount, decimals
            ))
        })
}

/// minAmountOut = floor(amountOut × (10000 − slippageBps) / 10000).
pub fn min_amount_out(amount_out: U256, slippage_bps: u32) -> U256 {
    let keep = 10_000u64.saturating_sub(slippage_bps as u64);
    amount_out * U256::from(keep) / U256::from(10_000u64)
}

/// Scale an oracle (price, expo) pair to the fixed target exponent of −8
/// by repeated multiplication or truncating division by 10. Integer-only;
/// idempotent when the source exponent already equals −8.
pub fn scale_price_1e8(price: i64, expo: i32) -> Result<i64, PipelineError> {
    let diff = TARGET_EXPO - expo;
    let mut scaled = price as i128;

    if diff > 0 {
        for _ in 0..diff {
            scaled = scaled.checked_mul(10).ok_or_else(|| {
                PipelineError::invalid(format!(
                    "price {} with exponent {} overflows at target exponent -8",
                    price, expo
                ))
            })?;
        }
    } else {
        for _ in 0..(-diff) {
            scaled /= 10; // i128 division truncates toward zero
        }
    }

    i64::try_from(scaled).map_err(|_| {
        PipelineError::invalid(format!(
            "price {} with exponent {} does not fit 1e-8 fixed point",
            price, expo
        ))
    })
}

/// Symmetric-tolerance bounds around a 1e-8 scaled price:
/// min = trunc(scaled × (10000 − boundsBps) / 10000),
/// max = trunc(scaled × (10000 + boundsBps) / 10000).
/// The bounds must strictly bracket the scaled price or the proposal is
/// unusable.
pub fn price_bounds(scaled: i64, bounds_bps: u32) -> Result<(i64, i64), PipelineError> {
    let s = scaled as i128;
    let min = s * (10_000 - bounds_bps as i128) / 10_000;
    let max = s * (10_000 + bounds_bps as i128) / 10_000;

    let min = i64::try_from(min)
        .map_err(|_| PipelineError::invalid("price lower bound out of range".to_string()))?;
    let max = i64::try_from(max)
        .map_err(|_| PipelineError::invalid("price upper bound out of range".to_string()))?;

    if min >= max {
        return Err(PipelineError::invalid(format!(
            "degenerate price bounds [{}, {}] around scaled price {}",
            min, max, scaled
        )));
    }
    Ok((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_base_units_whole_number() {
        assert_eq!(to_base_units("10", 6).unwrap(), U256::from(10_000_000u64));
        assert_eq!(to_base_units("0", 6).unwrap(), U256::ZERO);
    }

    #[test]
    fn test_to_base_units_fraction_truncates() {
        // 1.2345678 at 6 decimals: the 7th fraction digit is dropped.
        assert_eq!(
            to_base_units("1.2345678", 6).unwrap(),
            U256::from(1_234_567u64)
        );
        // Short fraction is right-padded.
        assert_eq!(to_base_units("0.5", 6).unwrap(), U256::from(500_000u64));
        assert_eq!(to_base_units(".5", 6).unwrap(), U256::from(500_000u64));
    }

    #[test]
    fn test_to_base_units_eighteen_decimals() {
        let one = U256::from(10u64).pow(U256::from(18u64));
        assert_eq!(to_base_units("1", 18).unwrap(), one);
        assert_eq!(
            to_base_units("2.5", 18).unwrap(),
            one * U256::from(25u64) / U256::from(10u64)
        );
    }

    #[test]
    fn test_to_base_units_rejects_garbage() {
        assert!(to_base_units("", 6).is_err());
        assert!(to_base_units("-1", 6).is_err());
        assert!(to_base_units("1.2.3", 6).is_err());
        assert!(to_base_units("abc", 6).is_err());
        assert!(to_base_units(".", 6).is_err());
    }

    #[test]
    fn test_min_amount_out_law() {
        // 1,000,000 at 50 bps => 995,000
        assert_eq!(
            min_amount_out(U256::from(1_000_000u64), 50),
            U256::from(995_000u64)
        );
        // 0 bps keeps everything
        assert_eq!(
            min_amount_out(U256::from(1_000_000u64), 0),
            U256::from(1_000_000u64)
        );
        // Flooring: 999 at 100 bps => floor(999 * 9900 / 10000) = 989
        assert_eq!(min_amount_out(U256::from(999u64), 100), U256::from(989u64));
    }

    #[test]
    fn test_scale_price_idempotent_at_target_expo() {
        assert_eq!(scale_price_1e8(250_000_000, -8).unwrap(), 250_000_000);
    }

    #[test]
    fn test_scale_price_divides_when_expo_above_target() {
        // expo -6: two truncating divisions by 10. 25 / 100 => 0.
        assert_eq!(scale_price_1e8(25, -6).unwrap(), 0);
        // 123456789 at expo -5: three divisions => 123456.
        assert_eq!(scale_price_1e8(123_456_789, -5).unwrap(), 123_456);
        // expo 0: eight divisions. 5 => 0.
        assert_eq!(scale_price_1e8(5, 0).unwrap(), 0);
    }

    #[test]
    fn test_scale_price_multiplies_when_expo_below_target() {
        // expo -10: two multiplications by 10.
        assert_eq!(scale_price_1e8(25, -10).unwrap(), 2_500);
        assert_eq!(scale_price_1e8(6_479_273_554, -9).unwrap(), 64_792_735_540);
    }

    #[test]
    fn test_scale_price_truncates_toward_zero_for_negative() {
        // -25 at expo -6 => -25/100 truncated toward zero = 0, not -1.
        assert_eq!(scale_price_1e8(-25, -6).unwrap(), 0);
        assert_eq!(scale_price_1e8(-123_456_789, -5).unwrap(), -123_456);
    }

    #[test]
    fn test_scale_price_overflow_detected() {
        assert!(scale_price_1e8(i64::MAX, -30).is_err());
    }

    #[test]
    fn test_price_bounds_bracket_scaled_price() {
        let (min, max) = price_bounds(100_000_000, 50).unwrap();
        assert_eq!(min, 99_500_000);
        assert_eq!(max, 100_500_000);
        assert!(min < 100_000_000 && 100_000_000 < max);
    }

    #[test]
    fn test_price_bounds_truncate() {
        // 101 * 9950 / 10000 = 100.495 -> 100; 101 * 10050 / 10000 = 101.505 -> 101
        let (min, max) = price_bounds(101, 50).unwrap();
        assert_eq!(min, 100);
        assert_eq!(max, 101);
    }

    #[test]
    fn test_proposal_math_six_to_eighteen_decimals() {
        // 10 units of a 6-decimal token in, an 18-decimal token out.
        let amount_in_wei = to_base_units("10", 6).unwrap();
        assert_eq!(amount_in_wei, U256::from(10_000_000u64));

        // Router quotes 5e18 out; 50 bps slippage keeps 99.5% of it.
        let out_wei = U256::from(5u64) * U256::from(10u64).pow(U256::from(18u64));
        let min_out = min_amount_out(out_wei, 50);
        assert_eq!(min_out, out_wei * U256::from(9_950u64) / U256::from(10_000u64));
        assert!(min_out <= out_wei);
    }

    #[test]
    fn test_price_bounds_reject_degenerate() {
        // Zero price cannot be bracketed.
        assert!(price_bounds(0, 50).is_err());
        // A negative price produces inverted bounds and is rejected.
        assert!(price_bounds(-100_000_000, 50).is_err());
    }
}
