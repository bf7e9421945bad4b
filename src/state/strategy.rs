//! Strategy Parameters
//!
//! Process-wide arbitrage tuning knobs plus the active flag, owned by a
//! single state service and passed by reference to consumers. Mutation
//! goes only through the clamped `apply` setter; the driver reads a
//! snapshot on every tick. Nothing here persists across restarts.
//!
//! Author: AI-Generated
//! Created: 2026-08-05

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::info;

/// Allowed ranges for each parameter.
const SPREAD_BPS_RANGE: (u32, u32) = (10, 2_000);
const MAX_POSITION_PCT_RANGE: (u32, u32) = (1, 100);
const MAX_SLIPPAGE_BPS_RANGE: (u32, u32) = (1, 1_000);

/// Tunable arbitrage parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArbitrageParams {
    /// Execute when |DEX vs oracle spread| reaches this many basis points.
    pub spread_bps: u32,
    /// Maximum position size as a percent of capital.
    pub max_position_pct: u32,
    /// Slippage tolerance in basis points.
    pub max_slippage_bps: u32,
}

impl Default for ArbitrageParams {
    fn default() -> Self {
        Self {
            spread_bps: 100,      // 1%
            max_position_pct: 10, // 10%
            max_slippage_bps: 50, // 0.5%
        }
    }
}

/// Partial update; unset fields keep their current value.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ParamsUpdate {
    pub spread_bps: Option<i64>,
    pub max_position_pct: Option<i64>,
    pub max_slippage_bps: Option<i64>,
}

/// Owned strategy state service.
pub struct StrategyState {
    params: Mutex<ArbitrageParams>,
    active: AtomicBool,
}

impl StrategyState {
    pub fn new(initial: ArbitrageParams) -> Self {
        Self {
            params: Mutex::new(initial),
            active: AtomicBool::new(false),
        }
    }

    /// Snapshot of the current parameters.
    pub fn params(&self) -> ArbitrageParams {
        *self.params.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Apply a partial update; every supplied value is clamped into its
    /// allowed range rather than rejected.
    pub fn apply(&self, update: ParamsUpdate) -> ArbitrageParams {
        let mut guard = self.params.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(v) = update.spread_bps {
            guard.spread_bps = clamp(v, SPREAD_BPS_RANGE);
        }
        if let Some(v) = update.max_position_pct {
            guard.max_position_pct = clamp(v, MAX_POSITION_PCT_RANGE);
        }
        if let Some(v) = update.max_slippage_bps {
            guard.max_slippage_bps = clamp(v, MAX_SLIPPAGE_BPS_RANGE);
        }
        info!(
            "Strategy params updated: spread={}bps position={}% slippage={}bps",
            guard.spread_bps, guard.max_position_pct, guard.max_slippage_bps
        );
        *guard
    }

    pub fn set_active(&self, on: bool) {
        self.active.store(on, Ordering::SeqCst);
        info!("Strategy {}", if on { "ACTIVE" } else { "stopped" });
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl Default for StrategyState {
    fn default() -> Self {
        Self::new(ArbitrageParams::default())
    }
}

fn clamp(value: i64, (min, max): (u32, u32)) -> u32 {
    value.clamp(min as i64, max as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = ArbitrageParams::default();
        assert_eq!(p.spread_bps, 100);
        assert_eq!(p.max_position_pct, 10);
        assert_eq!(p.max_slippage_bps, 50);
    }

    #[test]
    fn test_apply_clamps_below_floor() {
        let state = StrategyState::default();
        let p = state.apply(ParamsUpdate {
            spread_bps: Some(5),
            ..Default::default()
        });
        assert_eq!(p.spread_bps, 10);
    }

    #[test]
    fn test_apply_clamps_above_ceiling() {
        let state = StrategyState::default();
        let p = state.apply(ParamsUpdate {
            spread_bps: Some(5_000),
            max_position_pct: Some(250),
            max_slippage_bps: Some(9_999),
        });
        assert_eq!(p.spread_bps, 2_000);
        assert_eq!(p.max_position_pct, 100);
        assert_eq!(p.max_slippage_bps, 1_000);
    }

    #[test]
    fn test_apply_partial_keeps_other_fields() {
        let state = StrategyState::default();
        state.apply(ParamsUpdate {
            max_slippage_bps: Some(75),
            ..Default::default()
        });
        let p = state.params();
        assert_eq!(p.max_slippage_bps, 75);
        assert_eq!(p.spread_bps, 100);
        assert_eq!(p.max_position_pct, 10);
    }

    #[test]
    fn test_negative_input_clamps_to_floor() {
        let state = StrategyState::default();
        let p = state.apply(ParamsUpdate {
            max_position_pct: Some(-3),
            ..Default::default()
        });
        assert_eq!(p.max_position_pct, 1);
    }

    #[test]
    fn test_active_flag() {
        let state = StrategyState::default();
        assert!(!state.is_active());
        state.set_active(true);
        assert!(state.is_active());
        state.set_active(false);
        assert!(!state.is_active());
    }
}
