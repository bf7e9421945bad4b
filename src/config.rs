//! Configuration management
//! Load settings from environment / .env file.
//!
//! Base items (RPC, chain, contract addresses, trade shape) are required up
//! front; path-specific items (server key, delegated service) are validated
//! for the execution path actually requested so a missing credential fails
//! immediately with its variable name instead of defaulting silently.

use crate::errors::PipelineError;
use crate::state::{ArbitrageParams, ParamsUpdate, StrategyState};
use crate::types::ExecutionPath;
use alloy::primitives::{Address, B256};
use anyhow::{Context, Result};

/// Documented tolerance defaults; genuinely optional inputs only.
pub const DEFAULT_BOUNDS_BPS: u32 = 50;
pub const DEFAULT_MAX_AGE_SEC: u64 = 60;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 20;

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    // Network
    pub rpc_url: String,
    pub chain_id: u64,
    pub mirror_base_url: String,
    pub hermes_base_url: String,

    // Contracts
    pub executor_address: Address,
    pub pyth_address: Address,

    // Execution paths (validated per requested path)
    pub server_signer_key: Option<String>,
    pub delegated_exec_url: Option<String>,
    pub delegated_app_id: Option<u64>,
    pub delegator_address: Option<Address>,

    // Trade shape (identifiers re-resolved every run)
    pub router: String,
    pub token_in: String,
    pub token_out: String,
    pub amount_in: String,
    pub decimals_in: Option<u8>,
    pub decimals_out: Option<u8>,
    pub price_id: B256,
    pub recipient: Address,

    // Tolerances and timing
    pub bounds_bps: u32,
    pub max_age_sec: u64,
    pub poll_interval_secs: u64,
    pub live_mode: bool,
}

impl BotConfig {
    /// Verify that everything the chosen execution path needs is present.
    pub fn require_for_path(&self, path: ExecutionPath) -> Result<(), PipelineError> {
        match path {
            ExecutionPath::Wallet => Ok(()),
            ExecutionPath::Server => {
                if self.server_signer_key.as_deref().unwrap_or("").is_empty() {
                    return Err(PipelineError::ConfigMissing {
                        name: "SERVER_SIGNER_KEY",
                    });
                }
                Ok(())
            }
            ExecutionPath::Delegated => {
                if self.delegated_exec_url.as_deref().unwrap_or("").is_empty() {
                    return Err(PipelineError::ConfigMissing {
                        name: "DELEGATED_EXEC_URL",
                    });
                }
                if self.delegator_address.is_none() {
                    return Err(PipelineError::ConfigMissing {
                        name: "DELEGATOR_ADDRESS",
                    });
                }
                Ok(())
            }
        }
    }

    /// Initial strategy parameters: defaults overridden (and clamped) by
    /// optional environment values.
    pub fn initial_strategy_state(&self) -> StrategyState {
        let state = StrategyState::new(ArbitrageParams::default());
        state.apply(ParamsUpdate {
            spread_bps: env_i64("SPREAD_BPS"),
            max_position_pct: env_i64("MAX_POSITION_PCT"),
            max_slippage_bps: env_i64("MAX_SLIPPAGE_BPS"),
        });
        state
    }
}

pub fn load_config() -> Result<BotConfig> {
    dotenv::dotenv().ok();

    let config = BotConfig {
        rpc_url: required("RPC_URL")?,
        chain_id: required("CHAIN_ID")?
            .parse()
            .context("CHAIN_ID must be an integer")?,
        mirror_base_url: optional("MIRROR_BASE_URL")
            .unwrap_or_else(|| crate::mirror::DEFAULT_MIRROR_BASE_URL.to_string()),
        hermes_base_url: optional("HERMES_BASE_URL")
            .unwrap_or_else(|| crate::oracle::DEFAULT_HERMES_BASE_URL.to_string()),

        executor_address: parse_address(&required("EXECUTOR_ADDRESS")?, "EXECUTOR_ADDRESS")?,
        pyth_address: parse_address(&required("PYTH_EVM_ADDRESS")?, "PYTH_EVM_ADDRESS")?,

        server_signer_key: optional("SERVER_SIGNER_KEY"),
        delegated_exec_url: optional("DELEGATED_EXEC_URL"),
        delegated_app_id: optional("DELEGATED_APP_ID")
            .map(|s| s.parse().context("DELEGATED_APP_ID must be an integer"))
            .transpose()?,
        delegator_address: optional("DELEGATOR_ADDRESS")
            .map(|s| parse_address(&s, "DELEGATOR_ADDRESS"))
            .transpose()?,

        router: optional("ROUTER")
            .unwrap_or_else(|| crate::tokens::SAUCERSWAP_ROUTER_TESTNET.to_string()),
        token_in: required("TOKEN_IN")?,
        token_out: required("TOKEN_OUT")?,
        amount_in: required("AMOUNT_IN")?,
        decimals_in: optional("DECIMALS_IN")
            .map(|s| s.parse().context("DECIMALS_IN must be an integer"))
            .transpose()?,
        decimals_out: optional("DECIMALS_OUT")
            .map(|s| s.parse().context("DECIMALS_OUT must be an integer"))
            .transpose()?,
        price_id: required("PRICE_ID")?
            .parse()
            .context("PRICE_ID must be a bytes32 hex string")?,
        recipient: parse_address(&required("RECIPIENT")?, "RECIPIENT")?,

        bounds_bps: optional("BOUNDS_BPS")
            .map(|s| s.parse().context("BOUNDS_BPS must be an integer"))
            .transpose()?
            .unwrap_or(DEFAULT_BOUNDS_BPS),
        max_age_sec: optional("MAX_AGE_SEC")
            .map(|s| s.parse().context("MAX_AGE_SEC must be an integer"))
            .transpose()?
            .unwrap_or(DEFAULT_MAX_AGE_SEC),
        poll_interval_secs: optional("POLL_INTERVAL_SECS")
            .map(|s| s.parse().context("POLL_INTERVAL_SECS must be an integer"))
            .transpose()?
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
        live_mode: optional("LIVE_MODE")
            .map(|s| s.eq_ignore_ascii_case("true") || s == "1")
            .unwrap_or(false),
    };

    Ok(config)
}

fn required(name: &'static str) -> Result<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(PipelineError::ConfigMissing { name }.into()),
    }
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_i64(name: &str) -> Option<i64> {
    optional(name).and_then(|s| s.parse().ok())
}

fn parse_address(s: &str, name: &str) -> Result<Address> {
    s.parse::<Address>()
        .with_context(|| format!("{} is not a valid EVM address: '{}'", name, s))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> BotConfig {
        BotConfig {
            rpc_url: "https://testnet.hashio.io/api".into(),
            chain_id: 296,
            mirror_base_url: crate::mirror::DEFAULT_MIRROR_BASE_URL.into(),
            hermes_base_url: crate::oracle::DEFAULT_HERMES_BASE_URL.into(),
            executor_address: Address::repeat_byte(0x11),
            pyth_address: Address::repeat_byte(0x22),
            server_signer_key: None,
            delegated_exec_url: None,
            delegated_app_id: None,
            delegator_address: None,
            router: "0.0.19264".into(),
            token_in: "0.0.429274".into(),
            token_out: "0.0.731861".into(),
            amount_in: "10".into(),
            decimals_in: Some(6),
            decimals_out: Some(8),
            price_id: B256::repeat_byte(0x33),
            recipient: Address::repeat_byte(0x44),
            bounds_bps: DEFAULT_BOUNDS_BPS,
            max_age_sec: DEFAULT_MAX_AGE_SEC,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            live_mode: false,
        }
    }

    #[test]
    fn test_wallet_path_has_no_extra_requirements() {
        assert!(base_config().require_for_path(ExecutionPath::Wallet).is_ok());
    }

    #[test]
    fn test_server_path_requires_key() {
        let mut config = base_config();
        let err = config.require_for_path(ExecutionPath::Server).unwrap_err();
        assert!(err.to_string().contains("SERVER_SIGNER_KEY"));

        config.server_signer_key = Some("0xdeadbeef".into());
        assert!(config.require_for_path(ExecutionPath::Server).is_ok());
    }

    #[test]
    fn test_delegated_path_requires_url_and_delegator() {
        let mut config = base_config();
        let err = config
            .require_for_path(ExecutionPath::Delegated)
            .unwrap_err();
        assert!(err.to_string().contains("DELEGATED_EXEC_URL"));

        config.delegated_exec_url = Some("https://signer.example/api/execute".into());
        let err = config
            .require_for_path(ExecutionPath::Delegated)
            .unwrap_err();
        assert!(err.to_string().contains("DELEGATOR_ADDRESS"));

        config.delegator_address = Some(Address::repeat_byte(0x55));
        assert!(config.require_for_path(ExecutionPath::Delegated).is_ok());
    }
}
