//! Execution Dispatcher
//!
//! Submits a prepared swap proposal through one of three paths: direct
//! wallet signature (calldata assembly only), a server-held signer, or a
//! third-party delegated signer. The dispatcher never recomputes quote,
//! fee, or bounds; those come only from the proposal already prepared.
//!
//! Balance/allowance preconditions are enforced before submission: blocking
//! for the wallet and server paths, reported as an informative non-error
//! outcome for the delegated path.
//!
//! The server key is parsed into a signer only inside the dispatch call and
//! is never persisted, logged, or echoed back.
//!
//! Author: AI-Generated
//! Created: 2026-08-05
//! Modified: 2026-08-06 - delegated refusals map to Skipped, not errors

use crate::arbitrage::delegated::{DelegatedClient, DelegatedFailure, DelegatedOutcome, DelegatedParams};
use crate::contracts::{IERC20, IStrategyExecutor};
use crate::errors::PipelineError;
use crate::provider::HttpProvider;
use crate::types::{ExecutionPath, SwapProposal};
use alloy::network::EthereumWallet;
use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::ProviderBuilder;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::SolCall;
use tracing::{info, warn};
use url::Url;

/// Result of one dispatch attempt.
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    /// Transaction submitted and confirmed on-chain.
    Executed { tx_hash: String, path: ExecutionPath },
    /// Preconditions not met on the delegated path; informative, not fatal.
    Skipped {
        reason: String,
        balance_wei: U256,
        allowance_wei: U256,
        needed_wei: U256,
    },
    /// Wallet path: assembled call for the user's wallet to sign.
    Calldata {
        to: Address,
        data: Bytes,
        value_wei: U256,
    },
}

/// Dispatches prepared proposals; holds no key material at rest beyond the
/// configured (optional) server key string.
pub struct ExecutionDispatcher {
    provider: HttpProvider,
    rpc_url: String,
    executor: Address,
    server_key: Option<String>,
    delegated: Option<DelegatedClient>,
    delegator: Option<Address>,
}

impl ExecutionDispatcher {
    pub fn new(
        provider: HttpProvider,
        rpc_url: String,
        executor: Address,
        server_key: Option<String>,
        delegated: Option<DelegatedClient>,
        delegator: Option<Address>,
    ) -> Self {
        Self {
            provider,
            rpc_url,
            executor,
            server_key,
            delegated,
            delegator,
        }
    }

    /// Submit a proposal via the chosen path. All paths receive the same
    /// semantic parameter set from the proposal.
    pub async fn dispatch(
        &self,
        proposal: &SwapProposal,
        path: ExecutionPath,
        recipient: Address,
    ) -> Result<DispatchOutcome, PipelineError> {
        match path {
            ExecutionPath::Wallet => self.assemble_wallet_call(proposal, recipient),
            ExecutionPath::Server => self.dispatch_server(proposal, recipient).await,
            ExecutionPath::Delegated => self.dispatch_delegated(proposal, recipient).await,
        }
    }

    /// Wallet path: the end-user's wallet signs; this process only encodes
    /// the guarded-swap call and reports the value to attach.
    fn assemble_wallet_call(
        &self,
        proposal: &SwapProposal,
        recipient: Address,
    ) -> Result<DispatchOutcome, PipelineError> {
        if proposal.needs_approval == Some(true) {
            return Err(PipelineError::Precheck {
                what: "allowance",
                have: proposal
                    .allowance_wei
                    .map(|a| a.to_string())
                    .unwrap_or_else(|| "0".to_string()),
                need: proposal.amount_in_wei.to_string(),
            });
        }

        let call = executor_call(proposal, recipient);
        Ok(DispatchOutcome::Calldata {
            to: proposal.executor,
            data: Bytes::from(call.abi_encode()),
            value_wei: proposal.fee_wei,
        })
    }

    /// Server path: sign with the server-held key, submit, wait for the
    /// receipt. Insufficient funding is a blocking precheck failure.
    async fn dispatch_server(
        &self,
        proposal: &SwapProposal,
        recipient: Address,
    ) -> Result<DispatchOutcome, PipelineError> {
        let key = self
            .server_key
            .as_deref()
            .ok_or(PipelineError::ConfigMissing {
                name: "SERVER_SIGNER_KEY",
            })?;
        if self.rpc_url.is_empty() {
            return Err(PipelineError::ConfigMissing { name: "RPC_URL" });
        }

        let signer: PrivateKeySigner = key
            .trim()
            .parse()
            .map_err(|_| PipelineError::dispatch("server signer key is not a valid private key"))?;
        let sender = signer.address();

        let (balance, allowance) = self
            .read_funding(proposal.token_in.address, sender)
            .await?;
        if balance < proposal.amount_in_wei {
            return Err(PipelineError::Precheck {
                what: "balance",
                have: balance.to_string(),
                need: proposal.amount_in_wei.to_string(),
            });
        }
        if allowance < proposal.amount_in_wei {
            return Err(PipelineError::Precheck {
                what: "allowance",
                have: allowance.to_string(),
                need: proposal.amount_in_wei.to_string(),
            });
        }

        let url = Url::parse(&self.rpc_url)
            .map_err(|e| PipelineError::dispatch(format!("invalid RPC URL: {}", e)))?;
        let wallet = EthereumWallet::from(signer);
        let signing_provider = ProviderBuilder::new().wallet(wallet).connect_http(url);

        let executor = IStrategyExecutor::new(proposal.executor, signing_provider);
        let pending = executor
            .executeSwapWithOracle(
                proposal.router,
                proposal.token_in.address,
                proposal.token_out.address,
                proposal.amount_in_wei,
                proposal.min_amount_out_wei,
                recipient,
                proposal.update_data.clone(),
                proposal.price_id,
                proposal.max_age_sec,
                proposal.min_price_1e8,
                proposal.max_price_1e8,
            )
            .value(proposal.fee_wei)
            .send()
            .await
            .map_err(|e| PipelineError::dispatch(format!("submission failed: {}", e)))?;

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| PipelineError::dispatch(format!("confirmation wait failed: {}", e)))?;

        if !receipt.status() {
            return Err(PipelineError::dispatch(format!(
                "transaction {} reverted",
                receipt.transaction_hash
            )));
        }

        let tx_hash = format!("{}", receipt.transaction_hash);
        info!("Server-signed swap confirmed: {}", tx_hash);
        Ok(DispatchOutcome::Executed {
            tx_hash,
            path: ExecutionPath::Server,
        })
    }

    /// Delegated path: check the delegator's funding first, then forward the
    /// parameter set to the external signing service and relay its result.
    async fn dispatch_delegated(
        &self,
        proposal: &SwapProposal,
        recipient: Address,
    ) -> Result<DispatchOutcome, PipelineError> {
        let client = self
            .delegated
            .as_ref()
            .ok_or(PipelineError::ConfigMissing {
                name: "DELEGATED_EXEC_URL",
            })?;
        let delegator = self.delegator.ok_or(PipelineError::ConfigMissing {
            name: "DELEGATOR_ADDRESS",
        })?;

        let (balance, allowance) = self
            .read_funding(proposal.token_in.address, delegator)
            .await?;
        if let Some(skip) =
            delegated_precheck(balance, allowance, proposal.amount_in_wei)
        {
            warn!("Delegated dispatch skipped: {:?}", skip);
            return Ok(skip);
        }

        let params = delegated_params(proposal, recipient);
        match client.execute(delegator, &params).await? {
            DelegatedOutcome::Submitted { tx_hash, .. } => Ok(DispatchOutcome::Executed {
                tx_hash,
                path: ExecutionPath::Delegated,
            }),
            DelegatedOutcome::Refused { reason, message } => match reason {
                DelegatedFailure::InsufficientAllowance | DelegatedFailure::InsufficientBalance => {
                    Ok(DispatchOutcome::Skipped {
                        reason: message,
                        balance_wei: balance,
                        allowance_wei: allowance,
                        needed_wei: proposal.amount_in_wei,
                    })
                }
                DelegatedFailure::InvalidParams => Err(PipelineError::dispatch(format!(
                    "delegated service rejected parameters: {}",
                    message
                ))),
            },
        }
    }

    /// Joint balance + allowance read for an owner toward the executor.
    async fn read_funding(
        &self,
        token: Address,
        owner: Address,
    ) -> Result<(U256, U256), PipelineError> {
        let erc20 = IERC20::new(token, self.provider.clone());
        let (balance, allowance) = futures::try_join!(
            async { erc20.balanceOf(owner).call().await },
            async { erc20.allowance(owner, self.executor).call().await },
        )
        .map_err(|e| PipelineError::dispatch(format!("funding precheck read failed: {}", e)))?;
        Ok((balance, allowance))
    }
}

/// Pure precheck rule for the delegated path: short balance or allowance
/// yields an informative Skipped outcome carrying both observed values.
fn delegated_precheck(
    balance: U256,
    allowance: U256,
    needed: U256,
) -> Option<DispatchOutcome> {
    let reason = if balance < needed {
        format!("delegator balance {} below required {}", balance, needed)
    } else if allowance < needed {
        format!(
            "needs approval: allowance {} below required {}",
            allowance, needed
        )
    } else {
        return None;
    };
    Some(DispatchOutcome::Skipped {
        reason,
        balance_wei: balance,
        allowance_wei: allowance,
        needed_wei: needed,
    })
}

/// Encode the guarded-swap call from the proposal's already-computed values.
fn executor_call(
    proposal: &SwapProposal,
    recipient: Address,
) -> IStrategyExecutor::executeSwapWithOracleCall {
    IStrategyExecutor::executeSwapWithOracleCall {
        router: proposal.router,
        tokenIn: proposal.token_in.address,
        tokenOut: proposal.token_out.address,
        amountIn: proposal.amount_in_wei,
        minAmountOut: proposal.min_amount_out_wei,
        recipient,
        priceUpdateData: proposal.update_data.clone(),
        priceId: proposal.price_id,
        maxAgeSec: proposal.max_age_sec,
        minPrice: proposal.min_price_1e8,
        maxPrice: proposal.max_price_1e8,
    }
}

fn delegated_params(proposal: &SwapProposal, recipient: Address) -> DelegatedParams {
    DelegatedParams {
        executor: proposal.executor.to_string(),
        router: proposal.router.to_string(),
        token_in: proposal.token_in.address.to_string(),
        token_out: proposal.token_out.address.to_string(),
        amount_in_wei: proposal.amount_in_wei.to_string(),
        min_amount_out_wei: proposal.min_amount_out_wei.to_string(),
        recipient: recipient.to_string(),
        price_update_data: proposal
            .update_data
            .iter()
            .map(|b| format!("0x{}", alloy::hex::encode(b)))
            .collect(),
        price_id: format!("0x{}", alloy::hex::encode(proposal.price_id)),
        max_age_sec: proposal.max_age_sec,
        min_price_1e8: proposal.min_price_1e8.to_string(),
        max_price_1e8: proposal.max_price_1e8.to_string(),
        fee_wei: proposal.fee_wei.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TokenRef;
    use alloy::primitives::{B256, U256};

    fn test_proposal() -> SwapProposal {
        SwapProposal {
            executor: Address::repeat_byte(0x11),
            router: Address::repeat_byte(0x22),
            token_in: TokenRef {
                given: "0.0.429274".into(),
                address: Address::repeat_byte(0x33),
                decimals: 6,
            },
            token_out: TokenRef {
                given: "0.0.731861".into(),
                address: Address::repeat_byte(0x44),
                decimals: 8,
            },
            amount_in: "10".into(),
            amount_in_wei: U256::from(10_000_000u64),
            quote_out_wei: U256::from(1_000_000u64),
            min_amount_out_wei: U256::from(995_000u64),
            fee_wei: U256::from(7u64),
            price_id: B256::repeat_byte(0x55),
            max_age_sec: 60,
            bounds_bps: 50,
            current_price_1e8: 100_000_000,
            min_price_1e8: 99_500_000,
            max_price_1e8: 100_500_000,
            update_data: vec![Bytes::from(vec![0x50, 0x4e, 0x41, 0x55])],
            owner: None,
            allowance_wei: None,
            needs_approval: None,
        }
    }

    #[test]
    fn test_delegated_precheck_short_balance_is_informative() {
        let out = delegated_precheck(
            U256::from(5u64),
            U256::from(100u64),
            U256::from(10u64),
        )
        .expect("short balance must produce a skip");
        match out {
            DispatchOutcome::Skipped {
                reason,
                balance_wei,
                needed_wei,
                ..
            } => {
                assert!(reason.contains('5'));
                assert!(reason.contains("10"));
                assert_eq!(balance_wei, U256::from(5u64));
                assert_eq!(needed_wei, U256::from(10u64));
            }
            other => panic!("expected Skipped, got {:?}", other),
        }
    }

    #[test]
    fn test_delegated_precheck_short_allowance_is_informative() {
        let out = delegated_precheck(
            U256::from(100u64),
            U256::from(3u64),
            U256::from(10u64),
        )
        .expect("short allowance must produce a skip");
        match out {
            DispatchOutcome::Skipped { reason, allowance_wei, .. } => {
                assert!(reason.contains("approval"));
                assert_eq!(allowance_wei, U256::from(3u64));
            }
            other => panic!("expected Skipped, got {:?}", other),
        }
    }

    #[test]
    fn test_delegated_precheck_passes_with_funding() {
        assert!(delegated_precheck(
            U256::from(100u64),
            U256::from(100u64),
            U256::from(10u64)
        )
        .is_none());
        // Exactly-sufficient funding passes.
        assert!(delegated_precheck(
            U256::from(10u64),
            U256::from(10u64),
            U256::from(10u64)
        )
        .is_none());
    }

    #[test]
    fn test_wallet_calldata_encodes_selector() {
        let proposal = test_proposal();
        let call = executor_call(&proposal, Address::repeat_byte(0x66));
        let encoded = call.abi_encode();
        // 4-byte selector plus at least the 11 static slots.
        assert!(encoded.len() > 4 + 11 * 32);
        assert_eq!(
            &encoded[..4],
            IStrategyExecutor::executeSwapWithOracleCall::SELECTOR
        );
    }

    #[test]
    fn test_delegated_params_mirror_proposal() {
        let proposal = test_proposal();
        let params = delegated_params(&proposal, Address::repeat_byte(0x66));
        assert_eq!(params.amount_in_wei, "10000000");
        assert_eq!(params.min_amount_out_wei, "995000");
        assert_eq!(params.min_price_1e8, "99500000");
        assert_eq!(params.max_price_1e8, "100500000");
        assert_eq!(params.max_age_sec, 60);
        assert_eq!(params.price_update_data, vec!["0x504e4155".to_string()]);
        assert!(params.price_id.starts_with("0x"));
        assert_eq!(params.fee_wei, "7");
    }
}
