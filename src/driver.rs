//! Periodic Strategy Driver
//!
//! Cooperative scheduler for the arbitrage pipeline: one tick runs to
//! completion before the next is armed, so runs never overlap; a stop
//! signal is honored between runs. A long tick simply delays the next
//! tick's start.
//!
//! Tick sequence: evaluate signal → below threshold: done → otherwise
//! prepare → dispatch → record. A failed tick is logged and the loop
//! continues; nothing is retried inside a tick.
//!
//! Author: AI-Generated
//! Created: 2026-08-05

use crate::arbitrage::{quote, signal, DispatchOutcome, ExecutionDispatcher, PrepareRequest, Signal, TradePreparer};
use crate::config::BotConfig;
use crate::errors::PipelineError;
use crate::mirror::MirrorClient;
use crate::oracle::HermesClient;
use crate::provider::HttpProvider;
use crate::state::{StrategyState, TradeLog};
use crate::types::{ExecutionPath, SwapProposal, TradeRecord};
use alloy::primitives::{Address, U256};
use alloy::signers::local::PrivateKeySigner;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// What one tick concluded.
#[derive(Debug)]
pub enum TickOutcome {
    /// Spread below threshold; nothing to do this tick.
    BelowThreshold(Signal),
    /// Proposal built but not dispatched (live mode off).
    DryRun {
        signal: Signal,
        proposal: SwapProposal,
    },
    /// Delegated preconditions not met; informative, not an error.
    Skipped { signal: Signal, reason: String },
    /// Trade submitted and confirmed.
    Executed { signal: Signal, tx_hash: String },
    /// Wallet path: calldata assembled for external signing.
    Calldata {
        signal: Signal,
        to: Address,
        value_wei: U256,
    },
}

/// Owns the pipeline components and the process-local strategy state.
pub struct StrategyDriver {
    config: BotConfig,
    provider: HttpProvider,
    mirror: MirrorClient,
    hermes: HermesClient,
    preparer: TradePreparer,
    dispatcher: ExecutionDispatcher,
    state: StrategyState,
    trades: Mutex<TradeLog>,
    path: ExecutionPath,
}

impl StrategyDriver {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: BotConfig,
        provider: HttpProvider,
        mirror: MirrorClient,
        hermes: HermesClient,
        preparer: TradePreparer,
        dispatcher: ExecutionDispatcher,
        state: StrategyState,
        path: ExecutionPath,
    ) -> Self {
        Self {
            config,
            provider,
            mirror,
            hermes,
            preparer,
            dispatcher,
            state,
            trades: Mutex::new(TradeLog::default()),
            path,
        }
    }

    pub fn state(&self) -> &StrategyState {
        &self.state
    }

    pub fn trades(&self) -> Vec<TradeRecord> {
        self.trades
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_slice()
            .to_vec()
    }

    /// Run ticks on the configured interval until the stop signal fires.
    pub async fn run(&self, mut stop: watch::Receiver<bool>) {
        let mut interval =
            tokio::time::interval(Duration::from_secs(self.config.poll_interval_secs));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Driver started: every {}s via {} path (live={})",
            self.config.poll_interval_secs, self.path, self.config.live_mode
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = stop.changed() => {
                    if *stop.borrow() {
                        info!("Stop signal received — exiting driver loop");
                        break;
                    }
                    continue;
                }
            }

            if !self.state.is_active() {
                debug!("Strategy inactive, skipping tick");
                continue;
            }

            let started = Instant::now();
            match self.tick().await {
                Ok(outcome) => self.log_outcome(&outcome, started.elapsed()),
                Err(e) => warn!("Tick failed: {}", e),
            }

            // Honor a stop that arrived while the tick was running.
            if *stop.borrow() {
                info!("Stop signal received — exiting driver loop");
                break;
            }
        }
    }

    /// One full pipeline run: signal → prepare → dispatch.
    pub async fn tick(&self) -> Result<TickOutcome, PipelineError> {
        let params = self.state.params();

        // Signal leg: fresh resolution, quote, and oracle read. Independent
        // lookups are issued concurrently; nothing is cached across ticks.
        let (router, token_in_addr, token_out_addr) = futures::try_join!(
            self.mirror.resolve_to_evm(&self.config.router),
            self.mirror.resolve_to_evm(&self.config.token_in),
            self.mirror.resolve_to_evm(&self.config.token_out),
        )?;
        let (decimals_in, decimals_out) = futures::try_join!(
            self.mirror.token_decimals(
                &self.provider,
                &self.config.token_in,
                token_in_addr,
                self.config.decimals_in
            ),
            self.mirror.token_decimals(
                &self.provider,
                &self.config.token_out,
                token_out_addr,
                self.config.decimals_out
            ),
        )?;

        let amount_in_human: f64 = self.config.amount_in.parse().map_err(|_| {
            PipelineError::invalid(format!(
                "AMOUNT_IN '{}' is not a decimal number",
                self.config.amount_in
            ))
        })?;
        let amount_in_wei =
            crate::arbitrage::preparer::to_base_units(&self.config.amount_in, decimals_in)?;
        let dex_quote = quote::amounts_out(
            &self.provider,
            router,
            token_in_addr,
            token_out_addr,
            amount_in_wei,
        )
        .await?;
        let dex_price = quote::implied_price(amount_in_human, dex_quote.amount_out, decimals_out)?;

        let reading = self.hermes.latest_price(self.config.price_id).await?;
        let sig = signal::evaluate(dex_price, reading.normalized(), params.spread_bps)?;

        if !sig.should_execute {
            return Ok(TickOutcome::BelowThreshold(sig));
        }

        info!(
            "Spread {:.2}bps clears threshold {}bps — preparing guarded swap",
            sig.spread_bps, sig.threshold_bps
        );

        let request = PrepareRequest {
            router: self.config.router.clone(),
            token_in: self.config.token_in.clone(),
            token_out: self.config.token_out.clone(),
            amount_in: self.config.amount_in.clone(),
            decimals_in: self.config.decimals_in,
            decimals_out: self.config.decimals_out,
            price_id: self.config.price_id,
            owner: self.dispatch_owner(),
            max_age_sec: self.config.max_age_sec,
            slippage_bps: params.max_slippage_bps,
            bounds_bps: self.config.bounds_bps,
        };
        let proposal = self.preparer.prepare(&request).await?;

        if !self.config.live_mode {
            return Ok(TickOutcome::DryRun {
                signal: sig,
                proposal,
            });
        }

        match self
            .dispatcher
            .dispatch(&proposal, self.path, self.config.recipient)
            .await?
        {
            DispatchOutcome::Executed { tx_hash, path } => {
                self.record_trade(&proposal, &tx_hash, path);
                Ok(TickOutcome::Executed {
                    signal: sig,
                    tx_hash,
                })
            }
            DispatchOutcome::Skipped { reason, .. } => Ok(TickOutcome::Skipped {
                signal: sig,
                reason,
            }),
            DispatchOutcome::Calldata { to, data, value_wei } => {
                info!(
                    "Wallet calldata ready: to={} value={} data=0x{}",
                    to,
                    value_wei,
                    alloy::hex::encode(&data)
                );
                Ok(TickOutcome::Calldata {
                    signal: sig,
                    to,
                    value_wei,
                })
            }
        }
    }

    /// Owner whose allowance the preparer reports, per execution path.
    fn dispatch_owner(&self) -> Option<Address> {
        match self.path {
            ExecutionPath::Wallet => Some(self.config.recipient),
            ExecutionPath::Delegated => self.config.delegator_address,
            ExecutionPath::Server => self
                .config
                .server_signer_key
                .as_deref()
                .and_then(|k| k.trim().parse::<PrivateKeySigner>().ok())
                .map(|s| s.address()),
        }
    }

    fn record_trade(&self, proposal: &SwapProposal, tx_hash: &str, path: ExecutionPath) {
        let record = TradeRecord {
            tx_hash: tx_hash.to_string(),
            path,
            amount_in_wei: proposal.amount_in_wei.to_string(),
            token_in: proposal.token_in.address,
            token_out: proposal.token_out.address,
            recipient: self.config.recipient,
            at: chrono::Utc::now().timestamp(),
        };
        self.trades
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .add(record);
    }

    fn log_outcome(&self, outcome: &TickOutcome, elapsed: Duration) {
        match outcome {
            TickOutcome::BelowThreshold(sig) => debug!(
                "Below threshold: spread {:.2}bps < {}bps ({}ms)",
                sig.spread_bps,
                sig.threshold_bps,
                elapsed.as_millis()
            ),
            TickOutcome::DryRun { signal, proposal } => info!(
                "DRY RUN: spread {:.2}bps | would swap {} {} -> {} | minOut={} bounds=[{}, {}] ({}ms)",
                signal.spread_bps,
                proposal.amount_in,
                proposal.token_in.given,
                proposal.token_out.given,
                proposal.min_amount_out_wei,
                proposal.min_price_1e8,
                proposal.max_price_1e8,
                elapsed.as_millis()
            ),
            TickOutcome::Skipped { reason, .. } => info!("Dispatch skipped: {}", reason),
            TickOutcome::Executed { signal, tx_hash } => info!(
                "Trade executed: {} | spread {:.2}bps | {} total trades ({}ms)",
                tx_hash,
                signal.spread_bps,
                self.trades.lock().unwrap_or_else(|e| e.into_inner()).len(),
                elapsed.as_millis()
            ),
            TickOutcome::Calldata { to, value_wei, .. } => {
                info!("Calldata assembled for wallet: to={} value={}", to, value_wei)
            }
        }
    }
}
