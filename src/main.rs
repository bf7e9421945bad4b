//! Oracle-Guarded Arbitrage Bot (Hedera testnet, monolithic architecture)
//!
//! Main entry point. Wires the mirror-node resolver, Hermes oracle client,
//! trade preparer, and execution dispatcher into a periodic driver loop:
//! resolve → quote → oracle read → signal → (prepare → dispatch) when the
//! spread clears the threshold.
//!
//! Paths: wallet (calldata only), server (server-held signer), delegated
//! (third-party signing service). Live dispatch requires LIVE_MODE=true;
//! otherwise proposals are logged and dropped.
//!
//! Author: AI-Generated
//! Created: 2026-08-05
//! Modified: 2026-08-06 - --once mode for single-tick runs

use anyhow::{Context, Result};
use clap::Parser;
use hedera_arb_bot::arbitrage::{DelegatedClient, ExecutionDispatcher, TradePreparer};
use hedera_arb_bot::config::load_config;
use hedera_arb_bot::driver::StrategyDriver;
use hedera_arb_bot::mirror::{is_entity_id, is_hex_address, MirrorClient};
use hedera_arb_bot::oracle::HermesClient;
use hedera_arb_bot::provider;
use hedera_arb_bot::tokens;
use hedera_arb_bot::types::ExecutionPath;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Oracle-Guarded DEX Arbitrage Bot — Hedera Testnet
#[derive(Parser)]
#[command(name = "hedera-arb-bot")]
struct Args {
    /// Execution path (wallet, server, delegated)
    #[arg(short, long, env = "EXECUTION_PATH", default_value = "server")]
    path: ExecutionPath,

    /// Run a single tick and exit instead of looping
    #[arg(long)]
    once: bool,

    /// Override the poll interval in seconds
    #[arg(long)]
    interval: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (RUST_LOG overrides the default level)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    info!("Oracle-guarded arbitrage bot starting — path: {}", args.path);

    let mut config = load_config()?;
    if let Some(secs) = args.interval {
        config.poll_interval_secs = secs;
    }
    config
        .require_for_path(args.path)
        .context("execution path configuration incomplete")?;

    info!(
        "Configuration loaded (chain_id: {}, pair: {} -> {}, amount: {})",
        config.chain_id, config.token_in, config.token_out, config.amount_in
    );
    info!("Mirror node: {}", config.mirror_base_url);
    info!("Oracle service: {}", config.hermes_base_url);
    info!("Executor: {}", config.executor_address);

    if config.live_mode {
        warn!("LIVE MODE ENABLED — trades will be dispatched on-chain!");
    } else {
        info!("Dry-run mode: proposals are prepared but never dispatched");
    }

    // Read-only provider for resolution, quoting, and prechecks. The
    // server-signer path builds its own wallet provider per dispatch.
    let rpc = provider::connect_http(&config.rpc_url)?;
    let mirror = MirrorClient::new(&config.mirror_base_url);
    let hermes = HermesClient::new(&config.hermes_base_url);

    // Operators may configure tokens by symbol; normalize to entity ids
    // before the pipeline starts so every run resolves the same way.
    config.token_in = normalize_identifier(&mirror, &config.token_in).await?;
    config.token_out = normalize_identifier(&mirror, &config.token_out).await?;

    let preparer = TradePreparer::new(
        rpc.clone(),
        mirror.clone(),
        hermes.clone(),
        config.executor_address,
        config.pyth_address,
    );

    let delegated = config
        .delegated_exec_url
        .as_deref()
        .map(|u| DelegatedClient::new(u, config.delegated_app_id));
    let dispatcher = ExecutionDispatcher::new(
        rpc.clone(),
        config.rpc_url.clone(),
        config.executor_address,
        config.server_signer_key.clone(),
        delegated,
        config.delegator_address,
    );

    let state = config.initial_strategy_state();
    state.set_active(true);

    let driver = StrategyDriver::new(
        config.clone(),
        rpc,
        mirror,
        hermes,
        preparer,
        dispatcher,
        state,
        args.path,
    );

    if args.once {
        let outcome = driver.tick().await?;
        info!("Single tick complete: {:?}", outcome);
        return Ok(());
    }

    // Stop on Ctrl-C; the driver honors the signal between runs.
    let (stop_tx, stop_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, stopping after the current tick");
            let _ = stop_tx.send(true);
        }
    });

    driver.run(stop_rx).await;

    info!("Driver stopped; {} trades recorded this session", driver.trades().len());
    Ok(())
}

/// Map a symbol to its entity id via the known-token table, falling back
/// to a mirror token search. Entity ids and hex addresses pass through.
async fn normalize_identifier(mirror: &MirrorClient, raw: &str) -> Result<String> {
    if is_hex_address(raw) || is_entity_id(raw) {
        return Ok(raw.to_string());
    }
    if let Some(token) = tokens::by_symbol(raw) {
        info!("Token '{}' resolved from known list: {}", raw, token.id);
        return Ok(token.id.to_string());
    }
    let hits = mirror.search_tokens(Some(raw), None, 5).await?;
    let hit = hits
        .iter()
        .find(|t| t.symbol.eq_ignore_ascii_case(raw))
        .or_else(|| hits.first())
        .with_context(|| format!("no token found for symbol '{}'", raw))?;
    info!(
        "Token '{}' resolved via mirror search: {} ({})",
        raw, hit.token_id, hit.name
    );
    Ok(hit.token_id.clone())
}
