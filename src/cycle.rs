//! Per-pair check cycle: sample, model, execute, aggregate.

use crate::arbitrage;
use crate::config::AppConfig;
use crate::dex::{self, ChainClient};
use crate::endpoints::EndpointPool;
use crate::errors::Result;
use crate::executor::{ExecutionOutcome, TradeExecutor};
use crate::models::{PairOutcome, TokenPair};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Pause between pair checks; keeps sequential cycles gentle on providers.
const PAIR_DELAY: Duration = Duration::from_millis(10);

/// Everything a cycle needs, wired once at startup and shared with the
/// HTTP surface.
pub struct AppContext {
    pub config: AppConfig,
    pub endpoints: Arc<EndpointPool>,
    pub client: ChainClient,
    pub executor: TradeExecutor,
}

impl AppContext {
    pub fn initialize(config: AppConfig) -> Result<Self> {
        let endpoints = Arc::new(EndpointPool::new(config.endpoints.clone())?);
        let client = ChainClient::new(endpoints.clone());
        let executor = TradeExecutor::new(client.clone(), &config)?;
        Ok(Self {
            config,
            endpoints,
            client,
            executor,
        })
    }
}

/// Run one full check across every configured pair, sequentially. Failures
/// are contained per pair; the cycle itself always completes.
pub async fn run_cycle(ctx: &AppContext) -> Vec<PairOutcome> {
    info!("[CYCLE] starting arbitrage check cycle");
    let mut results = Vec::with_capacity(ctx.config.pairs.len());
    for pair in &ctx.config.pairs {
        results.push(check_pair(ctx, pair).await);
        tokio::time::sleep(PAIR_DELAY).await;
    }
    info!(pairs = results.len(), "[CYCLE] completed arbitrage check cycle");
    results
}

async fn check_pair(ctx: &AppContext, pair: &TokenPair) -> PairOutcome {
    let outcomes = dex::sample_pair(&ctx.client, &ctx.config.exchanges, pair).await;
    let samples = dex::sampler::found_samples(outcomes);

    if samples.len() < 2 {
        info!(pair = %pair.label, sampled = samples.len(), "[CYCLE] not enough pools to compare");
        return PairOutcome::aborted(
            pair,
            format!("not enough pools found for {}", pair.label),
            0,
        );
    }

    let candidates = arbitrage::find_candidates(&samples, &pair.min_profit);
    if candidates.is_empty() {
        info!(pair = %pair.label, "[CYCLE] no opportunities above threshold");
        return PairOutcome::aborted(
            pair,
            format!("no profitable arbitrage opportunities for {}", pair.label),
            0,
        );
    }

    match ctx.executor.execute(pair, &candidates).await {
        Ok(ExecutionOutcome::Submitted { tx_hash }) => {
            PairOutcome::submitted(pair, format!("{tx_hash:#x}"), candidates.len())
        }
        Ok(ExecutionOutcome::Aborted { reason }) => {
            PairOutcome::aborted(pair, reason, candidates.len())
        }
        Err(err) => {
            error!(pair = %pair.label, error = %err, "[CYCLE] execution failed");
            PairOutcome::failed(pair, &err, candidates.len())
        }
    }
}
