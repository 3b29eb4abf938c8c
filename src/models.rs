//! Shared data structures used throughout the application.

use crate::errors::AppError;
use bigdecimal::BigDecimal;
use ethers::types::Address;
use serde::Serialize;

/// A token pair to check for arbitrage, with its profit gate.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub token0: Address,
    pub token1: Address,
    /// Human-readable label, e.g. "WETH/USDT".
    pub label: String,
    /// Minimum profit (in reserve units) a candidate must strictly exceed.
    pub min_profit: BigDecimal,
}

/// One exchange whose factory can resolve a pair to a pool.
#[derive(Debug, Clone)]
pub struct ExchangeSource {
    pub name: String,
    pub factory: Address,
}

/// Snapshot of one pool's reserves, reduced to the two derived quantities
/// the profit model works with. Recomputed every cycle, never persisted.
#[derive(Debug, Clone)]
pub struct PoolSample {
    pub pool: Address,
    /// sqrt(reserve1 / reserve0)
    pub sqrt_price: BigDecimal,
    /// sqrt(reserve0 * reserve1)
    pub liquidity: BigDecimal,
}

impl PoolSample {
    /// Derive a sample from raw reserves. Returns `None` when either reserve
    /// is zero: the price would be undefined and the pool is untradeable.
    pub fn from_reserves(pool: Address, reserve0: u128, reserve1: u128) -> Option<Self> {
        if reserve0 == 0 || reserve1 == 0 {
            return None;
        }
        let r0 = BigDecimal::from(reserve0);
        let r1 = BigDecimal::from(reserve1);
        let sqrt_price = (&r1 / &r0).sqrt()?;
        let liquidity = (&r0 * &r1).sqrt()?;
        Some(Self {
            pool,
            sqrt_price,
            liquidity,
        })
    }
}

/// Result of sampling one exchange for a pair.
#[derive(Debug)]
pub enum SampleOutcome {
    Found(PoolSample),
    /// The exchange has no pool for the pair (zero address, reverting
    /// factory, or empty reserves).
    NotSupported,
    /// The query itself broke after retries.
    Failed(AppError),
}

/// Per-exchange sampling record.
#[derive(Debug)]
pub struct ExchangeSample {
    pub exchange: String,
    pub outcome: SampleOutcome,
}

/// One profitable two-pool trade, as produced by the model.
///
/// `pools` is ordered `[high-price pool, low-price pool]`: the first pool is
/// the one the input is sold into. Candidates are kept in pair-iteration
/// order; selection happens downstream.
#[derive(Debug, Clone)]
pub struct ArbitrageCandidate {
    pub pools: [Address; 2],
    pub input_amount: BigDecimal,
    pub profit: BigDecimal,
}

/// Outcome of one pair's check cycle, serialized into the trigger response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairOutcome {
    pub pair: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Number of candidates the model produced for this pair.
    pub candidates: usize,
}

impl PairOutcome {
    pub fn submitted(pair: &TokenPair, tx_hash: String, candidates: usize) -> Self {
        Self {
            pair: pair.label.clone(),
            success: true,
            tx_hash: Some(tx_hash),
            message: None,
            error: None,
            candidates,
        }
    }

    /// A handled short-circuit: missing data or a failed validation step.
    pub fn aborted(pair: &TokenPair, reason: impl Into<String>, candidates: usize) -> Self {
        Self {
            pair: pair.label.clone(),
            success: false,
            tx_hash: None,
            message: Some(reason.into()),
            error: None,
            candidates,
        }
    }

    /// A surfaced execution error, contained to this pair.
    pub fn failed(pair: &TokenPair, error: &AppError, candidates: usize) -> Self {
        Self {
            pair: pair.label.clone(),
            success: false,
            tx_hash: None,
            message: None,
            error: Some(error.to_string()),
            candidates,
        }
    }
}
