//! Opportunity selection and trade submission through the keeper contract.

use crate::config::AppConfig;
use crate::dex::client::{ArbKeeper, ChainClient};
use crate::errors::{AppError, Result};
use crate::models::{ArbitrageCandidate, TokenPair};
use crate::retry::{self, SUBMIT_MAX_ATTEMPTS};
use crate::utils;
use bigdecimal::{BigDecimal, RoundingMode};
use ethers::middleware::SignerMiddleware;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, TxHash, U256};
use num_traits::Signed;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Route selector the keeper expects for the V2/V2 pool pair.
const ROUTE_VARIANT: u64 = 3;
/// Gas cap for the dry-run estimation.
const ESTIMATE_GAS_LIMIT: u64 = 500_000;
/// Explicit gas limit for the submitted transaction.
const SUBMIT_GAS_LIMIT: u64 = 800_000;

/// How one pair's execution attempt ended.
#[derive(Debug)]
pub enum ExecutionOutcome {
    Submitted { tx_hash: TxHash },
    /// A validation step failed; handled and reported, never an error.
    Aborted { reason: String },
}

pub struct TradeExecutor {
    client: ChainClient,
    wallet: LocalWallet,
    account: Address,
    keeper: Address,
    chain_id: u64,
}

impl TradeExecutor {
    pub fn new(client: ChainClient, config: &AppConfig) -> Result<Self> {
        let wallet: LocalWallet = config
            .private_key
            .parse()
            .map_err(|e| AppError::Wallet(format!("invalid private key: {e}")))?;
        Ok(Self {
            client,
            wallet,
            account: config.account,
            keeper: config.keeper_address,
            chain_id: config.chain_id,
        })
    }

    /// Pick the most profitable candidate, validate it, dry-run the keeper
    /// call, and submit. Exactly one candidate is ever executed per cycle.
    pub async fn execute(
        &self,
        pair: &TokenPair,
        candidates: &[ArbitrageCandidate],
    ) -> Result<ExecutionOutcome> {
        let Some(best) = select_best(candidates) else {
            return Ok(ExecutionOutcome::Aborted {
                reason: "no candidates to execute".into(),
            });
        };
        info!(
            pair = %pair.label,
            profit = %best.profit,
            candidates = candidates.len(),
            "[EXEC] executing best arbitrage candidate"
        );

        let Some(input_amount) = truncate_input(&best.input_amount) else {
            error!(pair = %pair.label, input = %best.input_amount, "[EXEC] invalid input amount");
            return Ok(ExecutionOutcome::Aborted {
                reason: format!("invalid input amount: {}", best.input_amount),
            });
        };

        let [pool_a, pool_b] = best.pools;
        let mut invalid = Vec::new();
        for pool in [pool_a, pool_b] {
            if !self.pool_is_contract(pool).await {
                error!(pair = %pair.label, pool = ?pool, "[EXEC] pool address is not a deployed contract");
                invalid.push(pool);
            }
        }
        if !invalid.is_empty() {
            return Ok(ExecutionOutcome::Aborted {
                reason: format!("invalid pool addresses: {invalid:?}"),
            });
        }

        // Mandatory dry run: a candidate that would revert is never submitted.
        if let Err(err) = self.estimate(pair, input_amount, pool_a, pool_b).await {
            error!(pair = %pair.label, error = %err, "[EXEC] gas estimation failed, skipping execution");
            return Ok(ExecutionOutcome::Aborted {
                reason: format!("gas estimation failed: {err}"),
            });
        }

        let submitted = retry::resilient_call(
            self.client.endpoints(),
            "performUpkeep",
            SUBMIT_MAX_ATTEMPTS,
            || self.submit_once(pair, input_amount, pool_a, pool_b),
        )
        .await;

        match submitted {
            Ok(tx_hash) => {
                info!(pair = %pair.label, tx_hash = ?tx_hash, "[EXEC] transaction confirmed");
                Ok(ExecutionOutcome::Submitted { tx_hash })
            }
            Err(err) => {
                if err.is_rpc_internal() {
                    warn!(pair = %pair.label, "[EXEC] internal rpc error, switching endpoint");
                    self.client.endpoints().advance();
                }
                Err(err)
            }
        }
    }

    async fn pool_is_contract(&self, pool: Address) -> bool {
        match self.client.is_contract(pool).await {
            Ok(deployed) => deployed,
            Err(err) => {
                warn!(pool = ?pool, error = %err, "[EXEC] code check failed");
                false
            }
        }
    }

    async fn estimate(
        &self,
        pair: &TokenPair,
        input_amount: U256,
        pool_a: Address,
        pool_b: Address,
    ) -> Result<U256> {
        let keeper = ArbKeeper::new(self.keeper, Arc::new(self.client.endpoints().provider()));
        let gas = keeper
            .perform_upkeep(
                pair.token0,
                pair.token1,
                input_amount,
                pool_a,
                pool_b,
                U256::from(ROUTE_VARIANT),
            )
            .from(self.account)
            .gas(ESTIMATE_GAS_LIMIT)
            .estimate_gas()
            .await
            .map_err(AppError::from_contract)?;
        info!(pair = %pair.label, gas = %gas, "[EXEC] gas estimate");
        Ok(gas)
    }

    /// One submission attempt: fresh gas price and a signer bound to the
    /// current endpoint, then send and wait for the receipt.
    async fn submit_once(
        &self,
        pair: &TokenPair,
        input_amount: U256,
        pool_a: Address,
        pool_b: Address,
    ) -> Result<TxHash> {
        let gas_price = self.client.gas_price().await?;
        info!(
            pair = %pair.label,
            gas_price = %utils::format_gwei(gas_price),
            "[EXEC] submitting performUpkeep"
        );

        let signer = SignerMiddleware::new(
            self.client.endpoints().provider(),
            self.wallet.clone().with_chain_id(self.chain_id),
        );
        let keeper = ArbKeeper::new(self.keeper, Arc::new(signer));
        let call = keeper
            .perform_upkeep(
                pair.token0,
                pair.token1,
                input_amount,
                pool_a,
                pool_b,
                U256::from(ROUTE_VARIANT),
            )
            .gas(SUBMIT_GAS_LIMIT)
            .gas_price(gas_price);

        let pending = call.send().await.map_err(AppError::from_contract)?;
        let tx_hash = pending.tx_hash();
        match pending.await {
            Ok(Some(receipt)) => Ok(receipt.transaction_hash),
            Ok(None) => Err(AppError::Rpc(format!(
                "transaction {tx_hash:?} dropped before inclusion"
            ))),
            Err(err) => Err(AppError::from_provider(err)),
        }
    }
}

/// Linear max-profit scan; the first occurrence wins ties.
fn select_best(candidates: &[ArbitrageCandidate]) -> Option<&ArbitrageCandidate> {
    let mut best: Option<&ArbitrageCandidate> = None;
    for candidate in candidates {
        match best {
            Some(current) if candidate.profit <= current.profit => {}
            _ => best = Some(candidate),
        }
    }
    best
}

/// Truncate a computed input toward zero to whole reserve units. Rejects
/// amounts that end up non-positive or outside the uint256 range, which
/// guards against degenerate candidates reaching the chain.
fn truncate_input(input: &BigDecimal) -> Option<U256> {
    let truncated = input.with_scale_round(0, RoundingMode::Down);
    if !truncated.is_positive() {
        return None;
    }
    U256::from_dec_str(&truncated.to_string()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn candidate(profit: i64) -> ArbitrageCandidate {
        ArbitrageCandidate {
            pools: [Address::zero(), Address::zero()],
            input_amount: BigDecimal::from(1),
            profit: BigDecimal::from(profit),
        }
    }

    #[test]
    fn truncation_rounds_toward_zero() {
        let input = BigDecimal::from_str("123.999999999").unwrap();
        assert_eq!(truncate_input(&input), Some(U256::from(123u64)));
    }

    #[test]
    fn truncation_rejects_nonpositive_amounts() {
        assert_eq!(truncate_input(&BigDecimal::from_str("0.4").unwrap()), None);
        assert_eq!(truncate_input(&BigDecimal::from(0)), None);
        assert_eq!(truncate_input(&BigDecimal::from(-5)), None);
    }

    #[test]
    fn truncation_keeps_exact_integers() {
        let input = BigDecimal::from_str("42").unwrap();
        assert_eq!(truncate_input(&input), Some(U256::from(42u64)));
    }

    #[test]
    fn best_candidate_is_max_profit_first_occurrence() {
        let candidates = vec![candidate(5), candidate(9), candidate(9), candidate(3)];
        let best = select_best(&candidates).unwrap();
        assert_eq!(best.profit, BigDecimal::from(9));
        assert!(std::ptr::eq(best, &candidates[1]));
    }

    #[test]
    fn no_candidates_selects_nothing() {
        assert!(select_best(&[]).is_none());
    }
}
