//! Pool sampler: reads price and liquidity for one pair across every
//! configured exchange.

use crate::dex::client::ChainClient;
use crate::models::{ExchangeSample, ExchangeSource, PoolSample, SampleOutcome, TokenPair};
use crate::retry::{self, DEFAULT_MAX_ATTEMPTS};
use ethers::types::Address;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Pause between exchange queries so rate-limited providers are not hammered.
pub const EXCHANGE_QUERY_DELAY: Duration = Duration::from_millis(100);

/// Query every exchange sequentially for `pair` and return one tagged
/// outcome per exchange. Never fails as a whole: a broken exchange is
/// recorded as `Failed` and the rest still get sampled.
pub async fn sample_pair(
    client: &ChainClient,
    exchanges: &[ExchangeSource],
    pair: &TokenPair,
) -> Vec<ExchangeSample> {
    let mut results = Vec::with_capacity(exchanges.len());
    for exchange in exchanges {
        let outcome = sample_exchange(client, exchange, pair).await;
        match &outcome {
            SampleOutcome::Found(sample) => {
                debug!(
                    exchange = %exchange.name,
                    pool = ?sample.pool,
                    sqrt_price = %sample.sqrt_price,
                    liquidity = %sample.liquidity,
                    "[SAMPLER] pool sampled"
                );
            }
            SampleOutcome::NotSupported => {
                debug!(exchange = %exchange.name, pair = %pair.label, "[SAMPLER] pair not listed");
            }
            SampleOutcome::Failed(err) => {
                error!(exchange = %exchange.name, pair = %pair.label, error = %err, "[SAMPLER] exchange skipped");
            }
        }
        results.push(ExchangeSample {
            exchange: exchange.name.clone(),
            outcome,
        });
        tokio::time::sleep(EXCHANGE_QUERY_DELAY).await;
    }
    results
}

async fn sample_exchange(
    client: &ChainClient,
    exchange: &ExchangeSource,
    pair: &TokenPair,
) -> SampleOutcome {
    let label = format!("{} getPair", exchange.name);
    let resolved = retry::resilient_factory_call(client.endpoints(), &label, || {
        client.pair_address(exchange.factory, pair.token0, pair.token1)
    })
    .await;

    let pool = match resolved {
        Err(err) => return SampleOutcome::Failed(err),
        Ok(None) => return SampleOutcome::NotSupported,
        Ok(Some(address)) if address == Address::zero() => return SampleOutcome::NotSupported,
        Ok(Some(address)) => address,
    };

    let label = format!("{} getReserves", exchange.name);
    let reserves = retry::resilient_call(client.endpoints(), &label, DEFAULT_MAX_ATTEMPTS, || {
        client.reserves(pool)
    })
    .await;

    match reserves {
        Err(err) => SampleOutcome::Failed(err),
        Ok((reserve0, reserve1)) => match PoolSample::from_reserves(pool, reserve0, reserve1) {
            Some(sample) => SampleOutcome::Found(sample),
            None => {
                warn!(exchange = %exchange.name, pool = ?pool, "[SAMPLER] empty reserves");
                SampleOutcome::NotSupported
            }
        },
    }
}

/// Extract the usable samples from a set of per-exchange outcomes.
pub fn found_samples(outcomes: Vec<ExchangeSample>) -> Vec<PoolSample> {
    outcomes
        .into_iter()
        .filter_map(|record| match record.outcome {
            SampleOutcome::Found(sample) => Some(sample),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    fn sample(price: u32) -> PoolSample {
        PoolSample::from_reserves(Address::zero(), 1, (price as u128).pow(2)).expect("sample")
    }

    #[test]
    fn found_samples_drops_everything_but_found() {
        let outcomes = vec![
            ExchangeSample {
                exchange: "A".into(),
                outcome: SampleOutcome::Found(sample(2)),
            },
            ExchangeSample {
                exchange: "B".into(),
                outcome: SampleOutcome::NotSupported,
            },
            ExchangeSample {
                exchange: "C".into(),
                outcome: SampleOutcome::Failed(AppError::Rpc("boom".into())),
            },
        ];
        let samples = found_samples(outcomes);
        assert_eq!(samples.len(), 1);
    }
}
