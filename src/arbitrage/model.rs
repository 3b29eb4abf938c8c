//! Pairwise constant-product arbitrage model.
//!
//! For every unordered pair of sampled pools this computes the input amount
//! that equalizes the two marginal prices under the 0.3% swap fee, the
//! resulting output, and the profit. All arithmetic is `BigDecimal`;
//! precision loss here would silently corrupt profit comparisons.

use crate::models::{ArbitrageCandidate, PoolSample};
use bigdecimal::BigDecimal;
use ethers::types::Address;
use num_bigint::BigInt;

/// Swap fee retained by a constant-product pool, as thousandths: a trade
/// keeps 997/1000 of its input. Applied identically on both trade legs.
pub const SWAP_FEE_MILLIS: i64 = 997;

fn swap_fee() -> BigDecimal {
    BigDecimal::new(BigInt::from(SWAP_FEE_MILLIS), 3)
}

/// Evaluate every unordered pool pair and keep the candidates whose profit
/// strictly exceeds `min_profit`. Fewer than two samples yields an empty
/// result. Candidates come out in iteration order; the caller selects the
/// best one.
pub fn find_candidates(samples: &[PoolSample], min_profit: &BigDecimal) -> Vec<ArbitrageCandidate> {
    let mut candidates = Vec::new();
    if samples.len() < 2 {
        return candidates;
    }

    let fee = swap_fee();
    for i in (1..samples.len()).rev() {
        for k in (0..i).rev() {
            let (a, b) = (&samples[i], &samples[k]);
            let numerator = &a.liquidity * &b.liquidity * (&a.sqrt_price - &b.sqrt_price);

            let candidate = if a.sqrt_price > b.sqrt_price {
                trade(&fee, numerator, a, b, [a.pool, b.pool], false)
            } else {
                // Low-price pool sits at index i: the trade runs the other
                // way, so both amounts are negated (the numerator is
                // negative here, leaving them positive) and the pool order
                // flips to keep the sell-target first.
                trade(&fee, numerator, b, a, [b.pool, a.pool], true)
            };

            if &candidate.profit > min_profit {
                candidates.push(candidate);
            }
        }
    }
    candidates
}

/// One directed trade: buy from `low`, sell into `high`.
fn trade(
    fee: &BigDecimal,
    numerator: BigDecimal,
    high: &PoolSample,
    low: &PoolSample,
    pools: [Address; 2],
    negate: bool,
) -> ArbitrageCandidate {
    let high_price_sq = &high.sqrt_price * &high.sqrt_price;
    let low_price_sq = &low.sqrt_price * &low.sqrt_price;
    let cross = &high.sqrt_price * &low.sqrt_price;

    let input_denominator = fee * &high.liquidity * &high_price_sq + &low.liquidity * &cross;
    let output_denominator = &low.liquidity * &low_price_sq + fee * &high.liquidity * &cross;

    let mut input_amount = &numerator / (&input_denominator * fee);
    let mut output_amount = &numerator * fee / &output_denominator;
    if negate {
        input_amount = -input_amount;
        output_amount = -output_amount;
    }
    let profit = &output_amount - &input_amount;

    ArbitrageCandidate {
        pools,
        input_amount,
        profit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::Address;
    use std::str::FromStr;

    fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    fn sample(pool: Address, sqrt_price: &str, liquidity: &str) -> PoolSample {
        PoolSample {
            pool,
            sqrt_price: BigDecimal::from_str(sqrt_price).unwrap(),
            liquidity: BigDecimal::from_str(liquidity).unwrap(),
        }
    }

    #[test]
    fn fewer_than_two_samples_yields_nothing() {
        let zero = BigDecimal::from(0);
        assert!(find_candidates(&[], &zero).is_empty());
        assert!(find_candidates(&[sample(addr(1), "2", "1000")], &zero).is_empty());
    }

    #[test]
    fn profit_is_positive_and_deterministic_for_wide_spread() {
        let samples = [
            sample(addr(1), "2", "1000"),
            sample(addr(2), "1", "1000"),
        ];
        let candidates = find_candidates(&samples, &BigDecimal::from(0));
        assert_eq!(candidates.len(), 1);
        let c = &candidates[0];
        assert!(c.profit > BigDecimal::from(165));
        assert!(c.profit < BigDecimal::from(166));
        assert!(c.input_amount > BigDecimal::from(0));
    }

    #[test]
    fn high_price_pool_is_the_sell_target_regardless_of_order() {
        let high = sample(addr(1), "1.05", "480");
        let low = sample(addr(2), "1.0", "500");

        let forward = find_candidates(&[high.clone(), low.clone()], &BigDecimal::from(0));
        let reversed = find_candidates(&[low, high], &BigDecimal::from(0));

        assert_eq!(forward.len(), 1);
        assert_eq!(reversed.len(), 1);
        assert_eq!(forward[0].pools, [addr(1), addr(2)]);
        assert_eq!(reversed[0].pools, [addr(1), addr(2)]);
        assert!(forward[0].input_amount > BigDecimal::from(0));
        assert!(reversed[0].input_amount > BigDecimal::from(0));
        assert_eq!(forward[0].profit, reversed[0].profit);
    }

    #[test]
    fn equal_prices_never_clear_a_nonnegative_threshold() {
        let samples = [
            sample(addr(1), "1.5", "1000"),
            sample(addr(2), "1.5", "800"),
        ];
        assert!(find_candidates(&samples, &BigDecimal::from(0)).is_empty());
    }

    #[test]
    fn three_samples_evaluate_exactly_three_unordered_pairs() {
        let samples = [
            sample(addr(1), "1", "1000"),
            sample(addr(2), "2", "1000"),
            sample(addr(3), "3", "1000"),
        ];
        // Permissive threshold keeps every evaluated pair, so the count
        // equals the number of unordered pairs.
        let everything = BigDecimal::from(-1_000_000_000i64);
        let candidates = find_candidates(&samples, &everything);
        assert_eq!(candidates.len(), 3);
    }

    #[test]
    fn threshold_comparison_is_strict() {
        let samples = [
            sample(addr(1), "1.05", "480"),
            sample(addr(2), "1.0", "500"),
        ];
        let candidates = find_candidates(&samples, &BigDecimal::from(0));
        assert_eq!(candidates.len(), 1);
        let profit = candidates[0].profit.clone();
        // Raising the gate to exactly the profit must filter the candidate.
        assert!(find_candidates(&samples, &profit).is_empty());
    }
}
