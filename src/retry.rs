//! Retry wrapper shared by every network-dependent operation.

use crate::endpoints::EndpointPool;
use crate::errors::Result;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Attempt bound for reads.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
/// Attempt bound for transaction submission.
pub const SUBMIT_MAX_ATTEMPTS: u32 = 3;

/// Exponential backoff for a 1-indexed attempt number: 200, 400, 800, 1600 ms…
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(2u64.pow(attempt) * 100)
}

/// Run `op` up to `max_attempts` times. Between attempts the task sleeps
/// with exponential backoff, and when the failure was classified as a
/// network timeout the endpoint pool is advanced first — best-effort
/// recovery, not guaranteed to fix the root cause. The final attempt's
/// error is returned unchanged.
pub async fn resilient_call<T, F, Fut>(
    pool: &EndpointPool,
    label: &str,
    max_attempts: u32,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 1u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                warn!(
                    label,
                    attempt,
                    max_attempts,
                    error = %err,
                    "[RPC] attempt failed"
                );
                if attempt >= max_attempts {
                    return Err(err);
                }
                tokio::time::sleep(backoff_delay(attempt)).await;
                if err.is_timeout() {
                    pool.advance();
                }
                attempt += 1;
            }
        }
    }
}

/// Variant for per-exchange factory reads: a revert / invalid-opcode
/// classification means the pair or method is simply not supported on that
/// exchange, which resolves to `Ok(None)` instead of retrying or surfacing.
pub async fn resilient_factory_call<T, F, Fut>(
    pool: &EndpointPool,
    label: &str,
    mut op: F,
) -> Result<Option<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    resilient_call(pool, label, DEFAULT_MAX_ATTEMPTS, move || {
        let fut = op();
        async move {
            match fut.await {
                Ok(value) => Ok(Some(value)),
                Err(err) if err.is_not_supported() => Ok(None),
                Err(err) => Err(err),
            }
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn pool(endpoints: &[&str]) -> EndpointPool {
        EndpointPool::new(endpoints.iter().map(|e| e.to_string()).collect()).expect("pool")
    }

    #[test]
    fn backoff_delays_double_per_attempt() {
        let delays: Vec<_> = (1..=4).map(backoff_delay).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(200),
                Duration::from_millis(400),
                Duration::from_millis(800),
                Duration::from_millis(1600),
            ]
        );
        assert!(delays.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_fifth_attempt_under_default_bound() {
        let pool = pool(&["http://node.invalid"]);
        let calls = AtomicU32::new(0);
        let result = resilient_call(&pool, "flaky", DEFAULT_MAX_ATTEMPTS, || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 5 {
                    Err(AppError::Rpc(format!("boom {n}")))
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 5);
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_returns_the_last_error() {
        let pool = pool(&["http://node.invalid"]);
        let calls = AtomicU32::new(0);
        let result: Result<()> = resilient_call(&pool, "doomed", 3, || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Err(AppError::Rpc(format!("failure {n}"))) }
        })
        .await;
        let err = result.unwrap_err();
        assert!(err.to_string().contains("failure 3"), "got: {err}");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_failure_advances_the_endpoint_pool() {
        let pool = pool(&["http://node0.invalid", "http://node1.invalid"]);
        let result: Result<()> = resilient_call(&pool, "timing-out", 2, || async {
            Err(AppError::Timeout("connect ETIMEDOUT".into()))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(pool.current().unwrap(), "http://node1.invalid");
    }

    #[tokio::test(start_paused = true)]
    async fn plain_failure_does_not_advance_the_endpoint_pool() {
        let pool = pool(&["http://node0.invalid", "http://node1.invalid"]);
        let result: Result<()> = resilient_call(&pool, "refused", 2, || async {
            Err(AppError::Rpc("connection refused".into()))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(pool.current().unwrap(), "http://node0.invalid");
    }

    #[tokio::test(start_paused = true)]
    async fn factory_variant_turns_revert_into_none_without_retrying() {
        let pool = pool(&["http://node.invalid"]);
        let calls = AtomicU32::new(0);
        let result: Result<Option<u32>> = resilient_factory_call(&pool, "getPair", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AppError::Reverted("execution reverted".into())) }
        })
        .await;
        assert!(result.unwrap().is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn factory_variant_passes_successes_through() {
        let pool = pool(&["http://node.invalid"]);
        let result = resilient_factory_call(&pool, "getPair", || async { Ok(7u32) }).await;
        assert_eq!(result.unwrap(), Some(7));
    }
}
