//! Rotating pool of interchangeable RPC endpoints.
//!
//! All components share one `EndpointPool` (via `Arc`) and obtain a fresh
//! provider handle through it for every network call, so a failover
//! performed by one caller is visible to the next call immediately.

use crate::errors::{AppError, Result};
use ethers::providers::{Http, Provider};
use std::sync::Mutex;
use tracing::{info, warn};

pub struct EndpointPool {
    inner: Mutex<Inner>,
}

struct Inner {
    endpoints: Vec<String>,
    index: usize,
    provider: Provider<Http>,
}

impl EndpointPool {
    /// Build a pool bound to the first endpoint. At least one endpoint is
    /// required; an unparseable first endpoint is a configuration error.
    pub fn new(endpoints: Vec<String>) -> Result<Self> {
        let first = endpoints
            .first()
            .ok_or_else(|| AppError::Config("at least one RPC endpoint is required".into()))?;
        let provider = Provider::<Http>::try_from(first.as_str())
            .map_err(|e| AppError::Config(format!("invalid RPC endpoint {first}: {e}")))?;
        Ok(Self {
            inner: Mutex::new(Inner {
                endpoints,
                index: 0,
                provider,
            }),
        })
    }

    /// The endpoint currently in use.
    pub fn current(&self) -> Result<String> {
        let guard = self.lock();
        guard
            .endpoints
            .get(guard.index)
            .cloned()
            .ok_or_else(|| AppError::Config("endpoint list is empty".into()))
    }

    /// A handle on the connection bound to the current endpoint. Cheap to
    /// clone; callers must not cache it across calls.
    pub fn provider(&self) -> Provider<Http> {
        self.lock().provider.clone()
    }

    /// Rotate to the next endpoint (wrapping) and rebind the connection.
    /// Never fails: with a single endpoint this reselects the same one, and
    /// if the rebind fails the previous connection stays active.
    pub fn advance(&self) {
        let mut guard = self.lock();
        if guard.endpoints.is_empty() {
            return;
        }
        guard.index = (guard.index + 1) % guard.endpoints.len();
        let next = guard.endpoints[guard.index].clone();
        match Provider::<Http>::try_from(next.as_str()) {
            Ok(provider) => {
                guard.provider = provider;
                info!(endpoint = %next, "[RPC] switched endpoint");
            }
            Err(e) => {
                warn!(endpoint = %next, error = %e, "[RPC] rebind failed, keeping previous connection");
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock would mean a panic while rotating; the pool state
        // itself stays coherent, so keep serving.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
