use ethers::contract::ContractError;
use ethers::providers::{Middleware, ProviderError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Crate-wide error type.
///
/// Network failures are classified into a variant exactly once, at the chain
/// boundary (`from_provider` / `from_contract`); everything downstream
/// matches on the variant instead of re-inspecting error text.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    /// Transient network timeout. Drives backoff and endpoint failover.
    #[error("network timeout: {0}")]
    Timeout(String),

    /// Contract revert / invalid opcode. On factory reads this means the
    /// pair or method simply does not exist on that exchange.
    #[error("execution reverted: {0}")]
    Reverted(String),

    /// Provider-internal JSON-RPC failure (code -32603).
    #[error("internal rpc error: {0}")]
    RpcInternal(String),

    /// Any other RPC-level failure.
    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("wallet error: {0}")]
    Wallet(String),
}

// Message signatures the transports are known to emit. Matched case-sensitively.
const TIMEOUT_SIGNATURES: [&str; 2] = ["ETIMEDOUT", "TIMEOUT"];
const REVERT_SIGNATURES: [&str; 2] = ["revert", "invalid opcode"];
const RPC_INTERNAL_CODE: &str = "-32603";

impl AppError {
    /// Classify a raw provider error.
    pub fn from_provider(err: ProviderError) -> Self {
        Self::classify(err.to_string())
    }

    /// Classify a raw contract-call error. Structural revert information is
    /// preferred over message text when the middleware surfaces it.
    pub fn from_contract<M: Middleware>(err: ContractError<M>) -> Self {
        if err.is_revert() {
            return AppError::Reverted(err.to_string());
        }
        Self::classify(err.to_string())
    }

    fn classify(message: String) -> Self {
        if TIMEOUT_SIGNATURES.iter().any(|sig| message.contains(sig)) {
            AppError::Timeout(message)
        } else if REVERT_SIGNATURES.iter().any(|sig| message.contains(sig)) {
            AppError::Reverted(message)
        } else if message.contains(RPC_INTERNAL_CODE) {
            AppError::RpcInternal(message)
        } else {
            AppError::Rpc(message)
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, AppError::Timeout(_))
    }

    /// A revert on a factory/pool read means "not supported here", which is
    /// a normal outcome rather than a failure.
    pub fn is_not_supported(&self) -> bool {
        matches!(self, AppError::Reverted(_))
    }

    pub fn is_rpc_internal(&self) -> bool {
        matches!(self, AppError::RpcInternal(_))
    }
}
