//! Miscellaneous helper utilities.

use ethers::types::U256;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the `tracing` subscriber with an env-based filter.
/// Defaults to `info` when `RUST_LOG` is unset.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Render a wei amount as gwei for submit-path logging.
pub fn format_gwei(wei: U256) -> String {
    match u128::try_from(wei) {
        Ok(value) => format!("{:.2} gwei", value as f64 / 1e9),
        Err(_) => format!("{wei} wei"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gwei_formatting() {
        assert_eq!(format_gwei(U256::from(30_000_000_000u64)), "30.00 gwei");
        assert_eq!(format_gwei(U256::from(1_500_000_000u64)), "1.50 gwei");
    }
}
