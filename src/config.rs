//! Configuration loader and application settings.
//!
//! Everything is read once at startup; a missing credential or an empty
//! endpoint list is fatal. The default pair/factory/keeper universe is the
//! Polygon PoS deployment this service runs against.

use crate::errors::{AppError, Result};
use crate::models::{ExchangeSource, TokenPair};
use bigdecimal::BigDecimal;
use ethers::types::Address;
use url::Url;

// Polygon PoS token addresses for the default pair.
const WETH: &str = "0x7ceB23fD6bC0adD59E62ac25578270cFf1b9f619";
const USDT: &str = "0xc2132D05D31c914a87C6611C10748AEb04B58e8F";

// Default minimum profit in reserve units, chosen to clear gas on Polygon.
const DEFAULT_MIN_PROFIT: u64 = 2_500_000_000_000;

// UniswapV2-compatible factories queried for every pair.
const FACTORIES: [(&str, &str); 3] = [
    ("UniswapV2", "0x9e5A52f57b3038F1B8EeE45F28b3C1967e22799C"),
    ("Sushiswap", "0xc35DADB65012eC5796536bD9864eD8773aBc74C4"),
    ("Quickswap", "0x5757371414417b8C6CAad45bAeF941aBc7d3Ab32"),
];

// Deployed keeper contract executing the two-pool swap sequence.
const DEFAULT_KEEPER: &str = "0xAA6fE0D45102d65eD0e5e1fC00709f864c86773a";

const DEFAULT_CHAIN_ID: u64 = 137;
const DEFAULT_PORT: u16 = 3000;

/// Consolidated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Ordered RPC endpoints; the pool rotates through these on failover.
    pub endpoints: Vec<String>,
    /// Hex-encoded signing key for the submitting account.
    pub private_key: String,
    /// Address transactions are sent from.
    pub account: Address,
    /// Keeper contract that executes the trade.
    pub keeper_address: Address,
    pub chain_id: u64,
    pub port: u16,
    pub pairs: Vec<TokenPair>,
    pub exchanges: Vec<ExchangeSource>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let endpoints = load_endpoints()?;
        let private_key = std::env::var("PRIVATE_KEY")
            .map_err(|_| AppError::Config("PRIVATE_KEY environment variable is required".into()))?;
        let account = std::env::var("ACCOUNT")
            .map_err(|_| AppError::Config("ACCOUNT environment variable is required".into()))
            .and_then(|raw| parse_address(&raw, "ACCOUNT"))?;
        let keeper_address = match std::env::var("KEEPER_ADDRESS") {
            Ok(raw) => parse_address(&raw, "KEEPER_ADDRESS")?,
            Err(_) => parse_address(DEFAULT_KEEPER, "default keeper")?,
        };
        let chain_id = env_parsed("CHAIN_ID", DEFAULT_CHAIN_ID)?;
        let port = env_parsed("PORT", DEFAULT_PORT)?;

        Ok(Self {
            endpoints,
            private_key,
            account,
            keeper_address,
            chain_id,
            port,
            pairs: default_pairs()?,
            exchanges: default_exchanges()?,
        })
    }
}

/// RPC_URL1..RPC_URL5, keeping only the ones that are set. At least one is
/// required and each must be a valid URL.
fn load_endpoints() -> Result<Vec<String>> {
    let mut endpoints = Vec::new();
    for n in 1..=5 {
        if let Ok(raw) = std::env::var(format!("RPC_URL{n}")) {
            if raw.trim().is_empty() {
                continue;
            }
            Url::parse(&raw)
                .map_err(|e| AppError::Config(format!("RPC_URL{n} is not a valid URL: {e}")))?;
            endpoints.push(raw);
        }
    }
    if endpoints.is_empty() {
        return Err(AppError::Config("at least one RPC_URL is required".into()));
    }
    Ok(endpoints)
}

pub fn default_pairs() -> Result<Vec<TokenPair>> {
    let min_profit = match std::env::var("MIN_PROFIT") {
        Ok(raw) => raw
            .parse::<BigDecimal>()
            .map_err(|e| AppError::Config(format!("MIN_PROFIT is not a valid decimal: {e}")))?,
        Err(_) => BigDecimal::from(DEFAULT_MIN_PROFIT),
    };
    Ok(vec![TokenPair {
        token0: parse_address(WETH, "WETH")?,
        token1: parse_address(USDT, "USDT")?,
        label: "WETH/USDT".into(),
        min_profit,
    }])
}

pub fn default_exchanges() -> Result<Vec<ExchangeSource>> {
    FACTORIES
        .iter()
        .map(|(name, factory)| {
            Ok(ExchangeSource {
                name: (*name).into(),
                factory: parse_address(factory, name)?,
            })
        })
        .collect()
}

fn parse_address(raw: &str, what: &str) -> Result<Address> {
    raw.trim()
        .parse::<Address>()
        .map_err(|e| AppError::Config(format!("{what} is not a valid address: {e}")))
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| AppError::Config(format!("{name} is invalid: {e}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_universe_parses() {
        let exchanges = default_exchanges().unwrap();
        assert_eq!(exchanges.len(), 3);
        assert_eq!(exchanges[0].name, "UniswapV2");

        let pairs = default_pairs().unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].label, "WETH/USDT");
        assert!(pairs[0].min_profit > BigDecimal::from(0));
    }

    #[test]
    fn address_parsing_rejects_garbage() {
        assert!(parse_address("not-an-address", "TEST").is_err());
        assert!(parse_address(WETH, "WETH").is_ok());
    }
}
