use crate::endpoints::EndpointPool;
use crate::errors::{AppError, Result};
use ethers::{
    contract::abigen,
    providers::Middleware,
    types::{Address, U256},
};
use std::sync::Arc;

abigen!(
    UniswapV2Factory,
    r#"[
        function getPair(address tokenA, address tokenB) external view returns (address pair)
    ]"#,
);

abigen!(
    UniswapV2Pair,
    r#"[
        function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast)
    ]"#,
);

abigen!(
    ArbKeeper,
    r#"[
        function performUpkeep(address token0, address token1, uint256 inputDx, address poolA, address poolB, uint256 routeVariant)
    ]"#,
);

/// Read-side handle on the chain. Contract instances are rebuilt from the
/// endpoint pool's current provider on every call, so a failover mid-cycle
/// takes effect on the very next read.
#[derive(Clone)]
pub struct ChainClient {
    endpoints: Arc<EndpointPool>,
}

impl ChainClient {
    pub fn new(endpoints: Arc<EndpointPool>) -> Self {
        Self { endpoints }
    }

    pub fn endpoints(&self) -> &EndpointPool {
        &self.endpoints
    }

    /// Resolve a pair to its pool address on one exchange's factory.
    /// The zero address means the factory has no such pool.
    pub async fn pair_address(
        &self,
        factory: Address,
        token_a: Address,
        token_b: Address,
    ) -> Result<Address> {
        let factory = UniswapV2Factory::new(factory, Arc::new(self.endpoints.provider()));
        factory
            .get_pair(token_a, token_b)
            .call()
            .await
            .map_err(AppError::from_contract)
    }

    pub async fn reserves(&self, pool: Address) -> Result<(u128, u128)> {
        let pool = UniswapV2Pair::new(pool, Arc::new(self.endpoints.provider()));
        let (reserve0, reserve1, _block_timestamp) = pool
            .get_reserves()
            .call()
            .await
            .map_err(AppError::from_contract)?;
        Ok((reserve0, reserve1))
    }

    /// True when the address holds deployed bytecode on the current endpoint.
    pub async fn is_contract(&self, address: Address) -> Result<bool> {
        let code = self
            .endpoints
            .provider()
            .get_code(address, None)
            .await
            .map_err(AppError::from_provider)?;
        Ok(!code.as_ref().is_empty())
    }

    pub async fn gas_price(&self) -> Result<U256> {
        self.endpoints
            .provider()
            .get_gas_price()
            .await
            .map_err(AppError::from_provider)
    }
}
