//! On-chain access to UniswapV2-style exchanges: typed contract bindings
//! plus the per-pair pool sampler.

pub mod client;
pub mod sampler;

pub use client::ChainClient;
pub use sampler::sample_pair;
