//! Core library for the arbitrage-keeper service.
//!
//! The crate samples UniswapV2-style pools for configured token pairs,
//! computes pairwise constant-product arbitrage opportunities, and submits
//! the best one through a keeper contract. The binary (`main.rs`) only
//! wires configuration and the HTTP trigger around these modules.

pub mod arbitrage;
pub mod config;
pub mod cycle;
pub mod dex;
pub mod endpoints;
pub mod errors;
pub mod executor;
pub mod models;
pub mod retry;
pub mod server;
pub mod utils;
