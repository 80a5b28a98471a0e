//! Block explorer backend library.
//!
//! Reads and writes Ethereum-compatible chain state through a chain-data
//! provider: decimal amount conversion, a send pipeline with status lookup,
//! multi-category transfer aggregation and NFT reads behind a JSON HTTP
//! boundary.

pub mod amount;
pub mod blockchain;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod nft;
pub mod observability;
pub mod secret;
pub mod transfers;

pub use config::ExplorerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
