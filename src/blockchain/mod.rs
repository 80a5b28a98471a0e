//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! ExplorerConfig (provider + networks)
//!     → factory.rs (one handle per network key)
//!     → client.rs (JSON-RPC reads with timeouts, broadcast)
//!     → transaction.rs (validate, sign via wallet.rs, broadcast, wait, status lookup)
//!     → account.rs / blocks.rs (fan-out reads)
//! ```
//!
//! # Security Constraints
//! - Signing keys arrive per request and are never logged
//! - Provider URLs embed the API key and are never logged
//! - All RPC reads have configurable timeouts
//! - No call is retried

pub mod account;
pub mod blocks;
pub mod client;
pub mod factory;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::{BlockchainClient, ChainProvider};
pub use factory::{ClientFactory, ProviderFactory};
pub use transaction::{TransactionPipeline, TransactionRecord, TransferRequest};
pub use types::{BlockchainError, BlockchainResult, NetworkKey, TxStatus};
pub use wallet::Wallet;
