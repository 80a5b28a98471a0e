//! Transfer aggregation subsystem.
//!
//! # Data Flow
//! ```text
//! address + category | filter
//!     → aggregator.rs (directional queries, merge, dedup, sort, truncate)
//!     → types.rs (provider shapes → TransferRecord → TransferView)
//! ```

pub mod aggregator;
pub mod types;

pub use aggregator::TransferAggregator;
pub use types::{Direction, HistoryFilter, TransferCategory, TransferRecord, TransferView};
