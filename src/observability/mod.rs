//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! http, blockchain and transfers produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows from the HTTP layer into every log line of a request
//! - Secrets and provider URLs are never recorded

pub mod logging;
pub mod metrics;
