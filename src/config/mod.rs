//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, env overrides)
//!     → validation.rs (semantic checks)
//!     → ExplorerConfig (validated, immutable)
//!     → shared via Arc with the HTTP layer and the client factory
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{
    ExplorerConfig, ListenerConfig, NetworkEndpoint, NetworksConfig, NftConfig, ObservabilityConfig,
    PipelineConfig, ProviderConfig, TimeoutConfig, TransferConfig,
};
