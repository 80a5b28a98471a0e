//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the explorer.
//! All types derive Serde traits for deserialization from config files.

use serde::Deserialize;

use crate::blockchain::types::NetworkKey;
use crate::secret::SecretString;

/// Root configuration for the explorer service.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Chain-data provider settings shared by every network.
    pub provider: ProviderConfig,

    /// Per-network provider endpoints.
    pub networks: NetworksConfig,

    /// Send pipeline settings.
    pub pipeline: PipelineConfig,

    /// Transfer aggregation limits.
    pub transfers: TransferConfig,

    /// NFT gallery limits.
    pub nfts: NftConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Chain-data provider configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// API key appended to every network base URL.
    pub api_key: Option<SecretString>,

    /// Bound on a single read call in seconds.
    pub rpc_timeout_secs: u64,

    /// Interval between receipt polls while waiting for inclusion.
    pub receipt_poll_interval_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            rpc_timeout_secs: 15,
            receipt_poll_interval_ms: 2000,
        }
    }
}

/// Endpoint of one network.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkEndpoint {
    /// Provider base URL, without the API key segment.
    pub rpc_url: String,

    /// Base URL of the provider's NFT API, without the API key segment.
    #[serde(default)]
    pub nft_url: Option<String>,

    /// EIP-155 chain id used when signing.
    pub chain_id: u64,
}

/// Endpoints of every supported network.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworksConfig {
    pub mainnet: NetworkEndpoint,
    pub sepolia: NetworkEndpoint,
    pub goerli: NetworkEndpoint,
}

impl NetworksConfig {
    pub fn endpoint(&self, network: NetworkKey) -> &NetworkEndpoint {
        match network {
            NetworkKey::Mainnet => &self.mainnet,
            NetworkKey::Sepolia => &self.sepolia,
            NetworkKey::Goerli => &self.goerli,
        }
    }
}

impl Default for NetworksConfig {
    fn default() -> Self {
        Self {
            mainnet: NetworkEndpoint {
                rpc_url: "https://eth-mainnet.g.alchemy.com/v2".to_string(),
                nft_url: Some("https://eth-mainnet.g.alchemy.com/nft/v3".to_string()),
                chain_id: 1,
            },
            sepolia: NetworkEndpoint {
                rpc_url: "https://eth-sepolia.g.alchemy.com/v2".to_string(),
                nft_url: Some("https://eth-sepolia.g.alchemy.com/nft/v3".to_string()),
                chain_id: 11_155_111,
            },
            goerli: NetworkEndpoint {
                rpc_url: "https://eth-goerli.g.alchemy.com/v2".to_string(),
                nft_url: Some("https://eth-goerli.g.alchemy.com/nft/v3".to_string()),
                chain_id: 5,
            },
        }
    }
}

/// Send pipeline configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// How long a send request waits for inclusion before answering "pending".
    pub confirmation_timeout_secs: u64,

    /// Fixed gas limit for every transfer. When unset, each transfer is
    /// estimated by the provider.
    pub gas_limit: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            confirmation_timeout_secs: 120,
            gas_limit: None,
        }
    }
}

/// Transfer aggregation limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Page size of each directional query in the category lookup.
    pub page_size: u32,

    /// Page size of each directional query in the address history.
    pub overview_page_size: u32,

    /// Cap applied to the category lookup after sorting.
    pub max_results: usize,

    /// Number of blocks returned by the latest-blocks read.
    pub latest_blocks: u64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            page_size: 25,
            overview_page_size: 100,
            max_results: 50,
            latest_blocks: 10,
        }
    }
}

/// NFT gallery limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NftConfig {
    /// Tokens returned per ownership lookup.
    pub page_size: u32,
}

impl Default for NftConfig {
    fn default() -> Self {
        Self { page_size: 20 }
    }
}

/// Timeout configuration for the request boundary.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 180 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
