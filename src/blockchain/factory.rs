//! Chain Client Factory.
//!
//! Produces one network-scoped handle per network key from an explicit
//! configuration. Handles are created on first use and reused afterwards;
//! handles of distinct networks are never shared.

use dashmap::DashMap;
use std::sync::Arc;

use crate::blockchain::client::{BlockchainClient, ChainProvider};
use crate::blockchain::types::{BlockchainResult, NetworkKey};
use crate::config::{ExplorerConfig, NetworksConfig, ProviderConfig};

/// Source of network-scoped provider handles.
pub trait ProviderFactory: Send + Sync {
    fn connect(&self, network: NetworkKey) -> BlockchainResult<Arc<dyn ChainProvider>>;
}

/// Factory backed by JSON-RPC clients.
pub struct ClientFactory {
    provider: ProviderConfig,
    networks: NetworksConfig,
    handles: DashMap<NetworkKey, Arc<BlockchainClient>>,
}

impl ClientFactory {
    pub fn new(provider: ProviderConfig, networks: NetworksConfig) -> Self {
        Self {
            provider,
            networks,
            handles: DashMap::new(),
        }
    }

    pub fn from_config(config: &ExplorerConfig) -> Self {
        Self::new(config.provider.clone(), config.networks.clone())
    }

    /// Number of handles created so far.
    pub fn cached(&self) -> usize {
        self.handles.len()
    }
}

impl ProviderFactory for ClientFactory {
    fn connect(&self, network: NetworkKey) -> BlockchainResult<Arc<dyn ChainProvider>> {
        if let Some(existing) = self.handles.get(&network) {
            let handle: Arc<dyn ChainProvider> = existing.value().clone();
            return Ok(handle);
        }

        let client = Arc::new(BlockchainClient::new(
            network,
            self.networks.endpoint(network),
            &self.provider,
        )?);
        let handle: Arc<dyn ChainProvider> = self.handles.entry(network).or_insert(client).value().clone();
        Ok(handle)
    }
}

impl std::fmt::Debug for ClientFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientFactory")
            .field("cached", &self.handles.len())
            .finish()
    }
}
