//! Chain-data provider capability set and its JSON-RPC implementation.
//!
//! # Responsibilities
//! - Define the reads/writes the core depends on (`ChainProvider`)
//! - Connect to a provider endpoint per network
//! - Bound every read with the configured timeout
//! - Classify broadcast and estimation failures as rejections or transport failures
//! - Reach the provider's REST NFT API next to its JSON-RPC endpoint
//!
//! No call is retried. A failed call surfaces immediately.

use alloy::consensus::Transaction as ConsensusTransaction;
use alloy::eips::BlockId;
use alloy::network::TransactionResponse;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::{Block, Transaction, TransactionReceipt, TransactionRequest};
use alloy::transports::TransportResult;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::IntoFuture;
use std::time::{Duration, Instant};
use tokio::time::{interval, timeout};

use crate::blockchain::types::{
    BlockContents, BlockSummary, BlockchainError, BlockchainResult, NetworkKey,
    ReceiptSummary, TransactionDetails,
};
use crate::config::{NetworkEndpoint, ProviderConfig};
use crate::nft::types::{NftOwnerQuery, OwnedNftsPage, RawNft};
use crate::observability::metrics;
use crate::secret::SecretString;
use crate::transfers::types::{AssetTransfersPage, RawTransfer, TransferQuery};

/// Provider method enumerating transfers by category and direction.
pub const ASSET_TRANSFERS_METHOD: &str = "alchemy_getAssetTransfers";

/// NFT API resource listing the tokens an address holds.
pub const NFTS_FOR_OWNER_PATH: &str = "getNFTsForOwner";

/// NFT API resource describing a single token.
pub const NFT_METADATA_PATH: &str = "getNFTMetadata";

/// Everything the core needs from a chain-data provider, scoped to one network.
#[async_trait]
pub trait ChainProvider: Send + Sync {
    /// Network this handle talks to.
    fn network(&self) -> NetworkKey;

    /// EIP-155 chain id of the network.
    fn chain_id(&self) -> u64;

    async fn get_balance(&self, address: Address) -> BlockchainResult<U256>;

    /// Whether code is deployed at `address`.
    async fn is_contract_address(&self, address: Address) -> BlockchainResult<bool>;

    async fn get_block_number(&self) -> BlockchainResult<u64>;

    async fn get_block(&self, number: u64, full_transactions: bool) -> BlockchainResult<Option<BlockSummary>>;

    async fn get_transaction(&self, hash: TxHash) -> BlockchainResult<Option<TransactionDetails>>;

    async fn get_transaction_receipt(&self, hash: TxHash)
        -> BlockchainResult<Option<ReceiptSummary>>;

    /// Pending nonce of `address`.
    async fn get_transaction_count(&self, address: Address) -> BlockchainResult<u64>;

    /// Current gas price in wei.
    async fn get_gas_price(&self) -> BlockchainResult<u128>;

    /// Gas `request` needs. A request the node would refuse is a rejection.
    async fn estimate_gas(&self, request: &TransactionRequest) -> BlockchainResult<u64>;

    async fn get_asset_transfers(&self, query: &TransferQuery) -> BlockchainResult<Vec<RawTransfer>>;

    /// First page of tokens held by `query.owner`.
    async fn get_nfts_for_owner(&self, query: &NftOwnerQuery) -> BlockchainResult<OwnedNftsPage>;

    async fn get_nft_metadata(&self, contract: Address, token_id: &str) -> BlockchainResult<RawNft>;

    /// Broadcast a signed EIP-2718 payload.
    async fn submit_signed_transaction(&self, payload: Bytes) -> BlockchainResult<TxHash>;

    /// Suspend until `hash` is included in a block.
    ///
    /// There is no internal bound; the caller decides how long to wait.
    async fn wait_for_receipt(&self, hash: TxHash) -> BlockchainResult<ReceiptSummary>;
}

/// JSON-RPC provider handle for one network.
#[derive(Clone)]
pub struct BlockchainClient {
    provider: DynProvider,
    /// REST client for the NFT API.
    http: reqwest::Client,
    /// NFT API base, key included. `None` when the endpoint has no NFT API.
    nft_api: Option<url::Url>,
    network: NetworkKey,
    chain_id: u64,
    /// Request timeout duration.
    timeout_duration: Duration,
    poll_interval: Duration,
    /// Kept only to scrub it from transport error texts.
    api_key: Option<SecretString>,
}

impl BlockchainClient {
    /// Create a client for `network`.
    ///
    /// Connecting is lazy; no request is issued here.
    pub fn new(
        network: NetworkKey,
        endpoint: &NetworkEndpoint,
        config: &ProviderConfig,
    ) -> BlockchainResult<Self> {
        let url = endpoint_url(endpoint, config.api_key.as_ref())?;
        let provider = ProviderBuilder::new().connect_http(url).erased();
        let nft_api = endpoint
            .nft_url
            .as_deref()
            .map(|base| keyed_url(base, config.api_key.as_ref()))
            .transpose()?;
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let http = reqwest::Client::builder()
            .timeout(timeout_duration)
            .build()
            .map_err(|e| BlockchainError::ProviderUnavailable(format!("HTTP client: {}", e)))?;

        tracing::info!(
            network = %network,
            chain_id = endpoint.chain_id,
            api_key = config.api_key.is_some(),
            nft_api = nft_api.is_some(),
            "Blockchain client initialized"
        );

        Ok(Self {
            provider,
            http,
            nft_api,
            network,
            chain_id: endpoint.chain_id,
            timeout_duration,
            poll_interval: Duration::from_millis(config.receipt_poll_interval_ms),
            api_key: config.api_key.clone().filter(|key| !key.is_empty()),
        })
    }

    /// Transport errors may echo the request URL, which embeds the API key.
    fn redact(&self, message: String) -> String {
        match &self.api_key {
            Some(key) => message.replace(key.expose_secret(), "***"),
            None => message,
        }
    }

    /// Issue one bounded read and classify its failure as transport-level.
    async fn rpc<T, F>(&self, method: &'static str, request: F) -> BlockchainResult<T>
    where
        F: IntoFuture<Output = TransportResult<T>> + Send,
        F::IntoFuture: Send,
        T: Send,
    {
        let start = Instant::now();
        let result = match timeout(self.timeout_duration, request).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                let error = self.redact(e.to_string());
                tracing::warn!(network = %self.network, method, error = %error, "RPC error");
                Err(BlockchainError::ProviderUnavailable(format!("{}: {}", method, error)))
            }
            Err(_) => {
                tracing::warn!(network = %self.network, method, "RPC timeout");
                Err(BlockchainError::ProviderUnavailable(format!(
                    "{} timed out after {} seconds",
                    method,
                    self.timeout_duration.as_secs()
                )))
            }
        };
        metrics::record_provider_call(self.network.as_str(), method, result.is_ok(), start);
        result
    }

    /// Like [`Self::rpc`], but an error response from the node is a rejection
    /// of the request rather than a transport failure.
    async fn rejectable<T, F>(&self, method: &'static str, request: F) -> BlockchainResult<T>
    where
        F: IntoFuture<Output = TransportResult<T>> + Send,
        F::IntoFuture: Send,
        T: Send,
    {
        let start = Instant::now();
        let result = match timeout(self.timeout_duration, request).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => match e.as_error_resp() {
                Some(rejection) => {
                    tracing::warn!(network = %self.network, method, reason = %rejection.message, "Request rejected");
                    Err(BlockchainError::RejectedByNetwork(rejection.message.to_string()))
                }
                None => {
                    let error = self.redact(e.to_string());
                    tracing::warn!(network = %self.network, method, error = %error, "RPC error");
                    Err(BlockchainError::ProviderUnavailable(format!("{}: {}", method, error)))
                }
            },
            Err(_) => Err(BlockchainError::ProviderUnavailable(format!(
                "{} timed out after {} seconds",
                method,
                self.timeout_duration.as_secs()
            ))),
        };
        metrics::record_provider_call(self.network.as_str(), method, result.is_ok(), start);
        result
    }

    /// GET one NFT API resource. Requests are bounded by the client timeout.
    async fn nft_get<Q, T>(&self, resource: &'static str, query: &Q) -> BlockchainResult<T>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let start = Instant::now();
        let result = self.nft_request(resource, query).await;
        if let Err(e) = &result {
            tracing::warn!(network = %self.network, resource, error = %e, "NFT API error");
        }
        metrics::record_provider_call(self.network.as_str(), resource, result.is_ok(), start);
        result
    }

    fn nft_resource_url(&self, resource: &str) -> BlockchainResult<url::Url> {
        let mut url = self.nft_api.clone().ok_or_else(|| {
            BlockchainError::ProviderUnavailable(format!("no NFT API configured for {}", self.network))
        })?;
        url.path_segments_mut()
            .map_err(|_| BlockchainError::ProviderUnavailable("NFT API URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .push(resource);
        Ok(url)
    }

    async fn nft_request<Q, T>(&self, resource: &'static str, query: &Q) -> BlockchainResult<T>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.nft_resource_url(resource)?;

        // reqwest errors carry the URL, and the URL carries the key
        let transport = |e: reqwest::Error| {
            BlockchainError::ProviderUnavailable(self.redact(format!("{}: {}", resource, e.without_url())))
        };
        let response = self.http.get(url).query(query).send().await.map_err(transport)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(BlockchainError::NotFound("NFT not found".to_string()));
        }
        if !status.is_success() {
            return Err(BlockchainError::ProviderUnavailable(format!(
                "{}: HTTP {}",
                resource, status
            )));
        }

        response.json::<T>().await.map_err(|e| {
            BlockchainError::MalformedResponse(self.redact(format!("{}: {}", resource, e.without_url())))
        })
    }
}

#[async_trait]
impl ChainProvider for BlockchainClient {
    fn network(&self) -> NetworkKey {
        self.network
    }

    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn get_balance(&self, address: Address) -> BlockchainResult<U256> {
        self.rpc("eth_getBalance", self.provider.get_balance(address)).await
    }

    async fn is_contract_address(&self, address: Address) -> BlockchainResult<bool> {
        let code = self.rpc("eth_getCode", self.provider.get_code_at(address)).await?;
        Ok(!code.is_empty())
    }

    async fn get_block_number(&self) -> BlockchainResult<u64> {
        self.rpc("eth_blockNumber", self.provider.get_block_number()).await
    }

    async fn get_block(&self, number: u64, full_transactions: bool) -> BlockchainResult<Option<BlockSummary>> {
        let request = self.provider.get_block(BlockId::number(number));
        let request = if full_transactions { request.full() } else { request };

        let block = self.rpc("eth_getBlock", request).await?;
        Ok(block.as_ref().map(block_summary))
    }

    async fn get_transaction(&self, hash: TxHash) -> BlockchainResult<Option<TransactionDetails>> {
        let tx = self
            .rpc("eth_getTransactionByHash", self.provider.get_transaction_by_hash(hash))
            .await?;
        Ok(tx.as_ref().map(transaction_details))
    }

    async fn get_transaction_receipt(
        &self,
        hash: TxHash,
    ) -> BlockchainResult<Option<ReceiptSummary>> {
        let receipt = self
            .rpc("eth_getTransactionReceipt", self.provider.get_transaction_receipt(hash))
            .await?;
        Ok(receipt.as_ref().map(receipt_summary))
    }

    async fn get_transaction_count(&self, address: Address) -> BlockchainResult<u64> {
        self.rpc(
            "eth_getTransactionCount",
            self.provider.get_transaction_count(address).pending(),
        )
        .await
    }

    async fn get_gas_price(&self) -> BlockchainResult<u128> {
        self.rpc("eth_gasPrice", self.provider.get_gas_price()).await
    }

    async fn estimate_gas(&self, request: &TransactionRequest) -> BlockchainResult<u64> {
        self.rejectable("eth_estimateGas", self.provider.estimate_gas(request.clone()))
            .await
    }

    async fn get_asset_transfers(&self, query: &TransferQuery) -> BlockchainResult<Vec<RawTransfer>> {
        let page: AssetTransfersPage = self
            .rpc(
                ASSET_TRANSFERS_METHOD,
                self.provider
                    .raw_request::<_, AssetTransfersPage>(ASSET_TRANSFERS_METHOD.into(), (query.clone(),)),
            )
            .await?;
        Ok(page.transfers)
    }

    async fn get_nfts_for_owner(&self, query: &NftOwnerQuery) -> BlockchainResult<OwnedNftsPage> {
        self.nft_get(NFTS_FOR_OWNER_PATH, query).await
    }

    async fn get_nft_metadata(&self, contract: Address, token_id: &str) -> BlockchainResult<RawNft> {
        let contract = contract.to_string();
        self.nft_get(
            NFT_METADATA_PATH,
            &[("contractAddress", contract.as_str()), ("tokenId", token_id)],
        )
        .await
    }

    async fn submit_signed_transaction(&self, payload: Bytes) -> BlockchainResult<TxHash> {
        self.rejectable("eth_sendRawTransaction", async {
            self.provider
                .send_raw_transaction(&payload)
                .await
                .map(|pending| *pending.tx_hash())
        })
        .await
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> BlockchainResult<ReceiptSummary> {
        let mut ticker = interval(self.poll_interval);

        loop {
            ticker.tick().await;

            match self.get_transaction_receipt(hash).await? {
                Some(receipt) if receipt.block_number.is_some() => return Ok(receipt),
                _ => tracing::debug!(tx_hash = %hash, network = %self.network, "Transaction pending"),
            }
        }
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("network", &self.network)
            .field("chain_id", &self.chain_id)
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .finish()
    }
}

/// Provider URL for an endpoint: the base URL with the API key as last segment.
pub fn endpoint_url(
    endpoint: &NetworkEndpoint,
    api_key: Option<&SecretString>,
) -> BlockchainResult<url::Url> {
    keyed_url(&endpoint.rpc_url, api_key)
}

fn keyed_url(base: &str, api_key: Option<&SecretString>) -> BlockchainResult<url::Url> {
    let base = base.trim_end_matches('/');
    let full = match api_key {
        Some(key) if !key.is_empty() => format!("{}/{}", base, key.expose_secret()),
        _ => base.to_string(),
    };
    // the parse error never echoes the URL, which carries the key
    full.parse::<url::Url>()
        .map_err(|e| BlockchainError::ProviderUnavailable(format!("invalid RPC URL: {}", e)))
}

fn transaction_details(tx: &Transaction) -> TransactionDetails {
    TransactionDetails {
        hash: TransactionResponse::tx_hash(tx),
        from: TransactionResponse::from(tx),
        to: ConsensusTransaction::to(tx),
        value: ConsensusTransaction::value(tx),
        block_number: tx.block_number,
        gas_price: tx
            .effective_gas_price
            .or_else(|| ConsensusTransaction::gas_price(tx)),
        nonce: ConsensusTransaction::nonce(tx),
        gas_limit: ConsensusTransaction::gas_limit(tx),
    }
}

fn receipt_summary(receipt: &TransactionReceipt) -> ReceiptSummary {
    ReceiptSummary {
        success: receipt.status(),
        gas_used: receipt.gas_used,
        block_number: receipt.block_number,
    }
}

fn block_summary(block: &Block) -> BlockSummary {
    let transactions = match block.transactions.as_transactions() {
        Some(txs) => BlockContents::Full(txs.iter().map(transaction_details).collect()),
        None => BlockContents::Hashes(block.transactions.hashes().collect()),
    };

    BlockSummary {
        number: block.header.number,
        hash: block.header.hash,
        parent_hash: block.header.parent_hash,
        timestamp: block.header.timestamp,
        gas_used: block.header.gas_used,
        gas_limit: block.header.gas_limit,
        miner: block.header.beneficiary,
        base_fee_per_gas: block.header.base_fee_per_gas,
        transactions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(rpc_url: &str) -> NetworkEndpoint {
        NetworkEndpoint {
            rpc_url: rpc_url.to_string(),
            nft_url: None,
            chain_id: 31337,
        }
    }

    #[test]
    fn test_endpoint_url_appends_key() {
        let key = SecretString::from("demo");
        let url = endpoint_url(&endpoint("https://eth-sepolia.g.alchemy.com/v2/"), Some(&key)).unwrap();
        assert_eq!(url.as_str(), "https://eth-sepolia.g.alchemy.com/v2/demo");

        let url = endpoint_url(&endpoint("http://localhost:8545"), None).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8545/");
    }

    #[test]
    fn test_invalid_endpoint() {
        let err = endpoint_url(&endpoint("not a url"), None).unwrap_err();
        assert!(matches!(err, BlockchainError::ProviderUnavailable(_)));
    }

    #[tokio::test]
    async fn test_client_creation_is_lazy() {
        let client = BlockchainClient::new(
            NetworkKey::Sepolia,
            &endpoint("http://localhost:8545"),
            &ProviderConfig::default(),
        )
        .unwrap();
        assert_eq!(client.network(), NetworkKey::Sepolia);
        assert_eq!(client.chain_id(), 31337);
        assert!(!format!("{:?}", client).contains("localhost"));
    }

    #[test]
    fn test_errors_are_redacted() {
        let config = ProviderConfig {
            api_key: Some(SecretString::from("k3y")),
            ..ProviderConfig::default()
        };
        let client = BlockchainClient::new(NetworkKey::Mainnet, &endpoint("http://localhost:8545"), &config).unwrap();
        assert_eq!(
            client.redact("error sending request for url (http://localhost:8545/k3y)".to_string()),
            "error sending request for url (http://localhost:8545/***)"
        );
    }

    #[test]
    fn test_nft_resource_url() {
        let config = ProviderConfig {
            api_key: Some(SecretString::from("demo")),
            ..ProviderConfig::default()
        };
        let endpoint = NetworkEndpoint {
            nft_url: Some("https://eth-mainnet.g.alchemy.com/nft/v3/".to_string()),
            ..endpoint("https://eth-mainnet.g.alchemy.com/v2")
        };
        let client = BlockchainClient::new(NetworkKey::Mainnet, &endpoint, &config).unwrap();
        assert_eq!(
            client.nft_resource_url(NFTS_FOR_OWNER_PATH).unwrap().as_str(),
            "https://eth-mainnet.g.alchemy.com/nft/v3/demo/getNFTsForOwner"
        );
    }

    #[tokio::test]
    async fn test_nft_reads_need_an_nft_api() {
        let client =
            BlockchainClient::new(NetworkKey::Goerli, &endpoint("http://localhost:8545"), &ProviderConfig::default())
                .unwrap();
        let err = client.get_nft_metadata(Address::ZERO, "1").await.unwrap_err();
        assert!(matches!(err, BlockchainError::ProviderUnavailable(_)));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_unavailable() {
        let config = ProviderConfig {
            rpc_timeout_secs: 2,
            ..ProviderConfig::default()
        };
        // nothing listens on port 1
        let client =
            BlockchainClient::new(NetworkKey::Sepolia, &endpoint("http://127.0.0.1:1"), &config).unwrap();
        let err = client.get_block_number().await.unwrap_err();
        assert!(matches!(err, BlockchainError::ProviderUnavailable(_)));
    }
}
