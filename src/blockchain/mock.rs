//! In-memory chain provider.
//!
//! Serves canned chain state and records every request so tests can assert on
//! what reached the provider (and what never did).

use alloy::consensus::{Transaction as _, TxEnvelope};
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{keccak256, Address, Bytes, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::blockchain::client::ChainProvider;
use crate::blockchain::factory::ProviderFactory;
use crate::blockchain::transaction::TRANSFER_GAS;
use crate::blockchain::types::{
    BlockContents, BlockSummary, BlockchainError, BlockchainResult, NetworkKey,
    ReceiptSummary, TransactionDetails,
};
use crate::nft::types::{NftOwnerQuery, OwnedNftsPage, RawNft, RawNftContract};
use crate::transfers::types::{RawContract, RawTransfer, TransferQuery};

/// What happens to a broadcast transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inclusion {
    /// Mined into `head + 1` with status 1, unless the signed gas limit is
    /// below the gas the transfer needs.
    Success,
    /// Mined into `head + 1` with status 0.
    Reverted,
    /// Never mined; waiting suspends forever.
    Never,
}

/// Requests observed by a [`MockChainProvider`].
#[derive(Debug, Default, Clone)]
pub struct Recorded {
    /// Total provider calls of any kind.
    pub calls: usize,
    pub transfer_queries: Vec<TransferQuery>,
    pub nft_queries: Vec<NftOwnerQuery>,
    pub gas_estimates: Vec<TransactionRequest>,
    pub submitted: Vec<Bytes>,
}

/// Scriptable [`ChainProvider`].
#[derive(Debug)]
pub struct MockChainProvider {
    network: NetworkKey,
    chain_id: u64,
    head: u64,
    gas_price: u128,
    gas_required: u64,
    nonce: u64,
    balances: HashMap<Address, U256>,
    contracts: HashSet<Address>,
    blocks: HashMap<u64, BlockSummary>,
    transactions: HashMap<TxHash, TransactionDetails>,
    receipts: HashMap<TxHash, ReceiptSummary>,
    incoming: Vec<RawTransfer>,
    outgoing: Vec<RawTransfer>,
    nfts: HashMap<Address, Vec<RawNft>>,
    rejection: Option<String>,
    unavailable: bool,
    inclusion: Inclusion,
    recorded: Mutex<Recorded>,
}

impl MockChainProvider {
    pub fn new(network: NetworkKey) -> Self {
        let chain_id = match network {
            NetworkKey::Mainnet => 1,
            NetworkKey::Sepolia => 11_155_111,
            NetworkKey::Goerli => 5,
        };
        Self {
            network,
            chain_id,
            head: 0,
            gas_price: 1_000_000_000,
            gas_required: TRANSFER_GAS,
            nonce: 0,
            balances: HashMap::new(),
            contracts: HashSet::new(),
            blocks: HashMap::new(),
            transactions: HashMap::new(),
            receipts: HashMap::new(),
            incoming: Vec::new(),
            outgoing: Vec::new(),
            nfts: HashMap::new(),
            rejection: None,
            unavailable: false,
            inclusion: Inclusion::Success,
            recorded: Mutex::new(Recorded::default()),
        }
    }

    pub fn with_head(mut self, head: u64) -> Self {
        self.head = head;
        self
    }

    pub fn with_gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = gas_price;
        self
    }

    /// Gas a transfer consumes, and what estimation reports.
    pub fn with_gas_required(mut self, gas: u64) -> Self {
        self.gas_required = gas;
        self
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    pub fn with_balance(mut self, address: Address, balance: U256) -> Self {
        self.balances.insert(address, balance);
        self
    }

    pub fn with_contract(mut self, address: Address) -> Self {
        self.contracts.insert(address);
        self
    }

    pub fn with_block(mut self, block: BlockSummary) -> Self {
        self.blocks.insert(block.number, block);
        self
    }

    pub fn with_transaction(mut self, tx: TransactionDetails) -> Self {
        self.transactions.insert(tx.hash, tx);
        self
    }

    pub fn with_receipt(mut self, hash: TxHash, receipt: ReceiptSummary) -> Self {
        self.receipts.insert(hash, receipt);
        self
    }

    /// Transfers returned for recipient-side queries.
    pub fn with_incoming(mut self, transfers: Vec<RawTransfer>) -> Self {
        self.incoming = transfers;
        self
    }

    /// Transfers returned for sender-side queries.
    pub fn with_outgoing(mut self, transfers: Vec<RawTransfer>) -> Self {
        self.outgoing = transfers;
        self
    }

    /// Tokens held by `owner`, in enumeration order.
    pub fn with_nfts(mut self, owner: Address, nfts: Vec<RawNft>) -> Self {
        self.nfts.insert(owner, nfts);
        self
    }

    /// Reject every broadcast with `reason`.
    pub fn rejecting(mut self, reason: impl Into<String>) -> Self {
        self.rejection = Some(reason.into());
        self
    }

    /// Fail every call at the transport level.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    pub fn with_inclusion(mut self, inclusion: Inclusion) -> Self {
        self.inclusion = inclusion;
        self
    }

    /// Snapshot of the requests seen so far.
    pub fn recorded(&self) -> Recorded {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Gas limit of a broadcast payload, if it decodes.
    fn submitted_gas_limit(&self, hash: TxHash) -> Option<u64> {
        let recorded = self.lock();
        let payload = recorded.submitted.iter().find(|p| keccak256(p) == hash)?;
        let envelope = TxEnvelope::decode_2718(&mut &payload[..]).ok()?;
        Some(envelope.gas_limit())
    }

    fn enter(&self) -> BlockchainResult<()> {
        self.lock().calls += 1;
        if self.unavailable {
            return Err(BlockchainError::ProviderUnavailable(format!(
                "{} provider offline",
                self.network
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainProvider for MockChainProvider {
    fn network(&self) -> NetworkKey {
        self.network
    }

    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn get_balance(&self, address: Address) -> BlockchainResult<U256> {
        self.enter()?;
        Ok(self.balances.get(&address).copied().unwrap_or(U256::ZERO))
    }

    async fn is_contract_address(&self, address: Address) -> BlockchainResult<bool> {
        self.enter()?;
        Ok(self.contracts.contains(&address))
    }

    async fn get_block_number(&self) -> BlockchainResult<u64> {
        self.enter()?;
        Ok(self.head)
    }

    async fn get_block(&self, number: u64, full_transactions: bool) -> BlockchainResult<Option<BlockSummary>> {
        self.enter()?;
        Ok(self.blocks.get(&number).cloned().map(|mut summary| {
            if !full_transactions {
                if let BlockContents::Full(txs) = &summary.transactions {
                    summary.transactions = BlockContents::Hashes(txs.iter().map(|tx| tx.hash).collect());
                }
            }
            summary
        }))
    }

    async fn get_transaction(&self, hash: TxHash) -> BlockchainResult<Option<TransactionDetails>> {
        self.enter()?;
        Ok(self.transactions.get(&hash).cloned())
    }

    async fn get_transaction_receipt(&self, hash: TxHash) -> BlockchainResult<Option<ReceiptSummary>> {
        self.enter()?;
        Ok(self.receipts.get(&hash).copied())
    }

    async fn get_transaction_count(&self, _address: Address) -> BlockchainResult<u64> {
        self.enter()?;
        Ok(self.nonce)
    }

    async fn get_gas_price(&self) -> BlockchainResult<u128> {
        self.enter()?;
        Ok(self.gas_price)
    }

    async fn estimate_gas(&self, request: &TransactionRequest) -> BlockchainResult<u64> {
        self.enter()?;
        self.lock().gas_estimates.push(request.clone());
        Ok(self.gas_required)
    }

    async fn get_asset_transfers(&self, query: &TransferQuery) -> BlockchainResult<Vec<RawTransfer>> {
        self.enter()?;
        self.lock().transfer_queries.push(query.clone());

        let source = if query.to_address.is_some() { &self.incoming } else { &self.outgoing };
        Ok(source
            .iter()
            .filter(|t| {
                // unparseable categories pass through so typing errors surface downstream
                t.category
                    .parse()
                    .map(|category| query.category.contains(&category))
                    .unwrap_or(true)
            })
            .take(query.max_count as usize)
            .cloned()
            .collect())
    }

    async fn get_nfts_for_owner(&self, query: &NftOwnerQuery) -> BlockchainResult<OwnedNftsPage> {
        self.enter()?;
        self.lock().nft_queries.push(query.clone());

        let held = self.nfts.get(&query.owner).map(Vec::as_slice).unwrap_or_default();
        Ok(OwnedNftsPage {
            owned_nfts: held.iter().take(query.page_size as usize).cloned().collect(),
            total_count: held.len() as u64,
        })
    }

    async fn get_nft_metadata(&self, contract: Address, token_id: &str) -> BlockchainResult<RawNft> {
        self.enter()?;
        self.nfts
            .values()
            .flatten()
            .find(|nft| {
                nft.token_id == token_id && nft.contract.address.parse::<Address>().ok() == Some(contract)
            })
            .cloned()
            .ok_or_else(|| BlockchainError::NotFound("NFT not found".to_string()))
    }

    async fn submit_signed_transaction(&self, payload: Bytes) -> BlockchainResult<TxHash> {
        self.enter()?;
        if let Some(reason) = &self.rejection {
            return Err(BlockchainError::RejectedByNetwork(reason.clone()));
        }
        let hash = keccak256(&payload);
        self.lock().submitted.push(payload);
        Ok(hash)
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> BlockchainResult<ReceiptSummary> {
        self.enter()?;
        if let Some(receipt) = self.receipts.get(&hash) {
            return Ok(*receipt);
        }
        let mined = |success, gas_used| ReceiptSummary {
            success,
            gas_used,
            block_number: Some(self.head + 1),
        };
        match self.inclusion {
            Inclusion::Success => match self.submitted_gas_limit(hash) {
                // out of gas: the whole limit is consumed
                Some(limit) if limit < self.gas_required => Ok(mined(false, limit)),
                _ => Ok(mined(true, self.gas_required)),
            },
            Inclusion::Reverted => Ok(mined(false, self.gas_required)),
            Inclusion::Never => std::future::pending().await,
        }
    }
}

/// [`ProviderFactory`] serving one [`MockChainProvider`] per network.
#[derive(Debug, Default)]
pub struct MockProviderFactory {
    providers: HashMap<NetworkKey, Arc<MockChainProvider>>,
    requested: Mutex<Vec<NetworkKey>>,
}

impl MockProviderFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, provider: MockChainProvider) -> Self {
        self.providers.insert(provider.network(), Arc::new(provider));
        self
    }

    pub fn provider(&self, network: NetworkKey) -> Option<Arc<MockChainProvider>> {
        self.providers.get(&network).cloned()
    }

    /// Networks handed out so far, in request order.
    pub fn requested(&self) -> Vec<NetworkKey> {
        self.requested
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl ProviderFactory for MockProviderFactory {
    fn connect(&self, network: NetworkKey) -> BlockchainResult<Arc<dyn ChainProvider>> {
        self.requested
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(network);
        let provider = self.providers.get(&network).cloned().ok_or_else(|| {
            BlockchainError::ProviderUnavailable(format!("no provider configured for {}", network))
        })?;
        let handle: Arc<dyn ChainProvider> = provider;
        Ok(handle)
    }
}

/// Provider-shaped transfer with a hash made of `hash_byte` repeated.
pub fn raw_transfer(hash_byte: u8, block_num: &str, category: &str, from: Address, to: Option<Address>) -> RawTransfer {
    RawTransfer {
        block_num: block_num.to_string(),
        hash: format!("0x{}", format!("{:02x}", hash_byte).repeat(32)),
        from: from.to_string(),
        to: to.map(|a| a.to_string()),
        asset: Some("ETH".to_string()),
        category: category.to_string(),
        raw_contract: RawContract {
            value: Some("0xde0b6b3a7640000".to_string()),
            address: None,
            decimal: Some("0x12".to_string()),
        },
        token_id: None,
        metadata: None,
    }
}

/// Provider-shaped ERC-721 token of `contract`.
pub fn raw_nft(contract: Address, token_id: &str, name: Option<&str>) -> RawNft {
    RawNft {
        contract: RawNftContract {
            address: contract.to_string(),
            name: None,
        },
        token_id: token_id.to_string(),
        token_type: Some("ERC721".to_string()),
        name: name.map(str::to_string),
        ..RawNft::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_submit_hashes_payload() {
        let provider = MockChainProvider::new(NetworkKey::Sepolia);
        let payload = Bytes::from_static(b"signed");
        let hash = provider.submit_signed_transaction(payload.clone()).await.unwrap();
        assert_eq!(hash, keccak256(&payload));
        assert_eq!(provider.recorded().submitted, vec![payload]);
    }

    #[tokio::test]
    async fn test_unavailable_fails_every_call() {
        let provider = MockChainProvider::new(NetworkKey::Mainnet).unavailable();
        assert!(matches!(
            provider.get_block_number().await,
            Err(BlockchainError::ProviderUnavailable(_))
        ));
        assert_eq!(provider.recorded().calls, 1);
    }

    #[test]
    fn test_factory_without_provider() {
        let factory = MockProviderFactory::new();
        assert!(factory.connect(NetworkKey::Goerli).is_err());
        assert_eq!(factory.requested(), vec![NetworkKey::Goerli]);
    }
}
