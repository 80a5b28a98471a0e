//! Transaction building, signing, broadcast and status derivation.
//!
//! # Responsibilities
//! - Validate a transfer request before any provider call
//! - Sign and broadcast a native value transfer
//! - Suspend until inclusion (the caller bounds the wait)
//! - Derive a read-only status snapshot for an arbitrary hash
//!
//! # Stages
//! ```text
//! Building → Signed → Broadcast → Pending → { Success | Failed }
//! ```

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, TxHash};
use alloy::rpc::types::TransactionRequest;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::amount::Amount;
use crate::blockchain::client::ChainProvider;
use crate::blockchain::types::{BlockchainError, BlockchainResult, NetworkKey, TxStatus};
use crate::blockchain::wallet::Wallet;
use crate::observability::metrics;
use crate::secret::SecretString;

/// Gas consumed by a plain value transfer.
pub const TRANSFER_GAS: u64 = 21_000;

/// Validated outbound transfer.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub recipient: Address,
    pub amount: Amount,
    /// Always `0x`-prefixed.
    signing_key: SecretString,
    pub network: NetworkKey,
}

impl TransferRequest {
    /// Validate and normalize the inputs of a send.
    pub fn new(recipient: &str, amount: &str, signing_key: &str, network: &str) -> BlockchainResult<Self> {
        let recipient = parse_address(recipient)?;
        let amount = Amount::parse_native(amount)?;

        let key = signing_key.trim();
        let signing_key = if key.starts_with("0x") {
            SecretString::new(key.to_string())
        } else {
            SecretString::new(format!("0x{}", key))
        };

        Ok(Self {
            recipient,
            amount,
            signing_key,
            network: NetworkKey::resolve(network),
        })
    }

    pub fn signing_key(&self) -> &SecretString {
        &self.signing_key
    }
}

/// Addresses must be `0x` followed by exactly 40 hex characters.
pub fn parse_address(input: &str) -> BlockchainResult<Address> {
    let trimmed = input.trim();
    let well_formed = trimmed.len() == 42
        && trimmed.starts_with("0x")
        && trimmed[2..].bytes().all(|b| b.is_ascii_hexdigit());
    if !well_formed {
        return Err(BlockchainError::InvalidAddressFormat(input.to_string()));
    }
    Address::from_str(trimmed).map_err(|_| BlockchainError::InvalidAddressFormat(input.to_string()))
}

/// Parse a 32-byte transaction hash.
pub fn parse_tx_hash(input: &str) -> BlockchainResult<TxHash> {
    let trimmed = input.trim();
    if trimmed.len() != 66 || !trimmed.starts_with("0x") {
        return Err(BlockchainError::InvalidHashFormat(input.to_string()));
    }
    TxHash::from_str(trimmed).map_err(|_| BlockchainError::InvalidHashFormat(input.to_string()))
}

/// Pipeline stage of an outbound transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStage {
    Building,
    Signed,
    Broadcast,
    Pending,
    Success,
    Failed,
}

impl TransferStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStage::Building => "building",
            TransferStage::Signed => "signed",
            TransferStage::Broadcast => "broadcast",
            TransferStage::Pending => "pending",
            TransferStage::Success => "success",
            TransferStage::Failed => "failed",
        }
    }
}

impl fmt::Display for TransferStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A broadcast transfer awaiting inclusion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransfer {
    pub hash: TxHash,
    pub from: Address,
    pub to: Address,
    pub amount: Amount,
    pub network: NetworkKey,
}

/// A transfer whose receipt has been observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettledTransfer {
    pub pending: PendingTransfer,
    /// Never `Pending`.
    pub status: TxStatus,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

/// Snapshot of a transaction at read time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub hash: TxHash,
    pub status: TxStatus,
    pub block_number: Option<u64>,
    pub from: Address,
    /// `None` for contract creation.
    pub to: Option<Address>,
    pub value: Amount,
    pub gas_used: Option<u64>,
    /// Wei.
    pub gas_price: Option<u128>,
    /// Unix seconds of the including block.
    pub timestamp: Option<u64>,
    pub confirmations: u64,
    pub network: NetworkKey,
}

/// Send pipeline and status lookup over one network handle.
pub struct TransactionPipeline {
    provider: Arc<dyn ChainProvider>,
    /// Fixed limit; `None` estimates every transfer.
    gas_limit: Option<u64>,
}

impl TransactionPipeline {
    pub fn new(provider: Arc<dyn ChainProvider>, gas_limit: Option<u64>) -> Self {
        Self { provider, gas_limit }
    }

    fn stage(&self, stage: TransferStage, hash: Option<TxHash>) {
        let network = self.provider.network();
        match hash {
            Some(tx_hash) => tracing::info!(network = %network, stage = %stage, tx_hash = %tx_hash, "Transfer stage"),
            None => tracing::debug!(network = %network, stage = %stage, "Transfer stage"),
        }
        metrics::record_transfer_stage(network.as_str(), stage.as_str());
    }

    /// Sign and broadcast. Returns as soon as the provider accepts the payload.
    pub async fn submit(&self, request: &TransferRequest) -> BlockchainResult<PendingTransfer> {
        self.stage(TransferStage::Building, None);
        let wallet = Wallet::from_private_key(request.signing_key(), self.provider.chain_id())?;
        let from = wallet.address();

        let transfer = TransactionRequest::default()
            .with_from(from)
            .with_to(request.recipient)
            .with_value(request.amount.base_units());

        let gas_limit = async {
            match self.gas_limit {
                Some(limit) => Ok(limit),
                None => self.provider.estimate_gas(&transfer).await,
            }
        };
        let (nonce, gas_price, gas_limit) = tokio::try_join!(
            self.provider.get_transaction_count(from),
            self.provider.get_gas_price(),
            gas_limit,
        )?;
        tracing::debug!(network = %request.network, nonce, gas_price, gas_limit, "Transfer priced");

        let tx = transfer
            .with_nonce(nonce)
            .with_gas_price(gas_price)
            .with_gas_limit(gas_limit);

        let signed = wallet.sign_transaction(tx).await?;
        self.stage(TransferStage::Signed, Some(signed.hash));

        tracing::info!(
            network = %request.network,
            from = %from,
            to = %request.recipient,
            amount = %request.amount,
            "Broadcasting transfer"
        );
        let hash = self.provider.submit_signed_transaction(signed.raw).await?;
        self.stage(TransferStage::Broadcast, Some(hash));
        if hash != signed.hash {
            tracing::warn!(expected = %signed.hash, reported = %hash, "Provider reported a different hash");
        }

        self.stage(TransferStage::Pending, Some(hash));
        Ok(PendingTransfer {
            hash,
            from,
            to: request.recipient,
            amount: request.amount,
            network: request.network,
        })
    }

    /// Suspend until the transfer is included. No internal bound.
    pub async fn wait(&self, pending: PendingTransfer) -> BlockchainResult<SettledTransfer> {
        let receipt = self.provider.wait_for_receipt(pending.hash).await?;
        let status = receipt.status();
        self.stage(
            if receipt.success { TransferStage::Success } else { TransferStage::Failed },
            Some(pending.hash),
        );

        Ok(SettledTransfer {
            pending,
            status,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        })
    }

    /// Submit then wait.
    pub async fn send(&self, request: &TransferRequest) -> BlockchainResult<SettledTransfer> {
        let pending = self.submit(request).await?;
        self.wait(pending).await
    }

    /// Read-only status snapshot for `hash`.
    pub async fn lookup(&self, hash: TxHash) -> BlockchainResult<TransactionRecord> {
        let (tx, receipt) = tokio::try_join!(
            self.provider.get_transaction(hash),
            self.provider.get_transaction_receipt(hash),
        )?;

        let tx = tx.ok_or_else(|| {
            BlockchainError::NotFound(
                "Transaction not found. Make sure you selected the correct network.".to_string(),
            )
        })?;

        let (timestamp, confirmations) = match tx.block_number {
            Some(block_number) => {
                let (block, head) = tokio::try_join!(
                    self.provider.get_block(block_number, false),
                    self.provider.get_block_number(),
                )?;
                (block.map(|b| b.timestamp), confirmations(head, block_number))
            }
            None => (None, 0),
        };

        Ok(TransactionRecord {
            hash: tx.hash,
            status: receipt.map(|r| r.status()).unwrap_or(TxStatus::Pending),
            block_number: tx.block_number,
            from: tx.from,
            to: tx.to,
            value: Amount::native(tx.value),
            gas_used: receipt.map(|r| r.gas_used),
            gas_price: tx.gas_price,
            timestamp,
            confirmations,
            network: self.provider.network(),
        })
    }
}

/// Blocks on top of and including `tx_block`.
///
/// A head behind the transaction's block (a lagging provider node) yields 0.
pub fn confirmations(head: u64, tx_block: u64) -> u64 {
    (head + 1).saturating_sub(tx_block)
}
