//! Network keys, error definitions and the typed chain values every consumer
//! pattern-matches on.

use alloy::primitives::{Address, BlockHash, TxHash, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Guidance returned when the sender cannot cover value plus gas.
pub const INSUFFICIENT_FUNDS_HINT: &str =
    "Insufficient funds for transaction + gas. Get testnet ETH from a faucet.";

/// Guidance returned when the provider rejects the key material.
pub const INVALID_KEY_HINT: &str =
    "Invalid private key format. Make sure it's 64 hex characters (with or without 0x prefix).";

/// Guidance returned on nonce conflicts.
pub const NONCE_HINT: &str = "Nonce error - try again in a few seconds";

/// Symbolic selector for the chain environment a call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkKey {
    Mainnet,
    Sepolia,
    Goerli,
}

impl NetworkKey {
    /// Test network used when a key is not recognized.
    pub const FALLBACK: NetworkKey = NetworkKey::Sepolia;

    /// Network used by read paths when the caller names none.
    pub const READ_DEFAULT: NetworkKey = NetworkKey::Mainnet;

    pub const ALL: [NetworkKey; 3] = [NetworkKey::Mainnet, NetworkKey::Sepolia, NetworkKey::Goerli];

    /// Resolve a symbolic key. Unknown keys fall back to [`NetworkKey::FALLBACK`].
    pub fn resolve(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "mainnet" => NetworkKey::Mainnet,
            "sepolia" => NetworkKey::Sepolia,
            "goerli" => NetworkKey::Goerli,
            other => {
                tracing::debug!(requested = %other, fallback = %Self::FALLBACK, "Unknown network key");
                Self::FALLBACK
            }
        }
    }

    /// Resolve an optional request parameter, defaulting to the main network when absent.
    pub fn from_param(key: Option<&str>) -> Self {
        match key {
            Some(k) if !k.trim().is_empty() => Self::resolve(k),
            _ => Self::READ_DEFAULT,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkKey::Mainnet => "mainnet",
            NetworkKey::Sepolia => "sepolia",
            NetworkKey::Goerli => "goerli",
        }
    }

    /// Whether the transfer index of this network classifies internal transfers.
    pub fn supports_internal_transfers(&self) -> bool {
        matches!(self, NetworkKey::Mainnet)
    }
}

impl fmt::Display for NetworkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// Amount is not a plain non-negative decimal.
    #[error("Invalid amount format: {0}")]
    InvalidAmountFormat(String),

    /// Address is not `0x` followed by 40 hex characters.
    #[error("Invalid address format: {0}")]
    InvalidAddressFormat(String),

    /// Signing key is not 32 raw bytes.
    #[error("{}", INVALID_KEY_HINT)]
    InvalidKeyFormat,

    /// Lookup hash is not a 32-byte hex string.
    #[error("Invalid transaction hash format: {0}")]
    InvalidHashFormat(String),

    /// Block selector is not a non-negative integer.
    #[error("Invalid block number: {0}")]
    InvalidBlockNumber(String),

    /// Token id is neither decimal nor `0x`-hex.
    #[error("Invalid token id: {0}")]
    InvalidTokenId(String),

    /// Request body is not valid JSON of the expected shape.
    #[error("Invalid request body: {0}")]
    InvalidRequestBody(String),

    /// Required request inputs were absent.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// Unknown hash or block.
    #[error("{0}")]
    NotFound(String),

    /// A fully populated request could not be signed locally.
    #[error("Transaction could not be signed: {0}")]
    SigningFailed(String),

    /// Provider refused the broadcast.
    #[error("Rejected by network: {0}")]
    RejectedByNetwork(String),

    /// Transport-level failure of a provider call.
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Provider answered with a payload that does not fit the typed model.
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    /// A caller-supplied bound elapsed.
    #[error("Timed out after {0} seconds")]
    Timeout(u64),
}

impl BlockchainError {
    /// Message suitable for showing to the person who issued the request.
    pub fn user_message(&self) -> String {
        match self {
            BlockchainError::RejectedByNetwork(reason) => normalize_rejection(reason),
            other => other.to_string(),
        }
    }
}

/// Rewrite known provider rejection texts into actionable guidance.
///
/// Unmatched messages pass through verbatim.
pub fn normalize_rejection(reason: &str) -> String {
    let lowered = reason.to_ascii_lowercase();
    if lowered.contains("insufficient funds") {
        INSUFFICIENT_FUNDS_HINT.to_string()
    } else if lowered.contains("invalid private key") || lowered.contains("invalid arrayify") {
        INVALID_KEY_HINT.to_string()
    } else if lowered.contains("nonce") {
        NONCE_HINT.to_string()
    } else {
        reason.to_string()
    }
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Tri-state transaction status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Pending,
    Success,
    Failed,
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxStatus::Pending => f.write_str("pending"),
            TxStatus::Success => f.write_str("success"),
            TxStatus::Failed => f.write_str("failed"),
        }
    }
}

/// A transaction as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDetails {
    pub hash: TxHash,
    pub from: Address,
    /// `None` for contract creation.
    pub to: Option<Address>,
    pub value: U256,
    /// Unset while the transaction waits in the mempool.
    pub block_number: Option<u64>,
    pub gas_price: Option<u128>,
    pub nonce: u64,
    pub gas_limit: u64,
}

/// Post-execution record of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptSummary {
    /// Receipt status code 1.
    pub success: bool,
    pub gas_used: u64,
    pub block_number: Option<u64>,
}

impl ReceiptSummary {
    pub fn status(&self) -> TxStatus {
        if self.success {
            TxStatus::Success
        } else {
            TxStatus::Failed
        }
    }
}

/// Transactions carried by a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockContents {
    Hashes(Vec<TxHash>),
    Full(Vec<TransactionDetails>),
}

impl BlockContents {
    pub fn len(&self) -> usize {
        match self {
            BlockContents::Hashes(hashes) => hashes.len(),
            BlockContents::Full(txs) => txs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A block header plus its transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSummary {
    pub number: u64,
    pub hash: BlockHash,
    pub parent_hash: BlockHash,
    /// Unix seconds.
    pub timestamp: u64,
    pub gas_used: u64,
    pub gas_limit: u64,
    pub miner: Address,
    pub base_fee_per_gas: Option<u64>,
    pub transactions: BlockContents,
}
