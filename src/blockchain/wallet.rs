//! Signer derivation and local transaction signing.
//!
//! # Security
//! - The signing key is accepted per request and dropped with the wallet
//! - Keys are never logged or serialized

use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;

use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::secret::SecretString;

/// Number of hex characters in a raw 32-byte key.
const KEY_HEX_LEN: usize = 64;

/// A signed, encoded transaction ready for broadcast.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    pub hash: TxHash,
    pub raw: Bytes,
}

/// Wallet for transaction signing.
#[derive(Debug, Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
    /// Chain ID for EIP-155 replay protection.
    chain_id: u64,
}

impl Wallet {
    /// Derive a wallet from a hex-encoded private key (with or without 0x prefix).
    pub fn from_private_key(private_key: &SecretString, chain_id: u64) -> BlockchainResult<Self> {
        let exposed = private_key.expose_secret().trim();
        let key_hex = exposed.strip_prefix("0x").unwrap_or(exposed);

        if key_hex.len() != KEY_HEX_LEN || !key_hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(BlockchainError::InvalidKeyFormat);
        }

        // zero or out-of-range scalars fail here
        let signer: PrivateKeySigner = key_hex.parse().map_err(|_| BlockchainError::InvalidKeyFormat)?;

        tracing::debug!(address = %signer.address(), chain_id, "Wallet initialized");

        Ok(Self { signer, chain_id })
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Sign a fully populated request into its EIP-2718 encoding.
    pub async fn sign_transaction(&self, request: TransactionRequest) -> BlockchainResult<SignedTransaction> {
        let request = request.with_from(self.address()).with_chain_id(self.chain_id);
        let envelope = request
            .build(&EthereumWallet::from(self.signer.clone()))
            .await
            .map_err(|e| BlockchainError::SigningFailed(e.to_string()))?;

        Ok(SignedTransaction {
            hash: *envelope.tx_hash(),
            raw: envelope.encoded_2718().into(),
        })
    }
}
