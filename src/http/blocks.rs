//! Block handlers.

use alloy::primitives::{Address, BlockHash, TxHash, U256};
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::blockchain::blocks::BlockReader;
use crate::blockchain::types::{
    BlockContents, BlockSummary, BlockchainError, BlockchainResult, NetworkKey, TransactionDetails,
};
use crate::http::server::AppState;
use crate::transfers::types::shorten_address;

#[derive(Debug, Deserialize)]
pub struct BlocksQuery {
    pub network: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDetailQuery {
    pub block_number: Option<String>,
    pub network: Option<String>,
}

/// Row of the latest-blocks list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockListEntry {
    pub number: u64,
    pub hash: BlockHash,
    pub timestamp: u64,
    pub transactions: usize,
    pub gas_used: String,
    pub gas_limit: String,
    pub miner: Address,
    pub base_fee_per_gas: String,
}

impl From<&BlockSummary> for BlockListEntry {
    fn from(block: &BlockSummary) -> Self {
        Self {
            number: block.number,
            hash: block.hash,
            timestamp: block.timestamp,
            transactions: block.transactions.len(),
            gas_used: block.gas_used.to_string(),
            gas_limit: block.gas_limit.to_string(),
            miner: block.miner,
            base_fee_per_gas: block
                .base_fee_per_gas
                .map(|fee| Amount::native(U256::from(fee)).to_decimal_string())
                .unwrap_or_else(|| "N/A".to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockTransactionView {
    pub hash: TxHash,
    pub from: Address,
    pub to: Option<Address>,
    pub value: String,
    pub gas_limit: String,
    pub nonce: u64,
    pub formatted_from: String,
    pub formatted_to: Option<String>,
}

impl From<&TransactionDetails> for BlockTransactionView {
    fn from(tx: &TransactionDetails) -> Self {
        Self {
            hash: tx.hash,
            from: tx.from,
            to: tx.to,
            value: Amount::native(tx.value).to_decimal_string(),
            gas_limit: tx.gas_limit.to_string(),
            nonce: tx.nonce,
            formatted_from: shorten_address(&tx.from.to_string()),
            formatted_to: tx.to.map(|to| shorten_address(&to.to_string())),
        }
    }
}

/// A block with its transactions.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDetail {
    pub number: u64,
    pub hash: BlockHash,
    pub parent_hash: BlockHash,
    pub timestamp: u64,
    pub gas_used: String,
    pub gas_limit: String,
    pub transaction_count: usize,
    pub formatted_hash: String,
    pub transactions: Vec<BlockTransactionView>,
}

impl From<&BlockSummary> for BlockDetail {
    fn from(block: &BlockSummary) -> Self {
        let transactions = match &block.transactions {
            BlockContents::Full(txs) => txs.iter().map(BlockTransactionView::from).collect(),
            BlockContents::Hashes(_) => Vec::new(),
        };
        Self {
            number: block.number,
            hash: block.hash,
            parent_hash: block.parent_hash,
            timestamp: block.timestamp,
            gas_used: block.gas_used.to_string(),
            gas_limit: block.gas_limit.to_string(),
            transaction_count: block.transactions.len(),
            formatted_hash: shorten_address(&block.hash.to_string()),
            transactions,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestBlocksView {
    pub block_number: u64,
    pub blocks: Vec<BlockDetail>,
}

/// `GET /api/blocks`
pub async fn get_blocks(
    State(state): State<AppState>,
    Query(query): Query<BlocksQuery>,
) -> BlockchainResult<Json<Vec<BlockListEntry>>> {
    let network = NetworkKey::from_param(query.network.as_deref());
    let reader = BlockReader::new(state.provider(network)?);
    let latest = reader.latest(state.config.transfers.latest_blocks, false).await?;

    Ok(Json(latest.blocks.iter().map(BlockListEntry::from).collect()))
}

/// `GET /api/blocks/with-transactions`
///
/// With `blockNumber` answers that block; without it, the latest blocks.
pub async fn get_blocks_with_transactions(
    State(state): State<AppState>,
    Query(query): Query<BlockDetailQuery>,
) -> BlockchainResult<Response> {
    let network = NetworkKey::from_param(query.network.as_deref());
    let reader = BlockReader::new(state.provider(network)?);

    match query.block_number.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        Some(raw) => {
            let number = raw
                .parse::<u64>()
                .map_err(|_| BlockchainError::InvalidBlockNumber(raw.to_string()))?;
            let block = reader.with_transactions(number).await?;
            Ok(Json(BlockDetail::from(&block)).into_response())
        }
        None => {
            let latest = reader.latest(state.config.transfers.latest_blocks, true).await?;
            Ok(Json(LatestBlocksView {
                block_number: latest.head,
                blocks: latest.blocks.iter().map(BlockDetail::from).collect(),
            })
            .into_response())
        }
    }
}
