//! Block reads: the latest N blocks and a single block with its transactions.

use futures_util::future::try_join_all;
use std::sync::Arc;

use crate::blockchain::client::ChainProvider;
use crate::blockchain::types::{BlockSummary, BlockchainError, BlockchainResult};

/// Recent blocks together with the head they were read against.
#[derive(Debug, Clone)]
pub struct LatestBlocks {
    pub head: u64,
    /// Newest first. Blocks the provider did not return are omitted.
    pub blocks: Vec<BlockSummary>,
}

pub struct BlockReader {
    provider: Arc<dyn ChainProvider>,
}

impl BlockReader {
    pub fn new(provider: Arc<dyn ChainProvider>) -> Self {
        Self { provider }
    }

    /// Blocks `head, head - 1, …` down to `count` entries, fetched concurrently.
    pub async fn latest(&self, count: u64, full_transactions: bool) -> BlockchainResult<LatestBlocks> {
        let head = self.provider.get_block_number().await?;
        let numbers: Vec<u64> = (0..count).filter_map(|offset| head.checked_sub(offset)).collect();

        let fetched = try_join_all(
            numbers
                .iter()
                .map(|&number| self.provider.get_block(number, full_transactions)),
        )
        .await?;

        let blocks: Vec<BlockSummary> = fetched.into_iter().flatten().collect();
        tracing::debug!(
            network = %self.provider.network(),
            head,
            fetched = blocks.len(),
            "Latest blocks"
        );

        Ok(LatestBlocks { head, blocks })
    }

    pub async fn with_transactions(&self, number: u64) -> BlockchainResult<BlockSummary> {
        self.provider
            .get_block(number, true)
            .await?
            .ok_or_else(|| BlockchainError::NotFound("Block not found".to_string()))
    }
}
