//! Transfer aggregation across directions and categories.
//!
//! Both directional queries run concurrently, their results are concatenated
//! in a fixed order, deduplicated by hash (first occurrence wins), ordered by
//! block number descending and, in the category lookup, truncated.

use alloy::primitives::{Address, TxHash};
use std::collections::HashSet;
use std::sync::Arc;

use crate::blockchain::client::ChainProvider;
use crate::blockchain::types::BlockchainResult;
use crate::config::TransferConfig;
use crate::transfers::types::{HistoryFilter, TransferCategory, TransferQuery, TransferRecord};

pub struct TransferAggregator {
    provider: Arc<dyn ChainProvider>,
    config: TransferConfig,
}

impl TransferAggregator {
    pub fn new(provider: Arc<dyn ChainProvider>, config: TransferConfig) -> Self {
        Self { provider, config }
    }

    /// Transfers of one category involving `address`, newest first, capped at
    /// `max_results`.
    ///
    /// Incoming results precede outgoing ones before deduplication.
    pub async fn lookup(
        &self,
        address: Address,
        category: TransferCategory,
    ) -> BlockchainResult<Vec<TransferRecord>> {
        let network = self.provider.network();
        let category = if category == TransferCategory::Internal && !network.supports_internal_transfers() {
            tracing::debug!(network = %network, "Internal transfers unsupported, using external");
            TransferCategory::External
        } else {
            category
        };

        let page_size = self.config.page_size;
        let incoming = TransferQuery::received_by(address, vec![category], page_size);
        let outgoing = TransferQuery::sent_by(address, vec![category], page_size);

        let (incoming, outgoing) = tokio::try_join!(self.fetch(&incoming), self.fetch(&outgoing))?;

        let mut records = merge([incoming, outgoing]);
        sort_by_block_desc(&mut records);
        // after sorting, never before
        records.truncate(self.config.max_results);

        tracing::debug!(
            network = %network,
            address = %address,
            category = %category,
            count = records.len(),
            "Transfer lookup"
        );
        Ok(records)
    }

    /// Every category involving `address` in the selected directions,
    /// newest first. Not truncated.
    ///
    /// Sent results precede received ones before deduplication.
    pub async fn history(
        &self,
        address: Address,
        filter: HistoryFilter,
    ) -> BlockchainResult<Vec<TransferRecord>> {
        let network = self.provider.network();
        let categories: Vec<TransferCategory> = TransferCategory::ALL
            .into_iter()
            .filter(|c| *c != TransferCategory::Internal || network.supports_internal_transfers())
            .collect();
        let page_size = self.config.overview_page_size;

        let sent = async {
            if filter.includes_sent() {
                self.fetch(&TransferQuery::sent_by(address, categories.clone(), page_size).with_metadata())
                    .await
            } else {
                Ok(Vec::new())
            }
        };
        let received = async {
            if filter.includes_received() {
                self.fetch(&TransferQuery::received_by(address, categories.clone(), page_size).with_metadata())
                    .await
            } else {
                Ok(Vec::new())
            }
        };

        let (sent, received) = tokio::try_join!(sent, received)?;
        let mut records = merge([sent, received]);
        sort_by_block_desc(&mut records);

        tracing::debug!(network = %network, address = %address, count = records.len(), "Transfer history");
        Ok(records)
    }

    async fn fetch(&self, query: &TransferQuery) -> BlockchainResult<Vec<TransferRecord>> {
        let direction = query.direction();
        self.provider
            .get_asset_transfers(query)
            .await?
            .into_iter()
            .map(|raw| TransferRecord::from_raw(raw, Some(direction)))
            .collect()
    }
}

/// Concatenate batches in order and drop repeated hashes.
pub fn merge<I>(batches: I) -> Vec<TransferRecord>
where
    I: IntoIterator<Item = Vec<TransferRecord>>,
{
    dedup_by_hash(batches.into_iter().flatten().collect())
}

/// Keep the first record of every hash, preserving order.
pub fn dedup_by_hash(records: Vec<TransferRecord>) -> Vec<TransferRecord> {
    let mut seen: HashSet<TxHash> = HashSet::with_capacity(records.len());
    records.into_iter().filter(|r| seen.insert(r.hash)).collect()
}

/// Numeric descending; ties keep their merge order.
pub fn sort_by_block_desc(records: &mut [TransferRecord]) {
    records.sort_by(|a, b| b.block_number.cmp(&a.block_number));
}
