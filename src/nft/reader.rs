//! Owned-token gallery and single-token metadata.

use alloy::primitives::Address;
use std::sync::Arc;

use crate::blockchain::client::ChainProvider;
use crate::blockchain::types::BlockchainResult;
use crate::nft::types::{NftDetailView, NftOwnerQuery, NftView};

/// Tokens held by one address.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedNfts {
    pub nfts: Vec<NftView>,
    /// Tokens held in total, which may exceed one page.
    pub total_count: u64,
}

pub struct NftReader {
    provider: Arc<dyn ChainProvider>,
    page_size: u32,
}

impl NftReader {
    pub fn new(provider: Arc<dyn ChainProvider>, page_size: u32) -> Self {
        Self { provider, page_size }
    }

    /// First page of tokens held by `owner`.
    pub async fn owned(&self, owner: Address) -> BlockchainResult<OwnedNfts> {
        let page = self
            .provider
            .get_nfts_for_owner(&NftOwnerQuery::new(owner, self.page_size))
            .await?;

        tracing::debug!(
            network = %self.provider.network(),
            owner = %owner,
            returned = page.owned_nfts.len(),
            total = page.total_count,
            "NFTs fetched"
        );

        Ok(OwnedNfts {
            nfts: page.owned_nfts.iter().map(NftView::from).collect(),
            total_count: page.total_count,
        })
    }

    pub async fn metadata(&self, contract: Address, token_id: &str) -> BlockchainResult<NftDetailView> {
        let nft = self.provider.get_nft_metadata(contract, token_id).await?;
        Ok(NftDetailView::from(&nft))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::mock::{raw_nft, MockChainProvider};
    use crate::blockchain::types::{BlockchainError, NetworkKey};

    #[tokio::test]
    async fn test_owned_is_one_page() {
        let owner = Address::repeat_byte(0x11);
        let collection = Address::repeat_byte(0xaa);
        let held = (1..=25).map(|id| raw_nft(collection, &id.to_string(), None)).collect();
        let provider = Arc::new(MockChainProvider::new(NetworkKey::Mainnet).with_nfts(owner, held));

        let owned = NftReader::new(provider.clone(), 20).owned(owner).await.unwrap();
        assert_eq!(owned.nfts.len(), 20);
        assert_eq!(owned.total_count, 25);
        assert_eq!(owned.nfts[0].name, "Token #1");

        let queries = provider.recorded().nft_queries;
        assert_eq!(queries, vec![NftOwnerQuery::new(owner, 20)]);
    }

    #[tokio::test]
    async fn test_metadata_lookup() {
        let owner = Address::repeat_byte(0x11);
        let collection = Address::repeat_byte(0xaa);
        let provider = Arc::new(
            MockChainProvider::new(NetworkKey::Mainnet)
                .with_nfts(owner, vec![raw_nft(collection, "9", Some("Nine"))]),
        );
        let reader = NftReader::new(provider, 20);

        let detail = reader.metadata(collection, "9").await.unwrap();
        assert_eq!(detail.name, "Nine");
        assert_eq!(detail.token_type.as_deref(), Some("ERC721"));

        let err = reader.metadata(collection, "10").await.unwrap_err();
        assert!(matches!(err, BlockchainError::NotFound(_)));
    }
}
