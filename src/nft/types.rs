//! NFT shapes as the provider's NFT API encodes them, plus the display views
//! built from them.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Parameters of an ownership enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NftOwnerQuery {
    pub owner: Address,
    pub page_size: u32,
    pub with_metadata: bool,
}

impl NftOwnerQuery {
    pub fn new(owner: Address, page_size: u32) -> Self {
        Self {
            owner,
            page_size,
            with_metadata: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNftContract {
    pub address: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNftImage {
    #[serde(default)]
    pub cached_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub original_url: Option<String>,
}

/// Token metadata exactly as the contract's token URI served it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawNftSource {
    #[serde(default)]
    pub metadata: Value,
}

/// One token as the provider encodes it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNft {
    pub contract: RawNftContract,
    pub token_id: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<RawNftImage>,
    #[serde(default)]
    pub raw: Option<RawNftSource>,
}

/// One page of an ownership enumeration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedNftsPage {
    pub owned_nfts: Vec<RawNft>,
    #[serde(default)]
    pub total_count: u64,
}

/// Gallery entry of an owned token.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NftView {
    pub token_id: String,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub collection: String,
    pub contract_address: String,
}

/// Full metadata of a single token.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NftDetailView {
    pub token_id: String,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub collection: String,
    pub contract_address: String,
    pub token_type: Option<String>,
    pub attributes: Value,
}

/// Empty strings count as absent.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn first_present(candidates: &[&Option<String>]) -> Option<String> {
    candidates.iter().find_map(|c| present(c)).map(str::to_string)
}

impl RawNft {
    fn display_name(&self) -> String {
        present(&self.name)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Token #{}", self.token_id))
    }

    fn collection(&self) -> String {
        present(&self.contract.name).unwrap_or("Unknown Collection").to_string()
    }

    fn attributes(&self) -> Value {
        self.raw
            .as_ref()
            .and_then(|raw| raw.metadata.get("attributes"))
            .filter(|attributes| !attributes.is_null())
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()))
    }
}

impl From<&RawNft> for NftView {
    fn from(nft: &RawNft) -> Self {
        Self {
            token_id: nft.token_id.clone(),
            name: nft.display_name(),
            description: present(&nft.description).unwrap_or("No description").to_string(),
            image: nft
                .image
                .as_ref()
                .and_then(|i| first_present(&[&i.thumbnail_url, &i.cached_url])),
            collection: nft.collection(),
            contract_address: nft.contract.address.clone(),
        }
    }
}

impl From<&RawNft> for NftDetailView {
    fn from(nft: &RawNft) -> Self {
        Self {
            token_id: nft.token_id.clone(),
            name: nft.display_name(),
            description: present(&nft.description)
                .unwrap_or("No description available")
                .to_string(),
            image: nft
                .image
                .as_ref()
                .and_then(|i| first_present(&[&i.thumbnail_url, &i.cached_url, &i.original_url])),
            collection: nft.collection(),
            contract_address: nft.contract.address.clone(),
            token_type: nft.token_type.clone(),
            attributes: nft.attributes(),
        }
    }
}

/// Accept a decimal or `0x`-hex token id.
pub fn parse_token_id(input: &str) -> BlockchainResult<String> {
    let trimmed = input.trim();
    let valid = match trimmed.strip_prefix("0x") {
        Some(hex) => !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()),
        None => !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()),
    };
    if valid {
        Ok(trimmed.to_string())
    } else {
        Err(BlockchainError::InvalidTokenId(input.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> RawNft {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_owned_page_decodes() {
        let page: OwnedNftsPage = serde_json::from_str(
            r#"{
                "ownedNfts": [{
                    "contract": {"address": "0xbc4ca0eda7647a8ab7c2061c2e118a18a936f13d", "name": "BoredApeYachtClub"},
                    "tokenId": "44",
                    "tokenType": "ERC721",
                    "name": "Ape 44",
                    "image": {"cachedUrl": "https://cache/44.png", "thumbnailUrl": null}
                }],
                "totalCount": 3,
                "pageKey": "abc"
            }"#,
        )
        .unwrap();
        assert_eq!(page.total_count, 3);

        let view = NftView::from(&page.owned_nfts[0]);
        assert_eq!(view.name, "Ape 44");
        assert_eq!(view.collection, "BoredApeYachtClub");
        assert_eq!(view.image.as_deref(), Some("https://cache/44.png"));
        assert_eq!(view.description, "No description");
    }

    #[test]
    fn test_fallbacks() {
        let nft = decode(r#"{"contract": {"address": "0x01", "name": ""}, "tokenId": "7", "name": ""}"#);

        let view = NftView::from(&nft);
        assert_eq!(view.name, "Token #7");
        assert_eq!(view.collection, "Unknown Collection");
        assert_eq!(view.image, None);

        let detail = NftDetailView::from(&nft);
        assert_eq!(detail.description, "No description available");
        assert_eq!(detail.attributes, Value::Array(vec![]));
    }

    #[test]
    fn test_detail_prefers_thumbnail_then_original() {
        let nft = decode(
            r#"{
                "contract": {"address": "0x01"},
                "tokenId": "1",
                "image": {"originalUrl": "ipfs://original"},
                "raw": {"metadata": {"attributes": [{"trait_type": "Hat", "value": "Cap"}]}}
            }"#,
        );

        let detail = NftDetailView::from(&nft);
        assert_eq!(detail.image.as_deref(), Some("ipfs://original"));
        assert_eq!(detail.attributes[0]["value"], "Cap");
        // the gallery view never falls back to the original asset
        assert_eq!(NftView::from(&nft).image, None);
    }

    #[test]
    fn test_string_metadata_has_no_attributes() {
        let nft = decode(r#"{"contract": {"address": "0x01"}, "tokenId": "1", "raw": {"metadata": "unparsed"}}"#);
        assert_eq!(NftDetailView::from(&nft).attributes, Value::Array(vec![]));
    }

    #[test]
    fn test_token_id() {
        assert_eq!(parse_token_id(" 1234 ").unwrap(), "1234");
        assert_eq!(parse_token_id("0x1f").unwrap(), "0x1f");
        for bad in ["", "0x", "12a", "-1"] {
            assert!(matches!(parse_token_id(bad), Err(BlockchainError::InvalidTokenId(_))), "accepted {}", bad);
        }
    }
}
