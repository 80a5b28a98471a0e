//! NFT handlers.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::blockchain::transaction::parse_address;
use crate::blockchain::types::{BlockchainError, BlockchainResult, NetworkKey};
use crate::http::request::{missing_fields, required};
use crate::http::server::AppState;
use crate::nft::types::parse_token_id;
use crate::nft::{NftDetailView, NftReader, NftView};

#[derive(Debug, Deserialize)]
pub struct NftQuery {
    pub address: Option<String>,
    pub network: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftMetadataQuery {
    pub contract_address: Option<String>,
    pub token_id: Option<String>,
    pub network: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NftGalleryView {
    pub nfts: Vec<NftView>,
    pub total_count: u64,
}

fn reader(state: &AppState, network: Option<&str>) -> BlockchainResult<NftReader> {
    let provider = state.provider(NetworkKey::from_param(network))?;
    Ok(NftReader::new(provider, state.config.nfts.page_size))
}

/// `GET /api/nft`
pub async fn get_nfts(
    State(state): State<AppState>,
    Query(query): Query<NftQuery>,
) -> BlockchainResult<Json<NftGalleryView>> {
    let owner = parse_address(required(query.address.as_deref(), "address")?)?;
    let owned = reader(&state, query.network.as_deref())?.owned(owner).await?;

    Ok(Json(NftGalleryView {
        nfts: owned.nfts,
        total_count: owned.total_count,
    }))
}

/// `GET /api/nft/metadata`
pub async fn get_nft_metadata(
    State(state): State<AppState>,
    Query(query): Query<NftMetadataQuery>,
) -> BlockchainResult<Json<NftDetailView>> {
    let missing = missing_fields(&[
        ("contractAddress", query.contract_address.as_deref()),
        ("tokenId", query.token_id.as_deref()),
    ]);
    if !missing.is_empty() {
        return Err(BlockchainError::MissingFields(missing));
    }

    let contract = parse_address(query.contract_address.as_deref().unwrap_or_default())?;
    let token_id = parse_token_id(query.token_id.as_deref().unwrap_or_default())?;
    let detail = reader(&state, query.network.as_deref())?
        .metadata(contract, &token_id)
        .await?;

    Ok(Json(detail))
}
