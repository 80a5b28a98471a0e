//! Account handlers.

use axum::{
    extract::{Query, State},
    Json,
};
use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::blockchain::account::AccountReader;
use crate::blockchain::transaction::parse_address;
use crate::blockchain::types::{BlockchainResult, NetworkKey};
use crate::http::request::required;
use crate::http::server::AppState;
use crate::transfers::types::shorten_address;

#[derive(Debug, Deserialize)]
pub struct AccountQuery {
    pub address: Option<String>,
    pub network: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceView {
    pub address: Address,
    pub balance: String,
    pub balance_wei: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfoView {
    pub address: Address,
    pub formatted_address: String,
    pub balance: String,
    pub balance_wei: String,
    pub is_contract: bool,
    pub block_number: u64,
    pub network: NetworkKey,
}

fn reader(state: &AppState, query: &AccountQuery) -> BlockchainResult<(AccountReader, Address)> {
    let address = parse_address(required(query.address.as_deref(), "address")?)?;
    let network = NetworkKey::from_param(query.network.as_deref());
    Ok((AccountReader::new(state.provider(network)?), address))
}

/// `GET /api/account`
pub async fn get_account(
    State(state): State<AppState>,
    Query(query): Query<AccountQuery>,
) -> BlockchainResult<Json<BalanceView>> {
    let (reader, address) = reader(&state, &query)?;
    let balance = reader.balance(address).await?;

    Ok(Json(BalanceView {
        address: balance.address,
        balance: balance.balance.to_decimal_string(),
        balance_wei: balance.balance.base_units().to_string(),
    }))
}

/// `GET /api/account/info`
pub async fn get_account_info(
    State(state): State<AppState>,
    Query(query): Query<AccountQuery>,
) -> BlockchainResult<Json<AccountInfoView>> {
    let (reader, address) = reader(&state, &query)?;
    let overview = reader.overview(address).await?;

    Ok(Json(AccountInfoView {
        address: overview.address,
        formatted_address: shorten_address(&overview.address.to_string()),
        balance: overview.balance.to_decimal_string(),
        balance_wei: overview.balance.base_units().to_string(),
        is_contract: overview.is_contract,
        block_number: overview.block_number,
        network: overview.network,
    }))
}
