//! Transfer lookup and account history handlers.
//!
//! The two routes render an absent recipient differently: the category lookup
//! shows it as a contract creation, the history leaves it blank.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::blockchain::transaction::parse_address;
use crate::blockchain::types::{BlockchainResult, NetworkKey};
use crate::http::request::required;
use crate::http::server::AppState;
use crate::transfers::{HistoryFilter, TransferAggregator, TransferCategory, TransferRecord, TransferView};

/// Recipient placeholder in the category lookup.
pub const CONTRACT_SENTINEL: &str = "Contract";

/// Recipient placeholder in the account history.
pub const UNKNOWN_RECIPIENT_SENTINEL: &str = "";

#[derive(Debug, Deserialize)]
pub struct TransfersQuery {
    pub address: Option<String>,
    pub category: Option<String>,
    pub network: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TransfersResponse {
    pub transfers: Vec<TransferView>,
    pub network: NetworkKey,
}

/// `GET /api/transfers`
pub async fn get_transfers(
    State(state): State<AppState>,
    Query(query): Query<TransfersQuery>,
) -> BlockchainResult<Json<TransfersResponse>> {
    let address = parse_address(required(query.address.as_deref(), "address")?)?;
    let category = TransferCategory::from_param(query.category.as_deref());
    let network = NetworkKey::from_param(query.network.as_deref());

    let aggregator = TransferAggregator::new(state.provider(network)?, state.config.transfers.clone());
    let records = aggregator.lookup(address, category).await?;

    Ok(Json(TransfersResponse {
        transfers: render(&records, CONTRACT_SENTINEL),
        network,
    }))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub address: Option<String>,
    pub filter: Option<String>,
    pub network: Option<String>,
}

/// `GET /api/account/transactions`
pub async fn get_account_transactions(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> BlockchainResult<Json<Vec<TransferView>>> {
    let address = parse_address(required(query.address.as_deref(), "address")?)?;
    let filter = HistoryFilter::from_param(query.filter.as_deref());
    let network = NetworkKey::from_param(query.network.as_deref());

    let aggregator = TransferAggregator::new(state.provider(network)?, state.config.transfers.clone());
    let records = aggregator.history(address, filter).await?;

    Ok(Json(render(&records, UNKNOWN_RECIPIENT_SENTINEL)))
}

fn render(records: &[TransferRecord], absent_recipient: &str) -> Vec<TransferView> {
    records
        .iter()
        .map(|record| {
            let mut view = TransferView::from(record);
            if view.formatted_to.is_none() {
                view.formatted_to = Some(absent_recipient.to_string());
            }
            view
        })
        .collect()
}
