//! Send and status-lookup handlers.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;

use alloy::primitives::{Address, TxHash};

use crate::amount::format_gwei;
use crate::blockchain::transaction::{parse_tx_hash, TransactionPipeline, TransactionRecord, TransferRequest};
use crate::blockchain::types::{BlockchainError, BlockchainResult, NetworkKey, TxStatus};
use crate::http::request::{missing_fields, required};
use crate::http::server::AppState;

/// Amounts arrive either as JSON strings or JSON numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AmountField {
    Text(String),
    Number(serde_json::Number),
}

impl AmountField {
    fn as_text(&self) -> String {
        match self {
            AmountField::Text(s) => s.clone(),
            AmountField::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTransactionBody {
    pub to_address: Option<String>,
    #[serde(rename = "amountInETH")]
    pub amount_in_eth: Option<AmountField>,
    pub private_key: Option<String>,
    pub network: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTransactionResponse {
    pub success: bool,
    pub hash: TxHash,
    pub status: TxStatus,
    pub block_number: Option<u64>,
    pub from: Address,
    pub to: Address,
    pub value: String,
    pub network: NetworkKey,
}

/// `POST /api/send-transaction`
pub async fn send_transaction(
    State(state): State<AppState>,
    body: Result<Json<SendTransactionBody>, JsonRejection>,
) -> Response {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => return BlockchainError::InvalidRequestBody(rejection.body_text()).into_response(),
    };
    match send(&state, body).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

async fn send(state: &AppState, body: SendTransactionBody) -> BlockchainResult<Response> {
    let amount = body.amount_in_eth.as_ref().map(AmountField::as_text);
    let missing = missing_fields(&[
        ("toAddress", body.to_address.as_deref()),
        ("amountInETH", amount.as_deref()),
        ("privateKey", body.private_key.as_deref()),
        ("network", body.network.as_deref()),
    ]);
    if !missing.is_empty() {
        return Err(BlockchainError::MissingFields(missing));
    }

    let request = TransferRequest::new(
        body.to_address.as_deref().unwrap_or_default(),
        amount.as_deref().unwrap_or_default(),
        body.private_key.as_deref().unwrap_or_default(),
        body.network.as_deref().unwrap_or_default(),
    )?;

    let provider = state.provider(request.network)?;
    let pipeline = TransactionPipeline::new(provider, state.config.pipeline.gas_limit);
    let pending = pipeline.submit(&request).await?;

    let bound = Duration::from_secs(state.config.pipeline.confirmation_timeout_secs);
    let (status_code, status, block_number) = match timeout(bound, pipeline.wait(pending.clone())).await {
        Ok(settled) => {
            let settled = settled?;
            (StatusCode::OK, settled.status, settled.block_number)
        }
        Err(_) => {
            // still in flight; the hash lets the caller poll the status route
            tracing::warn!(
                tx_hash = %pending.hash,
                network = %pending.network,
                waited_secs = bound.as_secs(),
                "Inclusion wait elapsed"
            );
            (StatusCode::ACCEPTED, TxStatus::Pending, None)
        }
    };

    let response = SendTransactionResponse {
        success: true,
        hash: pending.hash,
        status,
        block_number,
        from: pending.from,
        to: pending.to,
        value: pending.amount.to_decimal_string(),
        network: pending.network,
    };
    Ok((status_code, Json(response)).into_response())
}

#[derive(Debug, Deserialize)]
pub struct TransactionQuery {
    pub hash: Option<String>,
    pub network: Option<String>,
}

/// Status lookup view.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    pub hash: TxHash,
    pub status: TxStatus,
    pub block_number: Option<u64>,
    pub from: Address,
    pub to: Option<Address>,
    pub value: String,
    pub gas_used: String,
    pub gas_price: String,
    pub timestamp: Option<u64>,
    pub confirmations: u64,
    pub network: NetworkKey,
}

impl From<TransactionRecord> for TransactionView {
    fn from(record: TransactionRecord) -> Self {
        Self {
            hash: record.hash,
            status: record.status,
            block_number: record.block_number,
            from: record.from,
            to: record.to,
            value: record.value.to_decimal_string(),
            gas_used: record.gas_used.map(|g| g.to_string()).unwrap_or_else(|| "N/A".to_string()),
            gas_price: record.gas_price.map(format_gwei).unwrap_or_else(|| "N/A".to_string()),
            timestamp: record.timestamp,
            confirmations: record.confirmations,
            network: record.network,
        }
    }
}

/// `GET /api/transaction`
pub async fn get_transaction(
    State(state): State<AppState>,
    Query(query): Query<TransactionQuery>,
) -> BlockchainResult<Json<TransactionView>> {
    let hash = parse_tx_hash(required(query.hash.as_deref(), "hash")?)?;
    let network = NetworkKey::from_param(query.network.as_deref());

    let pipeline = TransactionPipeline::new(state.provider(network)?, state.config.pipeline.gas_limit);
    let record = pipeline.lookup(hash).await?;
    Ok(Json(record.into()))
}
