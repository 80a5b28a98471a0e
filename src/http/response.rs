//! Error-to-response mapping.
//!
//! Every failure leaves the boundary as `{ "error": "<message>" }` with a
//! status derived from its variant. Rejection texts are rewritten into
//! guidance first.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::blockchain::types::BlockchainError;

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// HTTP status for an error variant.
pub fn status_for(error: &BlockchainError) -> StatusCode {
    match error {
        BlockchainError::InvalidAmountFormat(_)
        | BlockchainError::InvalidAddressFormat(_)
        | BlockchainError::InvalidKeyFormat
        | BlockchainError::InvalidHashFormat(_)
        | BlockchainError::InvalidBlockNumber(_)
        | BlockchainError::InvalidTokenId(_)
        | BlockchainError::InvalidRequestBody(_)
        | BlockchainError::MissingFields(_) => StatusCode::BAD_REQUEST,
        BlockchainError::NotFound(_) => StatusCode::NOT_FOUND,
        BlockchainError::RejectedByNetwork(_) => StatusCode::UNPROCESSABLE_ENTITY,
        BlockchainError::ProviderUnavailable(_) | BlockchainError::MalformedResponse(_) => {
            StatusCode::BAD_GATEWAY
        }
        BlockchainError::SigningFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        BlockchainError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
    }
}

impl IntoResponse for BlockchainError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        } else {
            tracing::info!(error = %self, status = status.as_u16(), "Request rejected");
        }

        (status, Json(ErrorBody { error: self.user_message() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::types::INSUFFICIENT_FUNDS_HINT;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&BlockchainError::InvalidKeyFormat), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&BlockchainError::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(&BlockchainError::ProviderUnavailable("down".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(status_for(&BlockchainError::Timeout(5)), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            status_for(&BlockchainError::InvalidRequestBody("eof".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&BlockchainError::SigningFailed("missing nonce".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_rejection_body_is_rewritten() {
        let response =
            BlockchainError::RejectedByNetwork("insufficient funds for gas".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], INSUFFICIENT_FUNDS_HINT);
    }
}
