//! Request-side helpers.
//!
//! # Responsibilities
//! - Generate a UUID v4 request ID when the client sent none
//! - Open one tracing span per request carrying that ID
//! - Check required query/body inputs before any provider call

use axum::http::{HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Header carrying the request ID in both directions.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Request ID generator backed by UUID v4.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Span for one request, tagged with its ID.
pub fn request_span<B>(request: &Request<B>) -> tracing::Span {
    let request_id = request
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}

/// Value of a required input; empty strings count as missing.
pub fn required<'a>(value: Option<&'a str>, field: &'static str) -> BlockchainResult<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(BlockchainError::MissingFields(vec![field])),
    }
}

/// Names of every absent or empty input, in the order given.
pub fn missing_fields(fields: &[(&'static str, Option<&str>)]) -> Vec<&'static str> {
    fields
        .iter()
        .filter(|(_, value)| value.map(|v| v.trim().is_empty()).unwrap_or(true))
        .map(|(name, _)| *name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_uuids() {
        let request = Request::builder().uri("/health").body(()).unwrap();
        let id = MakeRequestUuid.make_request_id(&request).unwrap();
        let text = id.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(text).is_ok());
    }

    #[test]
    fn test_required_inputs() {
        assert_eq!(required(Some(" 0xabc "), "hash").unwrap(), "0xabc");
        assert!(matches!(
            required(Some("  "), "hash"),
            Err(BlockchainError::MissingFields(fields)) if fields == vec!["hash"]
        ));

        let missing = missing_fields(&[
            ("toAddress", Some("0x1")),
            ("amountInETH", None),
            ("privateKey", Some("")),
            ("network", Some("sepolia")),
        ]);
        assert_eq!(missing, vec!["amountInETH", "privateKey"]);
    }
}
