//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, page sizes > 0)
//! - Check provider endpoints parse and chain ids are distinct
//! - Keep the inclusion-wait bound inside the whole-request bound
//!
//! Returns all validation errors, not just the first.

use std::collections::HashSet;
use std::fmt;

use crate::blockchain::types::NetworkKey;
use crate::config::schema::ExplorerConfig;

/// A single semantic violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ExplorerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.provider.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("provider.rpc_timeout_secs", "must be greater than 0"));
    }
    if config.provider.receipt_poll_interval_ms == 0 {
        errors.push(ValidationError::new(
            "provider.receipt_poll_interval_ms",
            "must be greater than 0",
        ));
    }

    let mut chain_ids = HashSet::new();
    for network in NetworkKey::ALL {
        let endpoint = config.networks.endpoint(network);
        let field = format!("networks.{}", network);

        if let Err(e) = url::Url::parse(&endpoint.rpc_url) {
            errors.push(ValidationError::new(
                format!("{}.rpc_url", field),
                format!("invalid URL: {}", e),
            ));
        }
        if let Some(Err(e)) = endpoint.nft_url.as_deref().map(url::Url::parse) {
            errors.push(ValidationError::new(
                format!("{}.nft_url", field),
                format!("invalid URL: {}", e),
            ));
        }
        if endpoint.chain_id == 0 {
            errors.push(ValidationError::new(format!("{}.chain_id", field), "must be non-zero"));
        } else if !chain_ids.insert(endpoint.chain_id) {
            errors.push(ValidationError::new(
                format!("{}.chain_id", field),
                format!("chain id {} is used by another network", endpoint.chain_id),
            ));
        }
    }

    if config.pipeline.gas_limit.is_some_and(|limit| limit < 21_000) {
        errors.push(ValidationError::new(
            "pipeline.gas_limit",
            "must cover the 21000 intrinsic gas of a transfer",
        ));
    }
    if config.pipeline.confirmation_timeout_secs >= config.timeouts.request_secs {
        errors.push(ValidationError::new(
            "pipeline.confirmation_timeout_secs",
            format!(
                "must be below timeouts.request_secs ({})",
                config.timeouts.request_secs
            ),
        ));
    }

    if config.transfers.page_size == 0 {
        errors.push(ValidationError::new("transfers.page_size", "must be greater than 0"));
    }
    if config.transfers.overview_page_size == 0 {
        errors.push(ValidationError::new(
            "transfers.overview_page_size",
            "must be greater than 0",
        ));
    }
    if config.transfers.max_results == 0 {
        errors.push(ValidationError::new("transfers.max_results", "must be greater than 0"));
    }
    if config.transfers.latest_blocks == 0 {
        errors.push(ValidationError::new("transfers.latest_blocks", "must be greater than 0"));
    }
    if config.nfts.page_size == 0 {
        errors.push(ValidationError::new("nfts.page_size", "must be greater than 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
