//! Transfer categories, provider query/response shapes and the typed records
//! the aggregator produces.

use alloy::primitives::{Address, TxHash, U256};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::amount::{Amount, NATIVE_DECIMALS};
use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Classification of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferCategory {
    /// Top-level native value movement.
    External,
    /// Native value moved by a contract call.
    Internal,
    Erc20,
    Erc721,
    Erc1155,
}

impl TransferCategory {
    pub const ALL: [TransferCategory; 5] = [
        TransferCategory::External,
        TransferCategory::Internal,
        TransferCategory::Erc20,
        TransferCategory::Erc721,
        TransferCategory::Erc1155,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferCategory::External => "external",
            TransferCategory::Internal => "internal",
            TransferCategory::Erc20 => "erc20",
            TransferCategory::Erc721 => "erc721",
            TransferCategory::Erc1155 => "erc1155",
        }
    }

    /// Resolve a request parameter; absent or unknown selects `external`.
    pub fn from_param(param: Option<&str>) -> Self {
        param
            .and_then(|p| p.parse().ok())
            .unwrap_or(TransferCategory::External)
    }

    /// Whether the value is denominated in the native asset.
    pub fn is_native(&self) -> bool {
        matches!(self, TransferCategory::External | TransferCategory::Internal)
    }
}

impl FromStr for TransferCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "external" => Ok(TransferCategory::External),
            "internal" => Ok(TransferCategory::Internal),
            "erc20" => Ok(TransferCategory::Erc20),
            "erc721" => Ok(TransferCategory::Erc721),
            "erc1155" => Ok(TransferCategory::Erc1155),
            other => Err(format!("unknown transfer category '{}'", other)),
        }
    }
}

impl fmt::Display for TransferCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which directional query produced a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// The queried address is the recipient.
    In,
    /// The queried address is the sender.
    Out,
}

/// Direction selector of the address history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryFilter {
    All,
    Sent,
    Received,
}

impl HistoryFilter {
    /// Absent or unknown selects `All`.
    pub fn from_param(param: Option<&str>) -> Self {
        match param.map(|p| p.trim().to_ascii_lowercase()).as_deref() {
            Some("sent") => HistoryFilter::Sent,
            Some("received") => HistoryFilter::Received,
            _ => HistoryFilter::All,
        }
    }

    pub fn includes_sent(&self) -> bool {
        matches!(self, HistoryFilter::All | HistoryFilter::Sent)
    }

    pub fn includes_received(&self) -> bool {
        matches!(self, HistoryFilter::All | HistoryFilter::Received)
    }
}

/// Result ordering requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortOrder {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

/// Parameters of one transfer enumeration call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferQuery {
    pub from_block: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_address: Option<Address>,
    pub category: Vec<TransferCategory>,
    #[serde(serialize_with = "serialize_hex_quantity")]
    pub max_count: u32,
    pub order: SortOrder,
    pub with_metadata: bool,
}

impl TransferQuery {
    fn new(categories: Vec<TransferCategory>, max_count: u32) -> Self {
        Self {
            from_block: "0x0".to_string(),
            from_address: None,
            to_address: None,
            category: categories,
            max_count,
            order: SortOrder::Descending,
            with_metadata: false,
        }
    }

    /// Transfers where `address` is the recipient.
    pub fn received_by(address: Address, categories: Vec<TransferCategory>, max_count: u32) -> Self {
        Self {
            to_address: Some(address),
            ..Self::new(categories, max_count)
        }
    }

    /// Transfers where `address` is the sender.
    pub fn sent_by(address: Address, categories: Vec<TransferCategory>, max_count: u32) -> Self {
        Self {
            from_address: Some(address),
            ..Self::new(categories, max_count)
        }
    }

    pub fn with_metadata(mut self) -> Self {
        self.with_metadata = true;
        self
    }

    /// Direction tag for results of this query.
    pub fn direction(&self) -> Direction {
        if self.to_address.is_some() {
            Direction::In
        } else {
            Direction::Out
        }
    }
}

fn serialize_hex_quantity<S: Serializer>(value: &u32, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{:#x}", value))
}

/// Contract-level value of a provider transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContract {
    /// Hex base-unit value.
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    /// Hex exponent.
    #[serde(default)]
    pub decimal: Option<String>,
}

/// Block metadata attached when requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferMetadata {
    #[serde(default)]
    pub block_timestamp: Option<String>,
}

/// A transfer exactly as the provider encodes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransfer {
    /// Hex or decimal block number.
    pub block_num: String,
    pub hash: String,
    pub from: String,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub asset: Option<String>,
    pub category: String,
    #[serde(default)]
    pub raw_contract: RawContract,
    #[serde(default)]
    pub token_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<TransferMetadata>,
}

/// One page of a transfer enumeration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetTransfersPage {
    pub transfers: Vec<RawTransfer>,
}

/// A typed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    /// Deduplication key.
    pub hash: TxHash,
    pub from: Address,
    /// `None` for contract creation or an unknown recipient.
    pub to: Option<Address>,
    /// `None` for non-fungible transfers.
    pub value: Option<Amount>,
    pub asset: Option<String>,
    pub category: TransferCategory,
    pub block_number: u64,
    pub direction: Option<Direction>,
    pub token_id: Option<String>,
    pub timestamp: Option<String>,
}

impl TransferRecord {
    /// Type a provider transfer, tagging it with the direction of its query.
    pub fn from_raw(raw: RawTransfer, direction: Option<Direction>) -> BlockchainResult<Self> {
        let category = raw
            .category
            .parse::<TransferCategory>()
            .map_err(BlockchainError::MalformedResponse)?;

        let to = match raw.to.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(to) => Some(parse_address(to)?),
        };

        Ok(Self {
            hash: TxHash::from_str(raw.hash.trim()).map_err(|_| {
                BlockchainError::MalformedResponse(format!("transfer hash '{}'", raw.hash))
            })?,
            from: parse_address(raw.from.trim())?,
            to,
            value: transfer_value(&raw.raw_contract, category)?,
            asset: raw.asset,
            category,
            block_number: parse_block_number(&raw.block_num)?,
            direction,
            token_id: raw.token_id,
            timestamp: raw.metadata.and_then(|m| m.block_timestamp),
        })
    }
}

/// Display form of a transfer.
///
/// `formatted_to` stays `None` when the recipient is absent; the caller picks
/// the sentinel that fits its context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferView {
    pub hash: TxHash,
    pub from: Address,
    pub to: Option<Address>,
    pub value: Option<String>,
    pub asset: Option<String>,
    pub category: TransferCategory,
    pub block_num: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    pub formatted_from: String,
    pub formatted_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
    pub timestamp: Option<String>,
}

impl From<&TransferRecord> for TransferView {
    fn from(record: &TransferRecord) -> Self {
        Self {
            hash: record.hash,
            from: record.from,
            to: record.to,
            value: record.value.map(|v| v.to_decimal_string()),
            asset: record.asset.clone(),
            category: record.category,
            block_num: record.block_number.to_string(),
            direction: record.direction,
            formatted_from: shorten_address(&record.from.to_string()),
            formatted_to: record.to.map(|to| shorten_address(&to.to_string())),
            token_id: record.token_id.clone(),
            timestamp: record.timestamp.clone(),
        }
    }
}

/// First 6 and last 4 characters joined by an ellipsis.
pub fn shorten_address(address: &str) -> String {
    if address.len() < 10 || !address.is_ascii() {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}

/// Parse a provider block number, hex (`0x`-prefixed) or decimal.
pub fn parse_block_number(encoded: &str) -> BlockchainResult<u64> {
    let trimmed = encoded.trim();
    let parsed = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => trimmed.parse::<u64>(),
    };
    parsed.map_err(|_| BlockchainError::MalformedResponse(format!("block number '{}'", encoded)))
}

fn parse_address(encoded: &str) -> BlockchainResult<Address> {
    Address::from_str(encoded)
        .map_err(|_| BlockchainError::MalformedResponse(format!("address '{}'", encoded)))
}

fn parse_hex_u256(encoded: &str) -> BlockchainResult<U256> {
    let digits = encoded.trim().trim_start_matches("0x");
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 16)
        .map_err(|_| BlockchainError::MalformedResponse(format!("hex quantity '{}'", encoded)))
}

fn transfer_value(contract: &RawContract, category: TransferCategory) -> BlockchainResult<Option<Amount>> {
    let Some(raw_value) = contract.value.as_deref() else {
        return Ok(None);
    };
    let base_units = parse_hex_u256(raw_value)?;

    let decimals = match contract.decimal.as_deref() {
        Some(decimal) => u8::try_from(parse_hex_u256(decimal)?).map_err(|_| {
            BlockchainError::MalformedResponse(format!("token decimals '{}'", decimal))
        })?,
        None if category.is_native() => NATIVE_DECIMALS,
        // unknown token exponent: report raw base units
        None => 0,
    };

    Ok(Some(Amount::new(base_units, decimals)))
}
