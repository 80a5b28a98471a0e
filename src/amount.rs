//! Exact conversion between decimal amount strings and integer base units.
//!
//! Amounts never pass through a binary float. A decimal string is split on its
//! point, the fraction is right-padded (or truncated, never rounded) to the
//! asset's exponent, and the concatenated digits are parsed as a `U256`.

use alloy::primitives::U256;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Exponent of the native asset (wei per ether).
pub const NATIVE_DECIMALS: u8 = 18;

/// Exponent of gwei relative to wei.
pub const GWEI_DECIMALS: u8 = 9;

/// A non-negative decimal value held as base units plus an implicit exponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Amount {
    base_units: U256,
    decimals: u8,
}

impl Amount {
    pub fn new(base_units: U256, decimals: u8) -> Self {
        Self { base_units, decimals }
    }

    /// Amount of the native asset.
    pub fn native(base_units: U256) -> Self {
        Self::new(base_units, NATIVE_DECIMALS)
    }

    /// Parse a decimal string for an asset with the given exponent.
    pub fn parse(input: &str, decimals: u8) -> BlockchainResult<Self> {
        parse_units(input, decimals).map(|base_units| Self::new(base_units, decimals))
    }

    pub fn parse_native(input: &str) -> BlockchainResult<Self> {
        Self::parse(input, NATIVE_DECIMALS)
    }

    pub fn base_units(&self) -> U256 {
        self.base_units
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Canonical decimal rendering: no trailing fractional zeros, no bare point.
    pub fn to_decimal_string(&self) -> String {
        format_units(self.base_units, self.decimals)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_decimal_string())
    }
}

/// Convert a native-unit decimal string ("0.01") into wei.
pub fn decimal_to_base_units(input: &str) -> BlockchainResult<U256> {
    parse_units(input, NATIVE_DECIMALS)
}

/// Convert wei into a native-unit decimal string.
pub fn base_units_to_decimal(value: U256) -> String {
    format_units(value, NATIVE_DECIMALS)
}

/// Parse `^\d+(\.\d+)?$` into base units of an asset with `decimals` places.
///
/// Fraction digits beyond `decimals` are dropped.
pub fn parse_units(input: &str, decimals: u8) -> BlockchainResult<U256> {
    let (whole, fraction) = match input.split_once('.') {
        Some((whole, fraction)) => {
            if fraction.is_empty() {
                return Err(BlockchainError::InvalidAmountFormat(input.to_string()));
            }
            (whole, fraction)
        }
        None => (input, ""),
    };

    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if whole.is_empty() || !all_digits(whole) || !all_digits(fraction) {
        return Err(BlockchainError::InvalidAmountFormat(input.to_string()));
    }

    let places = decimals as usize;
    let kept = &fraction[..fraction.len().min(places)];

    let mut digits = String::with_capacity(whole.len() + places);
    digits.push_str(whole);
    digits.push_str(kept);
    digits.extend(std::iter::repeat('0').take(places - kept.len()));

    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Ok(U256::ZERO);
    }

    U256::from_str_radix(significant, 10).map_err(|_| {
        BlockchainError::InvalidAmountFormat(format!("{} does not fit in 256 bits", input))
    })
}

/// Render base units of an asset with `decimals` places as a decimal string.
pub fn format_units(value: U256, decimals: u8) -> String {
    if decimals == 0 {
        return value.to_string();
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = value / divisor;
    let remainder = value % divisor;

    if remainder.is_zero() {
        return whole.to_string();
    }

    let padded = format!("{:0>width$}", remainder.to_string(), width = decimals as usize);
    format!("{}.{}", whole, padded.trim_end_matches('0'))
}

/// Render a wei gas price as gwei with two decimals, e.g. `"12.35 Gwei"`.
pub fn format_gwei(wei: u128) -> String {
    // hundredths of a gwei, rounded half up
    let hundredths = wei.saturating_add(5_000_000) / 10_000_000;
    format!("{}.{:02} Gwei", hundredths / 100, hundredths % 100)
}
