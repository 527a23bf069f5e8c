use crate::error::DomainError;
use primitive_types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Decimals assumed when a fungible asset's metadata cannot be read.
pub const DEFAULT_DECIMALS: u8 = 8;

/// Fungible-asset metadata resolved from chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl TokenMetadata {
    pub fn new(
        address: impl Into<String>,
        symbol: impl Into<String>,
        decimals: u8,
        name: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            name: name.into(),
            symbol: symbol.into(),
            decimals,
        }
    }

    /// Placeholder used when the metadata resource is missing or unreadable.
    pub fn unknown(address: impl Into<String>) -> Self {
        Self::new(address, "UNKNOWN", DEFAULT_DECIMALS, "Unknown Token")
    }
}

/// Raw on-chain token amount (smallest unit).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenAmount(pub U256);

impl TokenAmount {
    pub fn new(amount: impl Into<U256>) -> Self {
        Self(amount.into())
    }

    pub fn zero() -> Self {
        Self(U256::zero())
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }

    /// Converts a human-readable amount into raw units.
    pub fn from_decimal(amount: Decimal, decimals: u8) -> Result<Self, DomainError> {
        raw_from_decimal(amount, decimals).map(Self)
    }

    /// Converts raw units into a human-readable amount.
    pub fn to_decimal(&self, decimals: u8) -> Option<Decimal> {
        Decimal::from_str(&format_balance(self.0, decimals)).ok()
    }
}

impl From<u64> for TokenAmount {
    fn from(v: u64) -> Self {
        Self(U256::from(v))
    }
}

impl From<u128> for TokenAmount {
    fn from(v: u128) -> Self {
        Self(U256::from(v))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A wallet balance for one token, kept in raw and formatted form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub address: String,
    pub raw: U256,
    pub formatted: String,
    pub decimals: u8,
}

impl TokenBalance {
    pub fn new(address: impl Into<String>, raw: U256, decimals: u8) -> Self {
        Self {
            address: address.into(),
            raw,
            formatted: format_balance(raw, decimals),
            decimals,
        }
    }

    pub fn zero(address: impl Into<String>, decimals: u8) -> Self {
        Self::new(address, U256::zero(), decimals)
    }

    /// Returns a copy with a new raw amount, keeping address and decimals.
    #[must_use]
    pub fn with_raw(&self, raw: U256) -> Self {
        Self::new(self.address.clone(), raw, self.decimals)
    }

    /// Balance in human-readable units, if representable.
    pub fn to_decimal(&self) -> Option<Decimal> {
        Decimal::from_str(&self.formatted).ok()
    }
}

/// Formats a raw amount with `decimals` fractional digits, trimming trailing zeros.
pub fn format_balance(raw: U256, decimals: u8) -> String {
    let divisor = U256::exp10(decimals as usize);
    let whole = raw / divisor;
    let fractional = raw % divisor;

    let fractional_str = format!("{:0>width$}", fractional.to_string(), width = decimals as usize);
    let trimmed = fractional_str.trim_end_matches('0');

    if decimals == 0 || trimmed.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, trimmed)
    }
}

/// Parses a formatted amount back into raw units.
///
/// Extra fractional digits beyond `decimals` are truncated.
pub fn parse_balance(formatted: &str, decimals: u8) -> Result<U256, DomainError> {
    let trimmed = formatted.trim();
    let mut parts = trimmed.split('.');
    let whole = parts.next().unwrap_or_default();
    let fraction = parts.next().unwrap_or_default();
    if parts.next().is_some() {
        return Err(DomainError::InvalidAmount(formatted.to_string()));
    }

    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(whole) || !is_digits(fraction) || (whole.is_empty() && fraction.is_empty()) {
        return Err(DomainError::InvalidAmount(formatted.to_string()));
    }

    let whole = if whole.is_empty() { "0" } else { whole };
    let mut fraction: String = fraction.chars().take(decimals as usize).collect();
    while fraction.len() < decimals as usize {
        fraction.push('0');
    }

    let whole_raw = U256::from_dec_str(whole)
        .map_err(|_| DomainError::InvalidAmount(formatted.to_string()))?;
    let fraction_raw = if fraction.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(&fraction).map_err(|_| DomainError::InvalidAmount(formatted.to_string()))?
    };

    whole_raw
        .checked_mul(U256::exp10(decimals as usize))
        .and_then(|w| w.checked_add(fraction_raw))
        .ok_or_else(|| DomainError::InvalidAmount(formatted.to_string()))
}

/// Converts a non-negative decimal into raw units.
pub fn raw_from_decimal(amount: Decimal, decimals: u8) -> Result<U256, DomainError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(DomainError::InvalidAmount(amount.to_string()));
    }
    parse_balance(&amount.normalize().to_string(), decimals)
}

/// Aptos addresses are `0x` followed by 1 to 64 hex digits.
pub fn is_valid_address(address: &str) -> bool {
    match address.strip_prefix("0x") {
        Some(hex) => !hex.is_empty() && hex.len() <= 64 && hex.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}
