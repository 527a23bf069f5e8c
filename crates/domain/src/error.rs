use thiserror::Error;

/// Errors raised by domain constructors and conversions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Fee tier index outside the tick-spacing table.
    #[error("Invalid fee tier index {0}, expected 0..=5")]
    InvalidFeeTier(u8),
    /// Price range with non-positive bounds or min >= max.
    #[error("Invalid price range: min {min} must be positive and below max {max}")]
    InvalidPriceRange {
        /// Lower bound.
        min: String,
        /// Upper bound.
        max: String,
    },
    /// Amount string could not be parsed.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    /// DEX id outside the registry.
    #[error("Unsupported DEX: {0}. Supported DEXes: thala, tapp, hyperion")]
    UnsupportedDex(String),
    /// Unknown network name.
    #[error("Unknown network: {0}")]
    UnknownNetwork(String),
}
