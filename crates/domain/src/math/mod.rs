use thiserror::Error;

pub mod concentrated_liquidity;
pub mod price_tick;

/// Errors from price, tick and liquidity math.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("Price must be positive")]
    NonPositivePrice,
    #[error("Sqrt price must be positive")]
    NonPositiveSqrtPrice,
    #[error("Range too small")]
    EmptyRange,
    #[error("Overflow converting {0}")]
    Overflow(&'static str),
}
