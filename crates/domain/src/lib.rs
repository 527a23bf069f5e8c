//! Domain types and math for concentrated-liquidity position batching on Aptos.
//!
//! This crate is free of I/O:
//! - Token metadata, raw balances and their human-readable formatting
//! - Fee tiers and the protocol tick-spacing table
//! - Price ranges and range presets
//! - Price/tick conversion and concentrated-liquidity math
//! - Pending positions and batch metrics

/// Well-known tokens per network.
pub mod catalog;
/// Enumerations shared across crates.
pub mod enums;
/// Domain errors.
pub mod error;
/// Fee tiers.
pub mod fees;
/// Math utilities.
pub mod math;
/// Batch metrics.
pub mod metrics;
/// Pool information returned by DEX adapters.
pub mod pool;
/// Pending positions.
pub mod position;
/// Tokens, amounts and balances.
pub mod token;
/// Value objects.
pub mod value_objects;

pub use error::DomainError;
