//! Dashboard execution core.
//!
//! This crate owns everything between the user's inputs and the chain:
//! - Application state, its actions and the store that applies them
//! - Paired-amount calculation with stale-result protection
//! - The pending position batch and its atomic submission
//! - Pool, price and APR synchronization
//! - On-chain positions with optimistic remove and claim

/// Prelude module for convenient imports.
pub mod prelude;

/// Pending position batch.
pub mod batch;
/// Liquidity calculation.
pub mod calculation;
/// User positions.
pub mod positions;
/// Wallet boundary.
pub mod signer;
/// Application state.
pub mod state;
/// State synchronization.
pub mod sync;

#[cfg(test)]
pub(crate) mod test_support;
