//! Positions already held on chain.

mod user_positions;

pub use user_positions::*;
