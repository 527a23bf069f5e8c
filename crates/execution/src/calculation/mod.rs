//! Paired-amount calculation for concentrated-liquidity positions.

mod calculator;

pub use calculator::*;
