//! Pending positions and their batched submission.

mod pending;

pub use pending::*;
