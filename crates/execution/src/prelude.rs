//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use fleeditto_execution::prelude::*;
//! ```

// Batch
pub use crate::batch::{BatchConfig, BatchError, PendingBatch, build_args};

// Calculation
pub use crate::calculation::{
    Calculation, CalculationError, CalculatorConfig, LiquidityCalculator, LiquidityForm, TickSet,
};

// Positions
pub use crate::positions::{PositionError, PositionsConfig, UserPositions, explorer_url};

// Signer
pub use crate::signer::{SignerError, TransactionSigner};

// State
pub use crate::state::{
    Action, AppState, BalanceCheck, Store, TokenSlot, available_balance, check_sufficient_balance,
    orphaned_positions, reduce,
};

// Sync
pub use crate::sync::{AprConfig, AprError, AprFetcher, AprSnapshot, PoolMonitor, PriceSync, should_fetch};
