//! Services that keep [`crate::state::AppState`] in step with chain and indexer data.

mod apr;
mod pool_monitor;
mod price_sync;

pub use apr::*;
pub use pool_monitor::*;
pub use price_sync::*;
