//! Aptos protocol integrations: chain reads, DEX adapters, Hyperion indexer
//! queries, and the entry payloads the dashboard submits.

pub mod adapters;
pub mod batch_contract;
pub mod config;
pub mod error;
pub mod estimator;
pub mod graphql;
pub mod payload;
pub mod price_service;
pub mod rpc;
pub mod token_service;

pub use adapters::{AdapterFactory, AddLiquidityParams, DexAdapter, HyperionAdapter, TokenOrder};
pub use error::{AdapterError, ChainError, GraphQlError, PriceError};
pub use estimator::{ClmmEstimator, Estimate, EstimateRequest, LiquidityEstimator};
pub use fleeditto_domain::enums::DexId;
pub use graphql::{HyperionGraphQl, HyperionIndexer};
pub use payload::TransactionPayload;
pub use rpc::{AptosRestClient, ChainView};
