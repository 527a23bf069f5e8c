//! DEX adapters behind a common capability interface.

mod factory;
mod hyperion;
mod tapp;
mod thala;

pub use factory::*;
pub use hyperion::*;
pub use tapp::*;
pub use thala::*;

use crate::error::AdapterError;
use crate::estimator::LiquidityEstimator;
use crate::payload::TransactionPayload;
use async_trait::async_trait;
use fleeditto_domain::enums::DexId;
use fleeditto_domain::fees::FeeTier;
use fleeditto_domain::pool::PoolInfo;
use primitive_types::U256;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::sync::Arc;

/// Fee tier indices every adapter offers, ordered by fee: 0.01%, 0.05%, 0.1%, 0.25%, 0.3%.
pub const SUPPORTED_FEE_TIER_INDICES: [u8; 5] = [0, 1, 2, 4, 5];

/// Arguments of an add-liquidity transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddLiquidityParams {
    pub token_a: String,
    pub token_b: String,
    /// Raw amounts.
    pub amount_a: U256,
    pub amount_b: U256,
    pub min_price: Decimal,
    pub max_price: Decimal,
    /// Percent, e.g. `0.5` for 0.5%.
    pub slippage_tolerance: Decimal,
    pub user_address: String,
}

impl AddLiquidityParams {
    pub(crate) fn type_arguments(&self) -> Vec<String> {
        vec![self.token_a.clone(), self.token_b.clone()]
    }

    pub(crate) fn amount_arguments(&self) -> [Value; 2] {
        [u256_arg(self.amount_a), u256_arg(self.amount_b)]
    }
}

/// Capability interface shared by all DEX integrations.
#[async_trait]
pub trait DexAdapter: Send + Sync {
    fn id(&self) -> DexId;

    async fn check_pool_exists(
        &self,
        token_a: &str,
        token_b: &str,
        fee_tier: FeeTier,
    ) -> Result<PoolInfo, AdapterError>;

    fn create_add_liquidity_payload(&self, params: &AddLiquidityParams) -> TransactionPayload;

    fn contract_address(&self) -> &str;

    fn supported_fee_tiers(&self) -> Vec<FeeTier> {
        SUPPORTED_FEE_TIER_INDICES
            .into_iter()
            .filter_map(|index| FeeTier::new(index).ok())
            .collect()
    }

    /// Paired-amount estimator, for DEXes that expose one.
    fn estimator(&self) -> Option<Arc<dyn LiquidityEstimator>> {
        None
    }
}

/// Token ordering as enforced by the pool contracts.
#[async_trait]
pub trait TokenOrder: Send + Sync {
    /// Whether `token_a` is the pool's token0.
    async fn is_sorted(&self, token_a: &str, token_b: &str) -> Result<bool, AdapterError>;
}

/// Move `u64`/`u128` arguments travel as decimal strings.
pub(crate) fn u256_arg(value: U256) -> Value {
    json!(value.to_string())
}

/// Converts a slippage percentage into basis points.
pub fn slippage_bps(slippage_percent: Decimal) -> Result<u64, AdapterError> {
    use rust_decimal::prelude::ToPrimitive;
    (slippage_percent * Decimal::ONE_HUNDRED)
        .round()
        .to_u64()
        .ok_or_else(|| AdapterError::InvalidPayload(format!("slippage {slippage_percent}")))
}
