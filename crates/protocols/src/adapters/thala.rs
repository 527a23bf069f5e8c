use super::{AddLiquidityParams, DexAdapter};
use crate::error::AdapterError;
use crate::payload::TransactionPayload;
use async_trait::async_trait;
use fleeditto_domain::enums::DexId;
use fleeditto_domain::fees::FeeTier;
use fleeditto_domain::pool::PoolInfo;
use tracing::debug;

/// Thala. Pool discovery is not wired, so every pool reads as missing.
#[derive(Debug, Clone)]
pub struct ThalaAdapter {
    contract_address: String,
}

impl ThalaAdapter {
    pub fn new(contract_address: impl Into<String>) -> Self {
        Self {
            contract_address: contract_address.into(),
        }
    }
}

#[async_trait]
impl DexAdapter for ThalaAdapter {
    fn id(&self) -> DexId {
        DexId::Thala
    }

    async fn check_pool_exists(
        &self,
        token_a: &str,
        token_b: &str,
        fee_tier: FeeTier,
    ) -> Result<PoolInfo, AdapterError> {
        debug!(token_a = %token_a, token_b = %token_b, fee_tier = %fee_tier, "Checking Thala pool");
        Ok(PoolInfo::missing(DexId::Thala, token_a, token_b, fee_tier))
    }

    fn create_add_liquidity_payload(&self, params: &AddLiquidityParams) -> TransactionPayload {
        TransactionPayload::new(
            format!("{}::pool::add_liquidity", self.contract_address),
            params.type_arguments(),
            params.amount_arguments().to_vec(),
        )
    }

    fn contract_address(&self) -> &str {
        &self.contract_address
    }
}
