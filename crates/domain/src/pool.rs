use crate::enums::DexId;
use crate::fees::FeeTier;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Result of a pool-existence check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolInfo {
    pub dex: DexId,
    pub exists: bool,
    pub pool_address: Option<String>,
    pub token_a: String,
    pub token_b: String,
    pub fee_tier: FeeTier,
}

impl PoolInfo {
    pub fn missing(dex: DexId, token_a: &str, token_b: &str, fee_tier: FeeTier) -> Self {
        Self {
            dex,
            exists: false,
            pool_address: None,
            token_a: token_a.to_string(),
            token_b: token_b.to_string(),
            fee_tier,
        }
    }
}

/// On-chain pool state as reported by the stats indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub current_tick: Option<i64>,
    pub sqrt_price: Option<String>,
    pub token1: Option<String>,
    pub token2: Option<String>,
}

/// Aggregated 24h statistics of a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    pub id: String,
    pub daily_volume_usd: Decimal,
    pub farm_apr: Decimal,
    pub fee_apr: Decimal,
    pub fees_usd: Decimal,
    pub tvl_usd: Decimal,
    pub pool: Option<PoolSnapshot>,
}

impl PoolStats {
    pub fn total_apr(&self) -> Decimal {
        self.farm_apr + self.fee_apr
    }
}

/// Pool identifier and current tick resolved for a token pair and fee tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolLookup {
    pub pool_id: String,
    /// As reported by the indexer, signed or already normalized.
    pub current_tick: Option<i64>,
}

/// Cache key of a pool-existence check: `tokenA-tokenB-feeTier-network`.
pub fn pool_key(token_a: &str, token_b: &str, fee_tier: FeeTier, network: &str) -> String {
    format!("{}-{}-{}-{}", token_a, token_b, fee_tier.index(), network)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_pool_key() {
        let tier = FeeTier::new(2).unwrap();
        assert_eq!(pool_key("0xa", "0xb", tier, "mainnet"), "0xa-0xb-2-mainnet");
    }

    #[test]
    fn test_stats_total_apr() {
        let stats = PoolStats {
            id: "0xpool".to_string(),
            daily_volume_usd: dec!(1000),
            farm_apr: dec!(12.5),
            fee_apr: dec!(3.5),
            fees_usd: dec!(3),
            tvl_usd: dec!(50000),
            pool: None,
        };
        assert_eq!(stats.total_apr(), dec!(16));
    }
}
