use crate::enums::{DexId, PoolState};
use crate::error::DomainError;
use crate::fees::FeeTier;
use crate::token::{TokenMetadata, raw_from_decimal};
use crate::value_objects::PriceRange;
use chrono::{DateTime, Utc};
use primitive_types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// One token side of a pending position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionLeg {
    pub address: String,
    pub metadata: TokenMetadata,
    /// Human-unit amount reserved from the wallet.
    pub amount: Decimal,
}

impl PositionLeg {
    pub fn new(address: impl Into<String>, metadata: TokenMetadata, amount: Decimal) -> Self {
        Self {
            address: address.into(),
            metadata,
            amount,
        }
    }

    /// Reserved amount in raw units of this leg's own decimals.
    pub fn raw_amount(&self) -> Result<U256, DomainError> {
        raw_from_decimal(self.amount, self.metadata.decimals)
    }

    /// USD value; a missing price contributes zero.
    pub fn usd_value(&self, prices: &HashMap<String, Decimal>) -> Decimal {
        prices
            .get(&self.address)
            .map(|price| self.amount * price)
            .unwrap_or(Decimal::ZERO)
    }
}

/// Whether the pool existed when the position was queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionPoolState {
    Exists,
    NotExists,
}

impl From<PoolState> for PositionPoolState {
    fn from(state: PoolState) -> Self {
        match state {
            PoolState::Exists => Self::Exists,
            _ => Self::NotExists,
        }
    }
}

/// APR estimate captured when the position was queued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AprData {
    pub farm_apr: Decimal,
    pub fee_apr: Decimal,
    pub total_apr: Decimal,
    pub daily_volume: Decimal,
}

impl AprData {
    pub fn new(farm_apr: Decimal, fee_apr: Decimal, daily_volume: Decimal) -> Self {
        Self {
            farm_apr,
            fee_apr,
            total_apr: farm_apr + fee_apr,
            daily_volume,
        }
    }
}

/// Immutable snapshot of a position queued for the next batch transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingPosition {
    pub id: String,
    pub dex: DexId,
    pub fee_tier: FeeTier,
    pub token_a: PositionLeg,
    pub token_b: PositionLeg,
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub current_price: Decimal,
    pub slippage_tolerance: Decimal,
    pub pool_state: PositionPoolState,
    pub timestamp: DateTime<Utc>,
    pub apr_data: Option<AprData>,
}

impl PendingPosition {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        dex: DexId,
        fee_tier: FeeTier,
        token_a: PositionLeg,
        token_b: PositionLeg,
        range: PriceRange,
        current_price: Decimal,
        slippage_tolerance: Decimal,
        pool_state: PositionPoolState,
        apr_data: Option<AprData>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            dex,
            fee_tier,
            token_a,
            token_b,
            min_price: range.min_price,
            max_price: range.max_price,
            current_price,
            slippage_tolerance,
            pool_state,
            timestamp: Utc::now(),
            apr_data,
        }
    }

    pub fn legs(&self) -> [&PositionLeg; 2] {
        [&self.token_a, &self.token_b]
    }

    /// Raw amount this position reserves of `address`, summed over both legs.
    pub fn reserved_for(&self, address: &str) -> U256 {
        self.legs()
            .into_iter()
            .filter(|leg| leg.address == address)
            .filter_map(|leg| leg.raw_amount().ok())
            .fold(U256::zero(), |acc, raw| acc.saturating_add(raw))
    }

    pub fn references(&self, address: &str) -> bool {
        self.token_a.address == address || self.token_b.address == address
    }

    pub fn usd_value(&self, prices: &HashMap<String, Decimal>) -> Decimal {
        self.token_a.usd_value(prices) + self.token_b.usd_value(prices)
    }

    pub fn total_apr(&self) -> Decimal {
        self.apr_data
            .as_ref()
            .map(|apr| apr.total_apr)
            .unwrap_or(Decimal::ZERO)
    }
}

/// A liquidity position already held on chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPosition {
    /// Position object address.
    pub position_id: String,
    pub pool_id: String,
    pub token_a: String,
    pub token_b: String,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub value_usd: Decimal,
    pub unclaimed_fees_usd: Decimal,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn leg(address: &str, decimals: u8, amount: Decimal) -> PositionLeg {
        PositionLeg::new(address, TokenMetadata::new(address, "TKN", decimals, "Token"), amount)
    }

    pub fn position(a: PositionLeg, b: PositionLeg, apr: Option<AprData>) -> PendingPosition {
        PendingPosition::new(
            DexId::Hyperion,
            FeeTier::new(2).unwrap(),
            a,
            b,
            PriceRange::new(Decimal::new(95, 1), Decimal::new(105, 1)).unwrap(),
            Decimal::TEN,
            Decimal::new(5, 1),
            PositionPoolState::Exists,
            apr,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{leg, position};
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reserved_amounts_use_leg_decimals() {
        let p = position(leg("0xa", 8, dec!(1.5)), leg("0xb", 6, dec!(15)), None);
        assert_eq!(p.reserved_for("0xa"), U256::from(150_000_000u64));
        assert_eq!(p.reserved_for("0xb"), U256::from(15_000_000u64));
        assert_eq!(p.reserved_for("0xc"), U256::zero());
    }

    #[test]
    fn test_same_token_on_both_legs_accumulates() {
        let p = position(leg("0xa", 6, dec!(1)), leg("0xa", 6, dec!(2)), None);
        assert_eq!(p.reserved_for("0xa"), U256::from(3_000_000u64));
    }

    #[test]
    fn test_usd_value_missing_price() {
        let p = position(leg("0xa", 8, dec!(2)), leg("0xb", 6, dec!(20)), None);
        let prices = HashMap::from([("0xa".to_string(), dec!(10))]);
        assert_eq!(p.usd_value(&prices), dec!(20));
    }

    #[test]
    fn test_unique_ids() {
        let a = position(leg("0xa", 8, dec!(1)), leg("0xb", 6, dec!(1)), None);
        let b = position(leg("0xa", 8, dec!(1)), leg("0xb", 6, dec!(1)), None);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_apr_total() {
        let apr = AprData::new(dec!(10), dec!(5.5), dec!(1000));
        assert_eq!(apr.total_apr, dec!(15.5));
        let p = position(leg("0xa", 8, dec!(1)), leg("0xb", 6, dec!(1)), Some(apr));
        assert_eq!(p.total_apr(), dec!(15.5));
    }

    #[test]
    fn test_pool_state_conversion() {
        assert_eq!(PositionPoolState::from(PoolState::Exists), PositionPoolState::Exists);
        assert_eq!(PositionPoolState::from(PoolState::NotExists), PositionPoolState::NotExists);
    }
}
