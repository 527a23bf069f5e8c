//! Paired-amount estimation for a concentrated position.
//!
//! Ticks are passed normalized (`u32`, negative ticks offset by 2^32) and are
//! oriented so that `currency_a` is the pool's token0.

use crate::error::AdapterError;
use async_trait::async_trait;
use fleeditto_domain::fees::FeeTier;
use fleeditto_domain::math::concentrated_liquidity::{pair_amount0_for_amount1, pair_amount1_for_amount0};
use fleeditto_domain::math::price_tick::{denormalize_tick, tick_to_sqrt_price};
use fleeditto_domain::token::TokenAmount;
use primitive_types::U256;
use rust_decimal::Decimal;
use tracing::debug;

/// Input of an estimation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstimateRequest {
    pub currency_a: String,
    pub currency_b: String,
    pub fee_tier: FeeTier,
    pub tick_lower: u32,
    pub tick_upper: u32,
    pub current_tick: u32,
    /// Raw amount of the input side.
    pub amount: U256,
}

/// Liquidity minted and the raw amount required on the other side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Estimate {
    pub liquidity: u128,
    pub paired_amount: U256,
}

#[async_trait]
pub trait LiquidityEstimator: Send + Sync {
    /// Amount of `currency_b` that pairs with `amount` of `currency_a`.
    /// `None` when `currency_a` alone cannot fund the range.
    async fn est_currency_b_amount_from_a(
        &self,
        request: &EstimateRequest,
    ) -> Result<Option<Estimate>, AdapterError>;

    /// Amount of `currency_a` that pairs with `amount` of `currency_b`.
    async fn est_currency_a_amount_from_b(
        &self,
        request: &EstimateRequest,
    ) -> Result<Option<Estimate>, AdapterError>;
}

/// Local estimator using the CLMM liquidity formulas.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClmmEstimator;

impl ClmmEstimator {
    pub fn new() -> Self {
        Self
    }

    fn sqrt_prices(request: &EstimateRequest) -> Result<(Decimal, Decimal, Decimal), AdapterError> {
        let current = tick_to_sqrt_price(denormalize_tick(request.current_tick))?;
        let lower = tick_to_sqrt_price(denormalize_tick(request.tick_lower))?;
        let upper = tick_to_sqrt_price(denormalize_tick(request.tick_upper))?;
        Ok((current, lower, upper))
    }
}

#[async_trait]
impl LiquidityEstimator for ClmmEstimator {
    async fn est_currency_b_amount_from_a(
        &self,
        request: &EstimateRequest,
    ) -> Result<Option<Estimate>, AdapterError> {
        let (current, lower, upper) = Self::sqrt_prices(request)?;
        let result = pair_amount1_for_amount0(TokenAmount(request.amount), current, lower, upper)?;
        debug!(
            currency_a = %request.currency_a,
            currency_b = %request.currency_b,
            funded = result.is_some(),
            "Estimated token B amount"
        );
        Ok(result.map(|(liquidity, paired)| Estimate {
            liquidity,
            paired_amount: paired.as_u256(),
        }))
    }

    async fn est_currency_a_amount_from_b(
        &self,
        request: &EstimateRequest,
    ) -> Result<Option<Estimate>, AdapterError> {
        let (current, lower, upper) = Self::sqrt_prices(request)?;
        let result = pair_amount0_for_amount1(TokenAmount(request.amount), current, lower, upper)?;
        debug!(
            currency_a = %request.currency_a,
            currency_b = %request.currency_b,
            funded = result.is_some(),
            "Estimated token A amount"
        );
        Ok(result.map(|(liquidity, paired)| Estimate {
            liquidity,
            paired_amount: paired.as_u256(),
        }))
    }
}
