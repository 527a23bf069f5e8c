use crate::error::DomainError;
use crate::fees::FeeTier;
use crate::math::MathError;
use crate::math::price_tick::{decimals_ratio, price_to_tick, tick_to_price};
use rust_decimal::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Half-width of the range applied when a relative price first arrives.
pub const DEFAULT_RANGE_WIDTH: Decimal = Decimal::from_parts(15, 0, 0, false, 2);

/// A closed price interval `[min_price, max_price]` with `0 < min < max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min_price: Decimal,
    pub max_price: Decimal,
}

impl PriceRange {
    pub fn new(min_price: Decimal, max_price: Decimal) -> Result<Self, DomainError> {
        if min_price <= Decimal::ZERO || min_price >= max_price {
            return Err(DomainError::InvalidPriceRange {
                min: min_price.to_string(),
                max: max_price.to_string(),
            });
        }
        Ok(Self {
            min_price,
            max_price,
        })
    }

    /// `price ± 15%`.
    pub fn default_around(price: Decimal) -> Result<Self, DomainError> {
        Self::new(
            price * (Decimal::ONE - DEFAULT_RANGE_WIDTH),
            price * (Decimal::ONE + DEFAULT_RANGE_WIDTH),
        )
    }

    /// Builds a preset range around `current_price`.
    ///
    /// Fee tier 0 uses fixed absolute half-widths. Other tiers widen by whole
    /// tick-spacing steps around the current tick when both token decimals are
    /// known, and by a plain percentage otherwise.
    pub fn from_preset(
        preset: RangePreset,
        current_price: Decimal,
        fee_tier: Option<FeeTier>,
        decimals: Option<(u8, u8)>,
    ) -> Result<Self, DomainError> {
        if fee_tier.map(|t| t.index()) == Some(0) {
            let half = preset.absolute_half_width();
            return Self::new(current_price - half, current_price + half);
        }

        let pct = preset.percentage();
        let percentage_range = || {
            Self::new(
                current_price * (Decimal::ONE - pct),
                current_price * (Decimal::ONE + pct),
            )
        };

        match (fee_tier, decimals) {
            (Some(tier), Some((decimals_a, decimals_b))) => {
                match tick_range_prices(current_price, pct, tier, decimals_ratio(decimals_a, decimals_b)) {
                    Ok((min, max)) => Self::new(min, max).or_else(|_| percentage_range()),
                    Err(_) => percentage_range(),
                }
            }
            _ => percentage_range(),
        }
    }

    pub fn contains(&self, price: Decimal) -> bool {
        price >= self.min_price && price <= self.max_price
    }

    /// Range width relative to `current_price`, in percent.
    pub fn width_percentage(&self, current_price: Decimal) -> Option<Decimal> {
        if current_price.is_zero() {
            return None;
        }
        Some((self.max_price - self.min_price) / current_price * Decimal::ONE_HUNDRED)
    }
}

/// Quick range presets offered next to manual entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangePreset {
    /// ±1%
    Tight,
    /// ±5%
    Medium,
    /// ±10%
    Wide,
}

impl RangePreset {
    pub fn percentage(&self) -> Decimal {
        match self {
            Self::Tight => Decimal::new(1, 2),
            Self::Medium => Decimal::new(5, 2),
            Self::Wide => Decimal::new(10, 2),
        }
    }

    /// Absolute half-width used for the ultra-stable tier.
    pub fn absolute_half_width(&self) -> Decimal {
        match self {
            Self::Tight => Decimal::new(1, 4),
            Self::Medium => Decimal::new(2, 4),
            Self::Wide => Decimal::new(5, 4),
        }
    }
}

/// Tick distance for a percentage width: `max(spacing, round(pct * 10000 / spacing) * spacing)`.
pub fn preset_tick_range(percentage: Decimal, tick_spacing: u32) -> i32 {
    let spacing = Decimal::from(tick_spacing.max(1));
    let half_up = |d: Decimal| d.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let desired = half_up(percentage * Decimal::ONE_HUNDRED * Decimal::ONE_HUNDRED);
    let steps = half_up(desired / spacing);
    let range = (steps * spacing).to_i32().unwrap_or(i32::MAX);
    range.max(tick_spacing as i32)
}

fn tick_range_prices(
    current_price: Decimal,
    percentage: Decimal,
    fee_tier: FeeTier,
    ratio: Decimal,
) -> Result<(Decimal, Decimal), MathError> {
    let current_tick = price_to_tick(current_price, fee_tier, ratio)?;
    let range = preset_tick_range(percentage, fee_tier.tick_spacing());
    let min = tick_to_price(current_tick.saturating_sub(range), ratio)?;
    let max = tick_to_price(current_tick.saturating_add(range), ratio)?;
    Ok((min, max))
}
