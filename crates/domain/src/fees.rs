use crate::error::DomainError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tick spacing per fee tier index, as laid out by the Hyperion pool factory.
pub const TICK_SPACING_VEC: [u32; 6] = [1, 10, 60, 200, 20, 50];

/// Fee tier index into [`TICK_SPACING_VEC`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct FeeTier(u8);

impl FeeTier {
    /// Highest valid index.
    pub const MAX_INDEX: u8 = 5;

    pub fn new(index: u8) -> Result<Self, DomainError> {
        if index > Self::MAX_INDEX {
            return Err(DomainError::InvalidFeeTier(index));
        }
        Ok(Self(index))
    }

    /// All tiers in index order.
    pub fn all() -> impl Iterator<Item = FeeTier> {
        (0..=Self::MAX_INDEX).map(FeeTier)
    }

    #[must_use]
    pub fn index(&self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn tick_spacing(&self) -> u32 {
        TICK_SPACING_VEC[self.0 as usize]
    }

    /// Swap fee in percent, e.g. `0.05` for 0.05%.
    #[must_use]
    pub fn percentage(&self) -> Decimal {
        fee_percentage_for_spacing(self.tick_spacing())
    }

    /// Display label such as `0.05%` or `1%`.
    #[must_use]
    pub fn label(&self) -> String {
        fee_label(self.percentage())
    }

    #[must_use]
    pub fn description(&self) -> &'static str {
        fee_description(self.percentage())
    }

    /// Multiplier applied to the current price when widening a preset range.
    #[must_use]
    pub fn range_multiplier(&self) -> Decimal {
        match self.0 {
            0 => Decimal::new(1, 2),
            1 => Decimal::new(5, 2),
            2 => Decimal::new(2, 1),
            3 => Decimal::ONE,
            4 => Decimal::new(5, 1),
            _ => Decimal::new(8, 1),
        }
    }
}

impl TryFrom<u8> for FeeTier {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FeeTier> for u8 {
    fn from(tier: FeeTier) -> Self {
        tier.0
    }
}

impl fmt::Display for FeeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fee percentage for a tick spacing. Unknown spacings map to zero.
pub fn fee_percentage_for_spacing(tick_spacing: u32) -> Decimal {
    match tick_spacing {
        1 => Decimal::new(1, 2),
        10 => Decimal::new(5, 2),
        60 => Decimal::new(1, 1),
        200 => Decimal::ONE,
        20 => Decimal::new(25, 2),
        50 => Decimal::new(3, 1),
        _ => Decimal::ZERO,
    }
}

pub fn fee_label(percentage: Decimal) -> String {
    if percentage < Decimal::new(1, 1) {
        format!("{:.2}%", percentage)
    } else if percentage < Decimal::ONE {
        format!("{}%", percentage.normalize())
    } else {
        format!("{:.0}%", percentage)
    }
}

pub fn fee_description(percentage: Decimal) -> &'static str {
    if percentage <= Decimal::new(1, 2) {
        "Ultra Stable"
    } else if percentage <= Decimal::new(5, 2) {
        "Stable"
    } else if percentage <= Decimal::new(1, 1) {
        "Blue Chip"
    } else if percentage <= Decimal::new(25, 2) {
        "Standard"
    } else if percentage <= Decimal::new(3, 1) {
        "Most Pairs"
    } else {
        "Volatile"
    }
}
