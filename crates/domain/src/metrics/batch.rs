use crate::position::PendingPosition;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Aggregate statistics over the pending batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub position_count: usize,
    pub total_value_usd: Decimal,
    /// Value-weighted average APR in percent.
    pub weighted_apr: Decimal,
    pub estimated_annual_income: Decimal,
}

impl BatchSummary {
    /// Summarizes `positions` using USD prices keyed by token address.
    pub fn compute(positions: &[PendingPosition], prices: &HashMap<String, Decimal>) -> Self {
        let mut total_value = Decimal::ZERO;
        let mut weighted_sum = Decimal::ZERO;
        let mut weighted_value = Decimal::ZERO;

        for position in positions {
            let value = position.usd_value(prices);
            total_value += value;

            let apr = position.total_apr();
            if value > Decimal::ZERO && apr > Decimal::ZERO {
                weighted_sum += value * apr;
                weighted_value += value;
            }
        }

        let weighted_apr = if weighted_value.is_zero() {
            Decimal::ZERO
        } else {
            weighted_sum / weighted_value
        };

        Self {
            position_count: positions.len(),
            total_value_usd: total_value,
            weighted_apr,
            estimated_annual_income: total_value * weighted_apr / Decimal::ONE_HUNDRED,
        }
    }
}
