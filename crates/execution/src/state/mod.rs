//! Application state, its actions, and the store that applies them.

mod action;
mod app_state;
mod reducer;
mod selectors;
mod store;

pub use action::*;
pub use app_state::*;
pub use reducer::*;
pub use selectors::*;
pub use store::*;

#[cfg(test)]
pub(crate) mod fixtures {
    use super::TokenSlot;
    use fleeditto_domain::enums::DexId;
    use fleeditto_domain::fees::FeeTier;
    use fleeditto_domain::position::{PendingPosition, PositionLeg, PositionPoolState};
    use fleeditto_domain::token::{TokenBalance, TokenMetadata};
    use fleeditto_domain::value_objects::PriceRange;
    use primitive_types::U256;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    pub fn metadata(address: &str, decimals: u8) -> TokenMetadata {
        TokenMetadata::new(address, address.trim_start_matches("0x").to_uppercase(), decimals, "Token")
    }

    pub fn slot_with_wallet(address: &str, decimals: u8, raw: u64) -> TokenSlot {
        let balance = TokenBalance::new(address, U256::from(raw), decimals);
        TokenSlot {
            address: address.to_string(),
            metadata: Some(metadata(address, decimals)),
            balance: Some(balance.clone()),
            wallet_balance: Some(balance),
            amount: String::new(),
        }
    }

    fn decimals_of(address: &str) -> u8 {
        if address == "0xb" { 6 } else { 8 }
    }

    /// Position over `0xa`-style addresses; `0xb` has 6 decimals, others 8.
    pub fn pending(a: &str, amount_a: Decimal, b: &str, amount_b: Decimal) -> PendingPosition {
        PendingPosition::new(
            DexId::Hyperion,
            FeeTier::new(2).unwrap(),
            PositionLeg::new(a, metadata(a, decimals_of(a)), amount_a),
            PositionLeg::new(b, metadata(b, decimals_of(b)), amount_b),
            PriceRange::new(dec!(9.5), dec!(10.5)).unwrap(),
            dec!(10),
            dec!(0.5),
            PositionPoolState::Exists,
            None,
        )
    }
}
