//! Pure state transitions.

use super::{Action, AppState, TokenSlot};
use fleeditto_domain::enums::PoolState;
use fleeditto_domain::position::PendingPosition;
use primitive_types::U256;

/// Applies `action` to `state`.
///
/// Switching DEX, fee tier or either token address invalidates any previous
/// pool check. Pending reservations are deducted from the spendable balance of
/// the slot holding the same token address.
#[must_use]
pub fn reduce(mut state: AppState, action: Action) -> AppState {
    match action {
        Action::SetSelectedDex(dex) => {
            state.selected_dex = dex;
            invalidate_pool(&mut state);
        }
        Action::SetFeeTier(fee_tier) => {
            state.fee_tier = fee_tier;
            invalidate_pool(&mut state);
        }
        Action::SetTokenAddress(side, address) => {
            state.slot_mut(side).address = address;
            invalidate_pool(&mut state);
        }
        Action::SetTokenMetadata(side, metadata) => state.slot_mut(side).metadata = metadata,
        Action::SetTokenBalance(side, balance) => state.slot_mut(side).balance = balance,
        Action::SetTokenWalletBalance(side, balance) => {
            state.slot_mut(side).wallet_balance = balance;
            let pending = std::mem::take(&mut state.pending_positions);
            refresh_balance(state.slot_mut(side), &pending);
            state.pending_positions = pending;
        }
        Action::SetTokenAmount(side, amount) => state.slot_mut(side).amount = amount,
        Action::SetCurrentPrice(price) => state.current_price = price,
        Action::SetPriceRange {
            min_price,
            max_price,
        } => {
            state.min_price = min_price;
            state.max_price = max_price;
        }
        Action::SetSlippageTolerance(slippage) => state.slippage_tolerance = slippage,
        Action::SetPoolState(pool_state) => state.pool_state = pool_state,
        Action::SetPoolStats(stats) => state.pool_stats = stats,
        Action::SetLoading(loading) => state.is_loading = loading,
        Action::SetError(error) => state.error = error,
        Action::SetSubmitting(submitting) => state.is_submitting = submitting,
        Action::SetTransactionHash(hash) => state.transaction_hash = hash,
        Action::AddPendingPosition(position) => {
            state.pending_positions.push(position);
            refresh_balances(&mut state);
        }
        Action::RemovePendingPosition(id) => {
            let before = state.pending_positions.len();
            state.pending_positions.retain(|p| p.id != id);
            if state.pending_positions.len() == before {
                return state;
            }
            refresh_balances(&mut state);
        }
        Action::ClearPendingPositions => {
            state.pending_positions.clear();
            for slot in [&mut state.token_a, &mut state.token_b] {
                if slot.wallet_balance.is_some() {
                    slot.balance = slot.wallet_balance.clone();
                }
            }
        }
        Action::ResetState => state = AppState::default(),
    }
    state
}

fn invalidate_pool(state: &mut AppState) {
    state.pool_state = PoolState::Idle;
    state.pool_stats = None;
}

fn refresh_balances(state: &mut AppState) {
    refresh_balance(&mut state.token_a, &state.pending_positions);
    refresh_balance(&mut state.token_b, &state.pending_positions);
}

/// Sets `balance = wallet_balance - reserved`, saturating at zero. Slots
/// without a wallet read keep their current balance.
fn refresh_balance(slot: &mut TokenSlot, pending: &[PendingPosition]) {
    let Some(wallet) = &slot.wallet_balance else {
        return;
    };
    let reserved = reserved_amount(&slot.address, pending);
    slot.balance = Some(wallet.with_raw(wallet.raw.saturating_sub(reserved)));
}

/// Raw amount of `address` reserved across all pending positions.
pub fn reserved_amount(address: &str, pending: &[PendingPosition]) -> U256 {
    if address.is_empty() {
        return U256::zero();
    }
    pending
        .iter()
        .map(|p| p.reserved_for(address))
        .fold(U256::zero(), |acc, r| acc.saturating_add(r))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::fixtures::{pending, slot_with_wallet};
    use fleeditto_domain::enums::{DexId, TokenSide};
    use fleeditto_domain::fees::FeeTier;
    use fleeditto_domain::pool::PoolStats;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn funded_state() -> AppState {
        AppState {
            token_a: slot_with_wallet("0xa", 8, 1_000_00000000),
            token_b: slot_with_wallet("0xb", 6, 500_000000),
            ..AppState::default()
        }
    }

    fn raw(slot: &TokenSlot) -> U256 {
        slot.balance.as_ref().map(|b| b.raw).unwrap_or_default()
    }

    fn stats() -> PoolStats {
        PoolStats {
            id: "0xpool".to_string(),
            daily_volume_usd: dec!(1),
            farm_apr: dec!(1),
            fee_apr: dec!(1),
            fees_usd: dec!(1),
            tvl_usd: dec!(1),
            pool: None,
        }
    }

    #[test]
    fn test_selection_changes_invalidate_pool() {
        let actions = [
            Action::SetSelectedDex(Some(DexId::Tapp)),
            Action::SetFeeTier(Some(FeeTier::new(1).unwrap())),
            Action::SetTokenAddress(TokenSide::A, "0xc".to_string()),
            Action::SetTokenAddress(TokenSide::B, "0xd".to_string()),
        ];
        for action in actions {
            let state = AppState {
                pool_state: PoolState::Exists,
                pool_stats: Some(stats()),
                ..AppState::default()
            };
            let next = reduce(state, action);
            assert_eq!(next.pool_state, PoolState::Idle);
            assert!(next.pool_stats.is_none());
        }
    }

    #[test]
    fn test_other_actions_keep_pool_state() {
        let state = AppState {
            pool_state: PoolState::Exists,
            ..AppState::default()
        };
        let next = reduce(state, Action::SetTokenAmount(TokenSide::A, "1".to_string()));
        assert_eq!(next.pool_state, PoolState::Exists);
    }

    #[test]
    fn test_add_deducts_cumulatively() {
        let first = pending("0xa", dec!(100), "0xb", dec!(50));
        let second = pending("0xa", dec!(250.5), "0xb", dec!(25));
        let state = reduce(funded_state(), Action::AddPendingPosition(first));
        let state = reduce(state, Action::AddPendingPosition(second));

        assert_eq!(raw(&state.token_a), U256::from(649_50000000u64));
        assert_eq!(raw(&state.token_b), U256::from(425_000000u64));
        assert_eq!(state.token_a.balance.as_ref().unwrap().formatted, "649.5");
        // Wallet balances are never touched.
        assert_eq!(
            state.token_a.wallet_balance.as_ref().unwrap().raw,
            U256::from(1_000_00000000u64)
        );
    }

    #[test]
    fn test_deduction_saturates_at_zero() {
        let state = reduce(
            funded_state(),
            Action::AddPendingPosition(pending("0xa", dec!(5000), "0xb", dec!(1))),
        );
        assert_eq!(raw(&state.token_a), U256::zero());
    }

    #[test]
    fn test_remove_restores_exactly() {
        let first = pending("0xa", dec!(100), "0xb", dec!(50));
        let second = pending("0xa", dec!(10), "0xb", dec!(5));
        let second_id = second.id.clone();
        let state = reduce(funded_state(), Action::AddPendingPosition(first));
        let after_first = state.clone();
        let state = reduce(state, Action::AddPendingPosition(second));
        let state = reduce(state, Action::RemovePendingPosition(second_id));

        assert_eq!(state, after_first);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let state = reduce(
            funded_state(),
            Action::AddPendingPosition(pending("0xa", dec!(1), "0xb", dec!(1))),
        );
        let next = reduce(state.clone(), Action::RemovePendingPosition("missing".to_string()));
        assert_eq!(next, state);
    }

    #[test]
    fn test_clear_restores_wallet_balance() {
        let mut state = funded_state();
        for i in 1..=3 {
            state = reduce(
                state,
                Action::AddPendingPosition(pending("0xa", Decimal::from(i), "0xb", dec!(1.25))),
            );
        }
        let state = reduce(state, Action::ClearPendingPositions);
        assert!(state.pending_positions.is_empty());
        assert_eq!(state.token_a.balance, state.token_a.wallet_balance);
        assert_eq!(state.token_b.balance, state.token_b.wallet_balance);
    }

    #[test]
    fn test_positions_on_other_tokens_do_not_deduct() {
        let state = reduce(
            funded_state(),
            Action::AddPendingPosition(pending("0xc", dec!(1), "0xd", dec!(1))),
        );
        assert_eq!(state.token_a.balance, state.token_a.wallet_balance);
        assert_eq!(state.pending_positions.len(), 1);
    }

    #[test]
    fn test_wallet_refresh_keeps_reservations() {
        let state = reduce(
            funded_state(),
            Action::AddPendingPosition(pending("0xa", dec!(100), "0xb", dec!(0))),
        );
        let refreshed = slot_with_wallet("0xa", 8, 2_000_00000000).wallet_balance;
        let state = reduce(state, Action::SetTokenWalletBalance(TokenSide::A, refreshed));
        assert_eq!(raw(&state.token_a), U256::from(1_900_00000000u64));
    }

    #[test]
    fn test_reset() {
        let state = reduce(funded_state(), Action::SetError(Some("boom".to_string())));
        assert_eq!(reduce(state, Action::ResetState), AppState::default());
    }
}
