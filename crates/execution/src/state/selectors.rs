//! Read-only views over [`AppState`].

use super::AppState;
use fleeditto_domain::position::PendingPosition;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Outcome of a balance check for both sides of a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceCheck {
    pub has_enough_token_a: bool,
    pub has_enough_token_b: bool,
    /// Formatted available balances, `"0.00"` when unknown.
    pub available_token_a: String,
    pub available_token_b: String,
}

impl BalanceCheck {
    pub fn has_sufficient_balance(&self) -> bool {
        self.has_enough_token_a && self.has_enough_token_b
    }
}

/// Spendable balance of `address`, formatted. `"0.00"` if neither slot holds it.
pub fn available_balance(state: &AppState, address: &str) -> String {
    [&state.token_a, &state.token_b]
        .into_iter()
        .find(|slot| slot.is_selected() && slot.address == address)
        .and_then(|slot| slot.balance.as_ref())
        .map(|b| b.formatted.clone())
        .unwrap_or_else(|| "0.00".to_string())
}

fn available_decimal(state: &AppState, address: &str) -> Decimal {
    Decimal::from_str(&available_balance(state, address)).unwrap_or_default()
}

/// Whether the spendable balances cover the given amounts. Amounts that do not
/// parse count as covered.
pub fn check_sufficient_balance(
    state: &AppState,
    token_a: &str,
    amount_a: &str,
    token_b: &str,
    amount_b: &str,
) -> BalanceCheck {
    let covers = |address: &str, amount: &str| {
        let required = if amount.trim().is_empty() { "0" } else { amount.trim() };
        match Decimal::from_str(required) {
            Ok(required) => required <= available_decimal(state, address),
            Err(_) => true,
        }
    };
    BalanceCheck {
        has_enough_token_a: covers(token_a, amount_a),
        has_enough_token_b: covers(token_b, amount_b),
        available_token_a: available_balance(state, token_a),
        available_token_b: available_balance(state, token_b),
    }
}

/// Pending positions whose tokens are in neither slot any more. Their
/// reservations no longer reduce any displayed balance.
pub fn orphaned_positions(state: &AppState) -> Vec<&PendingPosition> {
    let selected: Vec<&str> = [&state.token_a, &state.token_b]
        .into_iter()
        .filter(|slot| slot.is_selected())
        .map(|slot| slot.address.as_str())
        .collect();
    state
        .pending_positions
        .iter()
        .filter(|p| !selected.iter().any(|address| p.references(address)))
        .collect()
}
