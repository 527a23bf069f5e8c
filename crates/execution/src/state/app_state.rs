//! Dashboard state shared by every component.

use fleeditto_domain::enums::{DexId, PoolState, TokenSide};
use fleeditto_domain::fees::FeeTier;
use fleeditto_domain::pool::PoolStats;
use fleeditto_domain::position::PendingPosition;
use fleeditto_domain::token::{TokenBalance, TokenMetadata};
use fleeditto_domain::value_objects::PriceRange;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default slippage tolerance, in percent.
pub const DEFAULT_SLIPPAGE_TOLERANCE: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// One of the two token inputs of the position form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSlot {
    /// Fungible-asset address, empty when nothing is selected.
    pub address: String,
    /// Resolved metadata.
    pub metadata: Option<TokenMetadata>,
    /// Spendable balance: wallet balance minus pending reservations.
    pub balance: Option<TokenBalance>,
    /// Balance as read from the wallet, never deducted.
    pub wallet_balance: Option<TokenBalance>,
    /// Amount typed or calculated for this side.
    pub amount: String,
}

impl TokenSlot {
    pub fn is_selected(&self) -> bool {
        !self.address.is_empty()
    }
}

/// Aggregate root of the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    /// Selected DEX.
    pub selected_dex: Option<DexId>,
    /// Selected fee tier.
    pub fee_tier: Option<FeeTier>,
    /// First token of the pair.
    pub token_a: TokenSlot,
    /// Second token of the pair.
    pub token_b: TokenSlot,
    /// Price of token A in token B.
    pub current_price: Option<Decimal>,
    /// Lower bound of the position range.
    pub min_price: Option<Decimal>,
    /// Upper bound of the position range.
    pub max_price: Option<Decimal>,
    /// Slippage tolerance in percent.
    pub slippage_tolerance: Decimal,
    /// Existence of the selected pool.
    pub pool_state: PoolState,
    /// Stats of the selected pool, when it exists.
    pub pool_stats: Option<PoolStats>,
    /// Global loading flag.
    pub is_loading: bool,
    /// Last user-facing error.
    pub error: Option<String>,
    /// Whether a batch transaction is in flight.
    pub is_submitting: bool,
    /// Hash of the last submitted transaction.
    pub transaction_hash: Option<String>,
    /// Positions queued for the next batch.
    pub pending_positions: Vec<PendingPosition>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            selected_dex: None,
            fee_tier: None,
            token_a: TokenSlot::default(),
            token_b: TokenSlot::default(),
            current_price: None,
            min_price: None,
            max_price: None,
            slippage_tolerance: DEFAULT_SLIPPAGE_TOLERANCE,
            pool_state: PoolState::Idle,
            pool_stats: None,
            is_loading: false,
            error: None,
            is_submitting: false,
            transaction_hash: None,
            pending_positions: Vec::new(),
        }
    }
}

impl AppState {
    pub fn slot(&self, side: TokenSide) -> &TokenSlot {
        match side {
            TokenSide::A => &self.token_a,
            TokenSide::B => &self.token_b,
        }
    }

    pub fn slot_mut(&mut self, side: TokenSide) -> &mut TokenSlot {
        match side {
            TokenSide::A => &mut self.token_a,
            TokenSide::B => &mut self.token_b,
        }
    }

    /// The configured range, if both bounds are positive and ordered.
    pub fn price_range(&self) -> Option<PriceRange> {
        let (min, max) = (self.min_price?, self.max_price?);
        if min <= Decimal::ZERO || max <= Decimal::ZERO {
            return None;
        }
        PriceRange::new(min, max).ok()
    }

    /// Current price, if known and positive.
    pub fn positive_current_price(&self) -> Option<Decimal> {
        self.current_price.filter(|p| *p > Decimal::ZERO)
    }

    pub fn both_metadata(&self) -> Option<(&TokenMetadata, &TokenMetadata)> {
        Some((self.token_a.metadata.as_ref()?, self.token_b.metadata.as_ref()?))
    }
}
