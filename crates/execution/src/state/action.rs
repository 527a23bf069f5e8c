use fleeditto_domain::enums::{DexId, PoolState, TokenSide};
use fleeditto_domain::fees::FeeTier;
use fleeditto_domain::pool::PoolStats;
use fleeditto_domain::position::PendingPosition;
use fleeditto_domain::token::{TokenBalance, TokenMetadata};
use rust_decimal::Decimal;

/// Every mutation of [`super::AppState`].
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetSelectedDex(Option<DexId>),
    SetFeeTier(Option<FeeTier>),
    SetTokenAddress(TokenSide, String),
    SetTokenMetadata(TokenSide, Option<TokenMetadata>),
    /// Overrides the spendable balance without touching the wallet balance.
    SetTokenBalance(TokenSide, Option<TokenBalance>),
    /// Stores a fresh wallet read; the spendable balance is recomputed from it.
    SetTokenWalletBalance(TokenSide, Option<TokenBalance>),
    SetTokenAmount(TokenSide, String),
    SetCurrentPrice(Option<Decimal>),
    SetPriceRange {
        min_price: Option<Decimal>,
        max_price: Option<Decimal>,
    },
    SetSlippageTolerance(Decimal),
    SetPoolState(PoolState),
    SetPoolStats(Option<PoolStats>),
    SetLoading(bool),
    SetError(Option<String>),
    SetSubmitting(bool),
    SetTransactionHash(Option<String>),
    AddPendingPosition(PendingPosition),
    /// Removes by id; unknown ids are ignored.
    RemovePendingPosition(String),
    ClearPendingPositions,
    ResetState,
}

impl Action {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetSelectedDex(_) => "set_selected_dex",
            Self::SetFeeTier(_) => "set_fee_tier",
            Self::SetTokenAddress(..) => "set_token_address",
            Self::SetTokenMetadata(..) => "set_token_metadata",
            Self::SetTokenBalance(..) => "set_token_balance",
            Self::SetTokenWalletBalance(..) => "set_token_wallet_balance",
            Self::SetTokenAmount(..) => "set_token_amount",
            Self::SetCurrentPrice(_) => "set_current_price",
            Self::SetPriceRange { .. } => "set_price_range",
            Self::SetSlippageTolerance(_) => "set_slippage_tolerance",
            Self::SetPoolState(_) => "set_pool_state",
            Self::SetPoolStats(_) => "set_pool_stats",
            Self::SetLoading(_) => "set_loading",
            Self::SetError(_) => "set_error",
            Self::SetSubmitting(_) => "set_submitting",
            Self::SetTransactionHash(_) => "set_transaction_hash",
            Self::AddPendingPosition(_) => "add_pending_position",
            Self::RemovePendingPosition(_) => "remove_pending_position",
            Self::ClearPendingPositions => "clear_pending_positions",
            Self::ResetState => "reset_state",
        }
    }
}
