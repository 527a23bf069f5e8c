//! Positions queued for one batched transaction.

use crate::calculation::LiquidityForm;
use crate::signer::TransactionSigner;
use crate::state::{Action, AppState, Store};
use fleeditto_domain::DomainError;
use fleeditto_domain::enums::{DexId, PoolState, TokenSide};
use fleeditto_domain::math::MathError;
use fleeditto_domain::math::price_tick::{decimals_ratio, normalize_tick, price_to_tick};
use fleeditto_domain::metrics::BatchSummary;
use fleeditto_domain::position::{AprData, PendingPosition, PositionLeg};
use fleeditto_protocols::AdapterError;
use fleeditto_protocols::batch_contract::{BatchEntry, BatchHyperionArgs, batch_hyperion};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;
use tracing::{error, info, warn};

/// Errors of the pending batch. Messages are shown to the user.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Please complete all required fields")]
    IncompleteFields,
    #[error("Please enter token amount and wait for calculation")]
    MissingAmounts,
    #[error("Please wait for calculation to complete")]
    CalculationInProgress,
    /// The form's calculation error, verbatim.
    #[error("{0}")]
    Calculation(String),
    #[error("Please wait for pool state to be determined")]
    PoolStateLoading,
    #[error("Please wait for the batch transaction to complete")]
    SubmissionInProgress,
    #[error("Unsupported DEX: {0}")]
    UnsupportedDex(DexId),
    #[error("Invalid position {id}: {reason}")]
    InvalidPosition { id: String, reason: String },
    #[error(transparent)]
    Payload(#[from] AdapterError),
    #[error("Batch transaction failed: {0}")]
    Submission(String),
}

impl From<(&PendingPosition, MathError)> for BatchError {
    fn from((position, e): (&PendingPosition, MathError)) -> Self {
        Self::InvalidPosition {
            id: position.id.clone(),
            reason: e.to_string(),
        }
    }
}

impl From<(&PendingPosition, DomainError)> for BatchError {
    fn from((position, e): (&PendingPosition, DomainError)) -> Self {
        Self::InvalidPosition {
            id: position.id.clone(),
            reason: e.to_string(),
        }
    }
}

/// Configuration for batch submission.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Package exposing the `batch` module.
    pub batch_contract: String,
}

/// Queue of positions submitted together. All state lives in the [`Store`].
#[derive(Clone)]
pub struct PendingBatch {
    store: Store,
    config: BatchConfig,
}

impl PendingBatch {
    pub fn new(store: Store, config: BatchConfig) -> Self {
        Self { store, config }
    }

    pub fn positions(&self) -> Vec<PendingPosition> {
        self.store.select(|s| s.pending_positions.clone())
    }

    /// Snapshots the form into a pending position and reserves its amounts.
    ///
    /// A validation failure is also written to the state error. Nothing is
    /// queued while a batch is being signed.
    pub fn add_to_batch(&self, form: &LiquidityForm, apr: Option<AprData>) -> Result<PendingPosition, BatchError> {
        let state = self.store.state();
        let result = if state.is_submitting {
            Err(BatchError::SubmissionInProgress)
        } else {
            build_position(&state, form, apr)
        };
        match result {
            Ok(position) => {
                info!(
                    id = %position.id,
                    dex = %position.dex,
                    token_a = %position.token_a.metadata.symbol,
                    token_b = %position.token_b.metadata.symbol,
                    "Added position to batch"
                );
                self.store.dispatch_all([
                    Action::AddPendingPosition(position.clone()),
                    Action::SetError(None),
                ]);
                Ok(position)
            }
            Err(e) => {
                warn!(error = %e, "Position rejected");
                self.store.dispatch(Action::SetError(Some(e.to_string())));
                Err(e)
            }
        }
    }

    /// Removes a position and releases its reservation. Unknown ids are ignored.
    pub fn remove_position(&self, id: &str) {
        self.store.dispatch(Action::RemovePendingPosition(id.to_string()));
    }

    pub fn clear(&self) {
        self.store.dispatch(Action::ClearPendingPositions);
    }

    /// Aggregate value and APR of the queued positions.
    pub fn summary(&self, prices: &HashMap<String, Decimal>) -> BatchSummary {
        self.store.select(|s| BatchSummary::compute(&s.pending_positions, prices))
    }

    /// Submits every queued position in one transaction.
    ///
    /// Returns the transaction hash, or `None` when there is nothing to submit.
    /// Only the positions that went into the transaction are removed on
    /// success; on failure they stay queued.
    pub async fn submit_batch(&self, signer: &dyn TransactionSigner) -> Result<Option<String>, BatchError> {
        let state = self.store.state();
        if state.pending_positions.is_empty() {
            return Ok(None);
        }
        if state.is_submitting {
            warn!("Batch submission already in progress");
            return Ok(None);
        }

        let payload = match build_args(&state.pending_positions)
            .and_then(|args| batch_hyperion(&self.config.batch_contract, &args).map_err(BatchError::from))
        {
            Ok(payload) => payload,
            Err(e) => {
                error!(error = %e, "Failed to build batch payload");
                self.store.dispatch(Action::SetError(Some(e.to_string())));
                return Err(e);
            }
        };

        let submitted: Vec<String> = state.pending_positions.iter().map(|p| p.id.clone()).collect();
        let count = submitted.len();
        self.store
            .dispatch_all([Action::SetSubmitting(true), Action::SetError(None)]);
        info!(positions = count, function = %payload.function, "Submitting batch");

        let result = signer.sign_and_submit(payload).await;
        match result {
            Ok(hash) => {
                info!(hash = %hash, positions = count, "Batch submitted");
                self.store.dispatch_all(
                    submitted
                        .into_iter()
                        .map(Action::RemovePendingPosition)
                        .chain([Action::SetTransactionHash(Some(hash.clone())), Action::SetSubmitting(false)]),
                );
                Ok(Some(hash))
            }
            Err(e) => {
                let e = BatchError::Submission(e.to_string());
                error!(error = %e, "Batch submission failed");
                self.store.dispatch_all([
                    Action::SetError(Some(e.to_string())),
                    Action::SetSubmitting(false),
                ]);
                Err(e)
            }
        }
    }
}

fn parse_amount(amount: &str) -> Option<Decimal> {
    Decimal::from_str(amount.trim()).ok()
}

fn build_position(state: &AppState, form: &LiquidityForm, apr: Option<AprData>) -> Result<PendingPosition, BatchError> {
    let (Some(dex), Some((meta_a, meta_b))) = (state.selected_dex, state.both_metadata()) else {
        return Err(BatchError::IncompleteFields);
    };

    let input = parse_amount(&form.input_amount);
    let calculated = form.calculated_amount.as_deref().and_then(parse_amount);
    let (Some(input), Some(calculated)) = (input, calculated) else {
        return Err(BatchError::MissingAmounts);
    };

    if form.is_calculating {
        return Err(BatchError::CalculationInProgress);
    }
    if let Some(message) = &form.calculation_error {
        return Err(BatchError::Calculation(message.clone()));
    }
    if dex == DexId::Hyperion && state.pool_state == PoolState::Loading {
        return Err(BatchError::PoolStateLoading);
    }

    let (Some(range), Some(current_price), Some(fee_tier)) =
        (state.price_range(), state.positive_current_price(), state.fee_tier)
    else {
        return Err(BatchError::IncompleteFields);
    };

    let (amount_a, amount_b) = match form.input_token {
        TokenSide::A => (input, calculated),
        TokenSide::B => (calculated, input),
    };

    Ok(PendingPosition::new(
        dex,
        fee_tier,
        PositionLeg::new(meta_a.address.clone(), meta_a.clone(), amount_a),
        PositionLeg::new(meta_b.address.clone(), meta_b.clone(), amount_b),
        range,
        current_price,
        state.slippage_tolerance,
        state.pool_state.into(),
        apr,
    ))
}

fn normalized(position: &PendingPosition, tick: i32) -> Result<u32, BatchError> {
    u32::try_from(normalize_tick(i64::from(tick))).map_err(|_| BatchError::from((position, MathError::Overflow("tick"))))
}

/// Recomputes each position's ticks from its stored prices and its own decimals.
pub fn build_args(positions: &[PendingPosition]) -> Result<BatchHyperionArgs, BatchError> {
    let mut args = BatchHyperionArgs::default();
    for position in positions {
        if position.dex != DexId::Hyperion {
            return Err(BatchError::UnsupportedDex(position.dex));
        }
        let ratio = decimals_ratio(position.token_a.metadata.decimals, position.token_b.metadata.decimals);
        let tick = |price| price_to_tick(price, position.fee_tier, ratio).map_err(|e| BatchError::from((position, e)));

        args.push(BatchEntry {
            token_a: position.token_a.address.clone(),
            token_b: position.token_b.address.clone(),
            fee_tier: position.fee_tier.index(),
            tick_lower: normalized(position, tick(position.min_price)?)?,
            tick_upper: normalized(position, tick(position.max_price)?)?,
            current_tick: normalized(position, tick(position.current_price)?)?,
            amount_a: position
                .token_a
                .raw_amount()
                .map_err(|e| BatchError::from((position, e)))?,
            amount_b: position
                .token_b
                .raw_amount()
                .map_err(|e| BatchError::from((position, e)))?,
        });
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::SignerError;
    use crate::signer::fixtures::RecordingSigner;
    use crate::state::fixtures::{pending, slot_with_wallet};
    use fleeditto_domain::fees::FeeTier;
    use primitive_types::U256;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn ready_store() -> Store {
        Store::with_state(AppState {
            selected_dex: Some(DexId::Hyperion),
            fee_tier: Some(FeeTier::new(2).unwrap()),
            token_a: slot_with_wallet("0xa", 8, 1_000_00000000),
            token_b: slot_with_wallet("0xb", 6, 10_000_000000),
            current_price: Some(dec!(10)),
            min_price: Some(dec!(9.5)),
            max_price: Some(dec!(10.5)),
            pool_state: PoolState::Exists,
            ..AppState::default()
        })
    }

    fn batch(store: &Store) -> PendingBatch {
        PendingBatch::new(
            store.clone(),
            BatchConfig {
                batch_contract: "0xbatch".to_string(),
            },
        )
    }

    fn form(input: &str, calculated: Option<&str>) -> LiquidityForm {
        LiquidityForm {
            input_amount: input.to_string(),
            calculated_amount: calculated.map(str::to_string),
            ..LiquidityForm::default()
        }
    }

    #[test]
    fn test_add_snapshots_and_reserves() {
        let store = ready_store();
        let apr = AprData::new(dec!(10), dec!(5), dec!(1000));
        let position = batch(&store)
            .add_to_batch(&form("100", Some("1051.234")), Some(apr.clone()))
            .unwrap();

        assert_eq!(position.token_a.amount, dec!(100));
        assert_eq!(position.token_b.amount, dec!(1051.234));
        assert_eq!(position.apr_data, Some(apr));
        let state = store.state();
        assert_eq!(state.pending_positions.len(), 1);
        assert_eq!(state.token_a.balance.as_ref().unwrap().formatted, "900");
        assert_eq!(state.token_b.balance.as_ref().unwrap().formatted, "8948.766");
    }

    #[test]
    fn test_input_side_b_maps_amounts() {
        let store = ready_store();
        let form = LiquidityForm {
            input_token: TokenSide::B,
            ..form("20", Some("2"))
        };
        let position = batch(&store).add_to_batch(&form, None).unwrap();
        assert_eq!(position.token_a.amount, dec!(2));
        assert_eq!(position.token_b.amount, dec!(20));
    }

    #[test]
    fn test_validation_order() {
        let cases: Vec<(Box<dyn Fn(&mut AppState, &mut LiquidityForm)>, &str)> = vec![
            (
                Box::new(|s, _| s.token_b.metadata = None),
                "Please complete all required fields",
            ),
            (
                Box::new(|_, f| f.calculated_amount = None),
                "Please enter token amount and wait for calculation",
            ),
            (
                Box::new(|_, f| f.is_calculating = true),
                "Please wait for calculation to complete",
            ),
            (
                Box::new(|_, f| f.calculation_error = Some("Failed to calculate required currency B amount".into())),
                "Failed to calculate required currency B amount",
            ),
            (
                Box::new(|s, _| s.pool_state = PoolState::Loading),
                "Please wait for pool state to be determined",
            ),
        ];

        for (mutate, expected) in cases {
            let mut state = ready_store().state();
            let mut form = form("1", Some("10"));
            mutate(&mut state, &mut form);
            let store = Store::with_state(state);

            let err = batch(&store).add_to_batch(&form, None).unwrap_err();
            assert_eq!(err.to_string(), expected);
            assert_eq!(store.state().error.as_deref(), Some(expected));
            assert!(store.state().pending_positions.is_empty());
        }
    }

    #[test]
    fn test_pool_loading_only_blocks_hyperion() {
        let store = ready_store();
        store.dispatch(Action::SetSelectedDex(Some(DexId::Tapp)));
        store.dispatch(Action::SetPoolState(PoolState::Loading));
        assert!(batch(&store).add_to_batch(&form("1", Some("10")), None).is_ok());
    }

    #[test]
    fn test_build_args_parallel_arrays() {
        let positions = vec![
            pending("0xa", dec!(1), "0xb", dec!(10)),
            pending("0xc", dec!(2.5), "0xd", dec!(0.5)),
        ];
        let args = build_args(&positions).unwrap();
        assert_eq!(args.len(), 2);
        assert!(args.validate().is_ok());
        assert_eq!(args.fee_tier, vec![2, 2]);
        assert_eq!(args.amount_a, vec![U256::from(100_000_000u64), U256::from(250_000_000u64)]);
        assert_eq!(args.amount_b, vec![U256::from(10_000_000u64), U256::from(50_000_000u64)]);
        // 9.5 USDC per APT with 8/6 decimals sits well below tick 0.
        assert!(args.tick_lower[0] > 1 << 31);
        assert!(args.tick_lower[0] < args.tick_upper[0]);
        // Same prices, equal decimals: ticks above zero stay unnormalized.
        assert!(args.tick_lower[1] < 1 << 31);
    }

    #[test]
    fn test_build_args_rejects_other_dex() {
        let mut position = pending("0xa", dec!(1), "0xb", dec!(1));
        position.dex = DexId::Thala;
        let err = build_args(&[position]).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported DEX: thala");
    }

    #[tokio::test]
    async fn test_submit_success_clears_positions() {
        let store = ready_store();
        let batch = batch(&store);
        batch.add_to_batch(&form("1", Some("10")), None).unwrap();
        batch.add_to_batch(&form("2", Some("20")), None).unwrap();

        let signer = RecordingSigner::default();
        let hash = batch.submit_batch(&signer).await.unwrap();
        assert_eq!(hash.as_deref(), Some("0xhash"));

        let submitted = signer.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].function, "0xbatch::batch::batch_hyperion");
        assert_eq!(submitted[0].arguments[0], json!(["0xa", "0xa"]));

        let state = store.state();
        assert!(state.pending_positions.is_empty());
        assert_eq!(state.transaction_hash.as_deref(), Some("0xhash"));
        assert!(!state.is_submitting);
        assert_eq!(state.token_a.balance, state.token_a.wallet_balance);
    }

    #[tokio::test]
    async fn test_submit_failure_keeps_positions() {
        let store = ready_store();
        let batch = batch(&store);
        batch.add_to_batch(&form("1", Some("10")), None).unwrap();
        let before = store.state().pending_positions;

        let signer = RecordingSigner::failing(SignerError::Rejected);
        let err = batch.submit_batch(&signer).await.unwrap_err();
        assert_eq!(err.to_string(), "Batch transaction failed: User rejected the request");

        let state = store.state();
        assert_eq!(state.pending_positions, before);
        assert_eq!(state.error.as_deref(), Some("Batch transaction failed: User rejected the request"));
        assert!(!state.is_submitting);
        assert!(state.transaction_hash.is_none());
    }

    /// Queues another position while the wallet is signing.
    struct QueueingSigner {
        store: Store,
        late: PendingPosition,
    }

    #[async_trait::async_trait]
    impl TransactionSigner for QueueingSigner {
        fn address(&self) -> Option<String> {
            Some("0xuser".to_string())
        }

        async fn sign_and_submit(&self, _payload: fleeditto_protocols::TransactionPayload) -> Result<String, SignerError> {
            let rejected = batch(&self.store).add_to_batch(&form("3", Some("30")), None);
            assert!(matches!(rejected, Err(BatchError::SubmissionInProgress)));
            self.store.dispatch(Action::AddPendingPosition(self.late.clone()));
            Ok("0xhash".to_string())
        }
    }

    #[tokio::test]
    async fn test_submit_keeps_positions_queued_while_signing() {
        let store = ready_store();
        let batch = batch(&store);
        let first = batch.add_to_batch(&form("1", Some("10")), None).unwrap();
        let late = pending("0xa", dec!(2), "0xb", dec!(20));

        let signer = QueueingSigner {
            store: store.clone(),
            late: late.clone(),
        };
        assert_eq!(batch.submit_batch(&signer).await.unwrap().as_deref(), Some("0xhash"));

        let state = store.state();
        assert_eq!(state.pending_positions, vec![late]);
        assert!(state.pending_positions.iter().all(|p| p.id != first.id));
        assert_eq!(state.token_a.balance.as_ref().unwrap().formatted, "998");
        assert!(!state.is_submitting);
    }

    #[tokio::test]
    async fn test_submit_empty_is_noop() {
        let store = ready_store();
        let signer = RecordingSigner::default();
        assert!(batch(&store).submit_batch(&signer).await.unwrap().is_none());
        assert!(signer.submitted().is_empty());
    }

    #[test]
    fn test_remove_and_summary() {
        let store = ready_store();
        let batch = batch(&store);
        let apr = AprData::new(dec!(20), dec!(0), dec!(0));
        let kept = batch.add_to_batch(&form("1", Some("10")), Some(apr)).unwrap();
        let removed = batch.add_to_batch(&form("5", Some("50")), None).unwrap();
        batch.remove_position(&removed.id);
        batch.remove_position("missing");

        let prices = HashMap::from([("0xa".to_string(), dec!(10)), ("0xb".to_string(), dec!(1))]);
        let summary = batch.summary(&prices);
        assert_eq!(summary.position_count, 1);
        assert_eq!(summary.total_value_usd, dec!(20));
        assert_eq!(summary.weighted_apr, dec!(20));
        assert_eq!(summary.estimated_annual_income, dec!(4));
        assert_eq!(batch.positions()[0].id, kept.id);

        batch.clear();
        assert!(batch.positions().is_empty());
    }
}
