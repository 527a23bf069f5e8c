//! Paired-amount calculation for the position form.

use crate::state::{Action, AppState, Store};
use fleeditto_domain::enums::TokenSide;
use fleeditto_domain::fees::FeeTier;
use fleeditto_domain::math::MathError;
use fleeditto_domain::math::price_tick::{decimals_ratio, normalize_tick, price_to_tick, raw_price_to_tick};
use fleeditto_domain::token::{TokenAmount, TokenMetadata};
use fleeditto_domain::value_objects::PriceRange;
use fleeditto_protocols::{
    AdapterError, ClmmEstimator, DexAdapter, EstimateRequest, HyperionAdapter, LiquidityEstimator, TokenOrder,
};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{RwLock, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Failures of a paired-amount calculation. Messages are shown to the user.
#[derive(Debug, Error)]
pub enum CalculationError {
    #[error("Please select both tokens first")]
    MissingTokens,
    #[error("Please set price range first")]
    MissingPriceRange,
    #[error("Please wait for all data to load")]
    MissingCurrentPrice,
    #[error("Please select fee tier first")]
    MissingFeeTier,
    #[error("Failed to determine token order: {0}")]
    TokenOrder(#[source] AdapterError),
    #[error("Liquidity estimation failed: {0}")]
    Estimation(#[source] AdapterError),
    /// The input side alone cannot fund the range at the current price.
    #[error("Failed to calculate required currency {0} amount")]
    NoEstimate(&'static str),
    #[error("Failed to convert prices to ticks: {0}")]
    Tick(#[from] MathError),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

/// Configuration for the calculator.
#[derive(Debug, Clone)]
pub struct CalculatorConfig {
    /// Delay before a request runs; a newer request during the delay cancels it.
    pub debounce: Duration,
    /// Decimal places of the calculated amount.
    pub decimal_places: u32,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(100),
            decimal_places: 3,
        }
    }
}

/// Form state of the amount inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiquidityForm {
    /// Side the user types into.
    pub input_token: TokenSide,
    pub input_amount: String,
    /// Amount required on the other side, rounded for display.
    pub calculated_amount: Option<String>,
    pub is_calculating: bool,
    pub calculation_error: Option<String>,
    /// Liquidity the position would mint.
    pub liquidity: Option<u128>,
}

/// Ticks handed to the estimator, normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSet {
    pub tick_lower: u32,
    pub tick_upper: u32,
    pub current_tick: u32,
}

/// Result of one calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calculation {
    pub input_token: TokenSide,
    pub input_amount: String,
    pub required_amount: String,
    pub liquidity: u128,
    pub ticks: TickSet,
}

/// Inputs the calculation reads from [`AppState`].
struct Snapshot {
    token_a: TokenMetadata,
    token_b: TokenMetadata,
    range: PriceRange,
    current_price: Decimal,
    fee_tier: FeeTier,
}

/// Checks the preconditions in the order the user resolves them. No chain access.
fn snapshot(state: &AppState) -> Result<Snapshot, CalculationError> {
    let (token_a, token_b) = state.both_metadata().ok_or(CalculationError::MissingTokens)?;
    let range = state.price_range().ok_or(CalculationError::MissingPriceRange)?;
    let current_price = state
        .positive_current_price()
        .ok_or(CalculationError::MissingCurrentPrice)?;
    let fee_tier = state.fee_tier.ok_or(CalculationError::MissingFeeTier)?;
    Ok(Snapshot {
        token_a: token_a.clone(),
        token_b: token_b.clone(),
        range,
        current_price,
        fee_tier,
    })
}

fn to_normalized(tick: i64) -> Result<u32, CalculationError> {
    u32::try_from(normalize_tick(tick)).map_err(|_| CalculationError::Tick(MathError::Overflow("tick")))
}

/// Drives paired-amount calculations and owns the form state.
///
/// Every request takes a generation number; only the newest generation may
/// write to the form or the store.
#[derive(Clone)]
pub struct LiquidityCalculator {
    store: Store,
    order: Arc<dyn TokenOrder>,
    estimator: Arc<dyn LiquidityEstimator>,
    config: CalculatorConfig,
    generation: Arc<AtomicU64>,
    form: Arc<RwLock<LiquidityForm>>,
    /// Current tick of the pool, preferred over the price-derived tick.
    pool_tick: Arc<RwLock<Option<i64>>>,
}

impl LiquidityCalculator {
    pub fn new(
        store: Store,
        order: Arc<dyn TokenOrder>,
        estimator: Arc<dyn LiquidityEstimator>,
        config: CalculatorConfig,
    ) -> Self {
        Self {
            store,
            order,
            estimator,
            config,
            generation: Arc::new(AtomicU64::new(0)),
            form: Arc::new(RwLock::new(LiquidityForm::default())),
            pool_tick: Arc::new(RwLock::new(None)),
        }
    }

    /// Uses the Hyperion adapter for both token order and estimation.
    pub fn for_hyperion(store: Store, hyperion: Arc<HyperionAdapter>, config: CalculatorConfig) -> Self {
        let estimator = hyperion
            .estimator()
            .unwrap_or_else(|| Arc::new(ClmmEstimator::new()));
        Self::new(store, hyperion, estimator, config)
    }

    pub async fn form(&self) -> LiquidityForm {
        self.form.read().await.clone()
    }

    pub async fn pool_tick(&self) -> Option<i64> {
        *self.pool_tick.read().await
    }

    pub async fn set_pool_tick(&self, tick: Option<i64>) {
        *self.pool_tick.write().await = tick;
    }

    /// Switches the input side and clears the form. In-flight results are dropped.
    pub async fn set_input_token(&self, side: TokenSide) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.form.write().await = LiquidityForm {
            input_token: side,
            ..LiquidityForm::default()
        };
    }

    /// Recalculates with the current input after the range changed.
    pub async fn on_price_range_changed(&self) -> LiquidityForm {
        let amount = self.form.read().await.input_amount.clone();
        if amount.trim().is_empty() {
            return self.form().await;
        }
        self.set_input_amount(&amount).await
    }

    /// Handles a new input amount and returns the form as left by this request.
    ///
    /// Every write happens under the form lock and only while `generation` is
    /// still the newest; a superseded request returns the form untouched.
    pub async fn set_input_amount(&self, amount: &str) -> LiquidityForm {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let input_token = {
            let Some(mut form) = self.current_form(generation).await else {
                return self.form().await;
            };
            form.input_amount = amount.to_string();
            form.calculation_error = None;
            form.input_token
        };

        let positive = Decimal::from_str(amount.trim()).is_ok_and(|a| a > Decimal::ZERO);
        if !positive {
            let Some(mut form) = self.current_form(generation).await else {
                return self.form().await;
            };
            form.calculated_amount = None;
            form.liquidity = None;
            form.is_calculating = false;
            let (amount_a, amount_b) = match input_token {
                TokenSide::A => (amount.to_string(), String::new()),
                TokenSide::B => (String::new(), amount.to_string()),
            };
            self.store.dispatch_all([
                Action::SetTokenAmount(TokenSide::A, amount_a),
                Action::SetTokenAmount(TokenSide::B, amount_b),
            ]);
            return form.clone();
        }

        let state = self.store.state();
        if let Err(e) = snapshot(&state) {
            let Some(mut form) = self.current_form(generation).await else {
                return self.form().await;
            };
            form.calculation_error = Some(e.to_string());
            form.calculated_amount = None;
            form.is_calculating = false;
            return form.clone();
        }

        match self.current_form(generation).await {
            Some(mut form) => form.is_calculating = true,
            None => return self.form().await,
        }

        if !self.config.debounce.is_zero() {
            tokio::time::sleep(self.config.debounce).await;
            if !self.is_current(generation) {
                debug!(generation, "Calculation superseded before start");
                return self.form().await;
            }
        }

        let state = self.store.state();
        let result = self.calculate(&state, input_token, amount.trim()).await;

        let Some(mut form) = self.current_form(generation).await else {
            debug!(generation, "Dropping stale calculation result");
            return self.form().await;
        };
        form.is_calculating = false;
        match result {
            Ok(calculation) => {
                info!(
                    input = ?calculation.input_token,
                    amount = %calculation.input_amount,
                    required = %calculation.required_amount,
                    "Calculated paired amount"
                );
                let (amount_a, amount_b) = match calculation.input_token {
                    TokenSide::A => (calculation.input_amount.clone(), calculation.required_amount.clone()),
                    TokenSide::B => (calculation.required_amount.clone(), calculation.input_amount.clone()),
                };
                form.calculated_amount = Some(calculation.required_amount);
                form.liquidity = Some(calculation.liquidity);
                self.store.dispatch_all([
                    Action::SetTokenAmount(TokenSide::A, amount_a),
                    Action::SetTokenAmount(TokenSide::B, amount_b),
                ]);
            }
            Err(e) => {
                warn!(error = %e, "Paired amount calculation failed");
                form.calculation_error = Some(e.to_string());
                form.calculated_amount = None;
                form.liquidity = None;
            }
        }
        form.clone()
    }

    /// Write access to the form, or `None` once a newer request has started.
    async fn current_form(&self, generation: u64) -> Option<RwLockWriteGuard<'_, LiquidityForm>> {
        let form = self.form.write().await;
        self.is_current(generation).then_some(form)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Computes the amount of the other token required for `amount` of `input_token`.
    ///
    /// Ticks reach the estimator in pool (token0) orientation: for an unsorted
    /// pair they are negated and swapped, and the currencies are passed as
    /// token0/token1 rather than A/B.
    pub async fn calculate(
        &self,
        state: &AppState,
        input_token: TokenSide,
        amount: &str,
    ) -> Result<Calculation, CalculationError> {
        let snapshot = snapshot(state)?;
        let amount_decimal =
            Decimal::from_str(amount).map_err(|_| CalculationError::InvalidAmount(amount.to_string()))?;

        let is_sorted = self
            .order
            .is_sorted(&snapshot.token_a.address, &snapshot.token_b.address)
            .await
            .map_err(CalculationError::TokenOrder)?;

        let ratio = decimals_ratio(snapshot.token_a.decimals, snapshot.token_b.decimals);
        let lower = i64::from(price_to_tick(snapshot.range.min_price, snapshot.fee_tier, ratio)?);
        let upper = i64::from(price_to_tick(snapshot.range.max_price, snapshot.fee_tier, ratio)?);
        let price_tick = i64::from(raw_price_to_tick(snapshot.current_price, ratio)?);

        // Ticks above are priced as B per A. When B is token0 the pool prices
        // A per B, which negates and swaps them.
        let (lower, upper, price_tick) = if is_sorted {
            (lower, upper, price_tick)
        } else {
            (-upper, -lower, -price_tick)
        };
        let current = self.pool_tick.read().await.unwrap_or(price_tick);

        let ticks = TickSet {
            tick_lower: to_normalized(lower)?,
            tick_upper: to_normalized(upper)?,
            current_tick: to_normalized(current)?,
        };

        let (input_meta, paired_meta) = match input_token {
            TokenSide::A => (&snapshot.token_a, &snapshot.token_b),
            TokenSide::B => (&snapshot.token_b, &snapshot.token_a),
        };
        let raw_amount = TokenAmount::from_decimal(amount_decimal, input_meta.decimals)
            .map_err(|e| CalculationError::InvalidAmount(e.to_string()))?;

        // The input is token0 when it is A on a sorted pair, or B on an unsorted one.
        let input_is_token0 = (input_token == TokenSide::A) == is_sorted;
        let (token0, token1) = if is_sorted {
            (&snapshot.token_a, &snapshot.token_b)
        } else {
            (&snapshot.token_b, &snapshot.token_a)
        };
        let request = EstimateRequest {
            currency_a: token0.address.clone(),
            currency_b: token1.address.clone(),
            fee_tier: snapshot.fee_tier,
            tick_lower: ticks.tick_lower,
            tick_upper: ticks.tick_upper,
            current_tick: ticks.current_tick,
            amount: raw_amount.as_u256(),
        };
        debug!(
            sorted = is_sorted,
            tick_lower = ticks.tick_lower,
            tick_upper = ticks.tick_upper,
            current_tick = ticks.current_tick,
            "Estimating paired amount"
        );

        let (estimate, paired_side) = if input_is_token0 {
            (self.estimator.est_currency_b_amount_from_a(&request).await, "B")
        } else {
            (self.estimator.est_currency_a_amount_from_b(&request).await, "A")
        };
        let estimate = estimate
            .map_err(CalculationError::Estimation)?
            .ok_or(CalculationError::NoEstimate(paired_side))?;

        let paired = TokenAmount(estimate.paired_amount)
            .to_decimal(paired_meta.decimals)
            .ok_or_else(|| CalculationError::InvalidAmount(estimate.paired_amount.to_string()))?;
        let rounded = paired.round_dp_with_strategy(self.config.decimal_places, RoundingStrategy::MidpointAwayFromZero);

        Ok(Calculation {
            input_token,
            input_amount: amount.to_string(),
            required_amount: format!("{:.*}", self.config.decimal_places as usize, rounded),
            liquidity: estimate.liquidity,
            ticks,
        })
    }
}
