//! APR estimate for the position being composed.

use crate::calculation::LiquidityForm;
use crate::state::{AppState, Store};
use fleeditto_domain::DomainError;
use fleeditto_domain::enums::{DexId, PoolState, TokenSide};
use fleeditto_domain::fees::FeeTier;
use fleeditto_domain::math::MathError;
use fleeditto_domain::math::price_tick::{decimals_ratio, price_to_tick};
use fleeditto_domain::position::AprData;
use fleeditto_domain::token::raw_from_decimal;
use fleeditto_protocols::error::GraphQlError;
use fleeditto_protocols::graphql::{HyperionIndexer, PositionAprRequest};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum AprError {
    #[error("Pool not found for APR calculation")]
    PoolNotFound,
    #[error("Position is not ready for an APR estimate")]
    NotReady,
    #[error("Failed to fetch APR: {0}")]
    Indexer(#[from] GraphQlError),
    #[error(transparent)]
    Math(#[from] MathError),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

#[derive(Debug, Clone)]
pub struct AprConfig {
    /// Delay before a fetch; newer requests during the delay replace it.
    pub delay: Duration,
}

impl Default for AprConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(500),
        }
    }
}

/// Latest APR estimate and its fetch status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AprSnapshot {
    pub data: Option<AprData>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Inputs of an APR query, resolved from state and form.
struct AprInputs {
    token_a: String,
    token_b: String,
    fee_tier: FeeTier,
    tick_lower: i32,
    tick_upper: i32,
    raw_a: String,
    raw_b: String,
}

fn parse_positive(amount: &str) -> Option<Decimal> {
    Decimal::from_str(amount.trim()).ok().filter(|a| *a > Decimal::ZERO)
}

/// Whether an APR estimate can be requested: an existing Hyperion pool, a
/// valid range, both amounts and no calculation pending.
pub fn should_fetch(state: &AppState, form: &LiquidityForm) -> bool {
    state.selected_dex == Some(DexId::Hyperion)
        && state.pool_state == PoolState::Exists
        && state.both_metadata().is_some()
        && state.price_range().is_some()
        && state.fee_tier.is_some()
        && parse_positive(&form.input_amount).is_some()
        && form.calculated_amount.as_deref().and_then(parse_positive).is_some()
        && !form.is_calculating
        && form.calculation_error.is_none()
}

fn inputs(state: &AppState, form: &LiquidityForm) -> Result<AprInputs, AprError> {
    if !should_fetch(state, form) {
        return Err(AprError::NotReady);
    }
    let ((meta_a, meta_b), range, fee_tier) = match (state.both_metadata(), state.price_range(), state.fee_tier) {
        (Some(meta), Some(range), Some(fee_tier)) => (meta, range, fee_tier),
        _ => return Err(AprError::NotReady),
    };
    let input = parse_positive(&form.input_amount).ok_or(AprError::NotReady)?;
    let calculated = form
        .calculated_amount
        .as_deref()
        .and_then(parse_positive)
        .ok_or(AprError::NotReady)?;
    let (amount_a, amount_b) = match form.input_token {
        TokenSide::A => (input, calculated),
        TokenSide::B => (calculated, input),
    };

    // The indexer takes signed ticks.
    let ratio = decimals_ratio(meta_a.decimals, meta_b.decimals);
    Ok(AprInputs {
        token_a: meta_a.address.clone(),
        token_b: meta_b.address.clone(),
        fee_tier,
        tick_lower: price_to_tick(range.min_price, fee_tier, ratio)?,
        tick_upper: price_to_tick(range.max_price, fee_tier, ratio)?,
        raw_a: raw_from_decimal(amount_a, meta_a.decimals)?.to_string(),
        raw_b: raw_from_decimal(amount_b, meta_b.decimals)?.to_string(),
    })
}

/// Fetches position APR estimates from the Hyperion indexer.
#[derive(Clone)]
pub struct AprFetcher {
    store: Store,
    indexer: Arc<dyn HyperionIndexer>,
    config: AprConfig,
    generation: Arc<AtomicU64>,
    latest: Arc<RwLock<AprSnapshot>>,
}

impl AprFetcher {
    pub fn new(store: Store, indexer: Arc<dyn HyperionIndexer>, config: AprConfig) -> Self {
        Self {
            store,
            indexer,
            config,
            generation: Arc::new(AtomicU64::new(0)),
            latest: Arc::new(RwLock::new(AprSnapshot::default())),
        }
    }

    pub async fn snapshot(&self) -> AprSnapshot {
        self.latest.read().await.clone()
    }

    /// APR data to attach to the next pending position.
    pub async fn current(&self) -> Option<AprData> {
        self.latest.read().await.data.clone()
    }

    /// Refreshes the estimate for `form`, clearing it when the position is not
    /// ready. Only the newest request updates the snapshot.
    pub async fn refresh(&self, form: &LiquidityForm) -> AprSnapshot {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let state = self.store.state();
        if !should_fetch(&state, form) {
            let mut latest = self.latest.write().await;
            *latest = AprSnapshot::default();
            return latest.clone();
        }

        self.latest.write().await.is_loading = true;
        if !self.config.delay.is_zero() {
            tokio::time::sleep(self.config.delay).await;
        }
        if self.generation.load(Ordering::SeqCst) != generation {
            return self.snapshot().await;
        }

        let state = self.store.state();
        let result = self.fetch(&state, form).await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "Dropping stale APR result");
            return self.snapshot().await;
        }

        let mut latest = self.latest.write().await;
        *latest = match result {
            Ok(data) => AprSnapshot {
                data: Some(data),
                is_loading: false,
                error: None,
            },
            Err(e) => {
                warn!(error = %e, "APR fetch failed");
                AprSnapshot {
                    data: None,
                    is_loading: false,
                    error: Some(e.to_string()),
                }
            }
        };
        latest.clone()
    }

    /// Queries the indexer for the position described by `state` and `form`.
    pub async fn fetch(&self, state: &AppState, form: &LiquidityForm) -> Result<AprData, AprError> {
        let inputs = inputs(state, form)?;
        let pool = self
            .indexer
            .pool_by_token_pair(&inputs.token_a, &inputs.token_b, inputs.fee_tier)
            .await?
            .ok_or(AprError::PoolNotFound)?;

        let request = PositionAprRequest {
            pool_id: pool.pool_id,
            tick_lower: inputs.tick_lower,
            tick_upper: inputs.tick_upper,
            token1_amount: inputs.raw_a,
            token2_amount: inputs.raw_b,
        };
        debug!(pool = %request.pool_id, tick_lower = request.tick_lower, tick_upper = request.tick_upper, "Fetching position APR");
        let apr = self.indexer.position_apr(&request).await?;
        Ok(AprData::new(apr.farm_apr, apr.fee_apr, apr.daily_volume))
    }
}
