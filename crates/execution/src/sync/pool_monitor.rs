//! Keeps the pool existence check in step with the selection.

use crate::calculation::LiquidityCalculator;
use crate::state::{Action, AppState, Store};
use fleeditto_domain::enums::{DexId, Network, PoolState};
use fleeditto_domain::pool::{PoolLookup, pool_key};
use fleeditto_protocols::HyperionAdapter;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Checks whether the selected Hyperion pool exists and loads its stats.
///
/// A pool key is checked once while its result stands. Selection changes reset
/// the pool state in the reducer, which makes the next refresh check again.
#[derive(Clone)]
pub struct PoolMonitor {
    store: Store,
    hyperion: Arc<HyperionAdapter>,
    network: Network,
    /// Key of the last completed check.
    last_key: Arc<RwLock<Option<String>>>,
    /// Receives the pool's current tick.
    calculator: Option<LiquidityCalculator>,
}

impl PoolMonitor {
    pub fn new(store: Store, hyperion: Arc<HyperionAdapter>, network: Network) -> Self {
        Self {
            store,
            hyperion,
            network,
            last_key: Arc::new(RwLock::new(None)),
            calculator: None,
        }
    }

    pub fn with_calculator(mut self, calculator: LiquidityCalculator) -> Self {
        self.calculator = Some(calculator);
        self
    }

    fn key_of(&self, state: &AppState) -> Option<String> {
        let (a, b) = state.both_metadata()?;
        let fee_tier = state.fee_tier?;
        Some(pool_key(&a.address, &b.address, fee_tier, self.network.as_str()))
    }

    /// Runs the check for the current selection and returns the resulting state.
    pub async fn refresh(&self) -> PoolState {
        let state = self.store.state();

        if state.selected_dex != Some(DexId::Hyperion) {
            *self.last_key.write().await = None;
            self.set_pool_tick(None).await;
            if state.pool_state != PoolState::Idle || state.pool_stats.is_some() {
                self.store
                    .dispatch_all([Action::SetPoolState(PoolState::Idle), Action::SetPoolStats(None)]);
            }
            return PoolState::Idle;
        }

        let (Some(key), Some(fee_tier)) = (self.key_of(&state), state.fee_tier) else {
            return state.pool_state;
        };
        if state.pool_state != PoolState::Idle && self.last_key.read().await.as_deref() == Some(key.as_str()) {
            debug!(pool_key = %key, "Pool already checked");
            return state.pool_state;
        }
        *self.last_key.write().await = Some(key.clone());

        let token_a = state.token_a.address.clone();
        let token_b = state.token_b.address.clone();
        self.store.dispatch(Action::SetPoolState(PoolState::Loading));

        let lookup = match self.hyperion.lookup_pool(&token_a, &token_b, fee_tier).await {
            Ok(lookup) => lookup,
            Err(e) => {
                warn!(pool_key = %key, error = %e, "Pool lookup failed");
                None
            }
        };
        let pool_id = lookup.as_ref().map(|l| l.pool_id.as_str());
        let report = self
            .hyperion
            .check_pool_state(pool_id, &token_a, &token_b, fee_tier)
            .await;

        if self.store.select(|s| self.key_of(s)).as_deref() != Some(key.as_str()) {
            debug!(pool_key = %key, "Selection changed during pool check, dropping result");
            return self.store.select(|s| s.pool_state);
        }

        match report {
            Ok(report) => {
                let pool_state = if report.exists {
                    PoolState::Exists
                } else {
                    PoolState::NotExists
                };
                info!(pool_key = %key, exists = report.exists, has_stats = report.stats.is_some(), "Pool state resolved");
                self.set_pool_tick(lookup.filter(|_| report.exists)).await;
                self.store
                    .dispatch_all([Action::SetPoolState(pool_state), Action::SetPoolStats(report.stats)]);
                pool_state
            }
            Err(e) => {
                warn!(pool_key = %key, error = %e, "Pool state check failed");
                *self.last_key.write().await = None;
                self.set_pool_tick(None).await;
                self.store.dispatch_all([
                    Action::SetPoolState(PoolState::NotExists),
                    Action::SetPoolStats(None),
                ]);
                PoolState::NotExists
            }
        }
    }

    async fn set_pool_tick(&self, lookup: Option<PoolLookup>) {
        if let Some(calculator) = &self.calculator {
            calculator.set_pool_tick(lookup.and_then(|l| l.current_tick)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::CalculatorConfig;
    use crate::state::fixtures::metadata;
    use crate::test_support::{StubChain, StubIndexer, hyperion, lookup, stats};
    use fleeditto_domain::enums::TokenSide;
    use fleeditto_domain::fees::FeeTier;

    fn selected_store(dex: DexId) -> Store {
        let store = Store::new();
        store.dispatch_all([
            Action::SetSelectedDex(Some(dex)),
            Action::SetTokenAddress(TokenSide::A, "0xa".to_string()),
            Action::SetTokenAddress(TokenSide::B, "0xb".to_string()),
            Action::SetTokenMetadata(TokenSide::A, Some(metadata("0xa", 8))),
            Action::SetTokenMetadata(TokenSide::B, Some(metadata("0xb", 6))),
            Action::SetFeeTier(Some(FeeTier::new(2).unwrap())),
        ]);
        store
    }

    fn indexer() -> Arc<StubIndexer> {
        Arc::new(StubIndexer {
            lookup: Some(lookup()),
            stats: Some(stats()),
            ..StubIndexer::default()
        })
    }

    #[tokio::test]
    async fn test_existing_pool_loads_stats() {
        let store = selected_store(DexId::Hyperion);
        let chain = StubChain::new(true);
        let monitor = PoolMonitor::new(store.clone(), hyperion(chain, indexer()), Network::Mainnet);

        assert_eq!(monitor.refresh().await, PoolState::Exists);
        let state = store.state();
        assert_eq!(state.pool_state, PoolState::Exists);
        assert_eq!(state.pool_stats, Some(stats()));
    }

    #[tokio::test]
    async fn test_missing_pool() {
        let store = selected_store(DexId::Hyperion);
        let monitor = PoolMonitor::new(store.clone(), hyperion(StubChain::new(false), indexer()), Network::Mainnet);

        assert_eq!(monitor.refresh().await, PoolState::NotExists);
        assert!(store.state().pool_stats.is_none());
    }

    #[tokio::test]
    async fn test_checks_each_key_once() {
        let store = selected_store(DexId::Hyperion);
        let chain = StubChain::new(true);
        let monitor = PoolMonitor::new(store.clone(), hyperion(chain.clone(), indexer()), Network::Mainnet);

        monitor.refresh().await;
        let calls = chain.calls();
        monitor.refresh().await;
        assert_eq!(chain.calls(), calls);

        // Invalidation by the reducer forces a new check.
        store.dispatch(Action::SetFeeTier(Some(FeeTier::new(1).unwrap())));
        monitor.refresh().await;
        assert!(chain.calls() > calls);
    }

    #[tokio::test]
    async fn test_other_dex_resets_to_idle() {
        let store = selected_store(DexId::Hyperion);
        let monitor = PoolMonitor::new(store.clone(), hyperion(StubChain::new(true), indexer()), Network::Mainnet);
        monitor.refresh().await;

        store.dispatch(Action::SetSelectedDex(Some(DexId::Thala)));
        store.dispatch(Action::SetPoolState(PoolState::Exists));
        assert_eq!(monitor.refresh().await, PoolState::Idle);
        assert_eq!(store.state().pool_state, PoolState::Idle);
        assert!(monitor.last_key.read().await.is_none());
    }

    #[tokio::test]
    async fn test_failing_indexer_still_resolves_existence() {
        let store = selected_store(DexId::Hyperion);
        let failing = Arc::new(StubIndexer {
            failing: true,
            ..StubIndexer::default()
        });
        let monitor = PoolMonitor::new(store.clone(), hyperion(StubChain::new(true), failing), Network::Mainnet);

        assert_eq!(monitor.refresh().await, PoolState::Exists);
        assert!(store.state().pool_stats.is_none());
    }

    #[tokio::test]
    async fn test_feeds_pool_tick_to_calculator() {
        let store = selected_store(DexId::Hyperion);
        let adapter = hyperion(StubChain::new(true), indexer());
        let calculator = LiquidityCalculator::for_hyperion(store.clone(), adapter.clone(), CalculatorConfig::default());
        let monitor = PoolMonitor::new(store.clone(), adapter, Network::Mainnet).with_calculator(calculator.clone());

        monitor.refresh().await;
        assert_eq!(calculator.pool_tick().await, Some(-23028));
    }

    #[tokio::test]
    async fn test_incomplete_selection_is_left_alone() {
        let store = Store::new();
        store.dispatch(Action::SetSelectedDex(Some(DexId::Hyperion)));
        let chain = StubChain::new(true);
        let monitor = PoolMonitor::new(store.clone(), hyperion(chain.clone(), indexer()), Network::Mainnet);

        assert_eq!(monitor.refresh().await, PoolState::Idle);
        assert_eq!(chain.calls(), 0);
    }
}
