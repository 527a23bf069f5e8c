use super::{AddLiquidityParams, DexAdapter, TokenOrder, slippage_bps};
use crate::error::AdapterError;
use crate::estimator::{ClmmEstimator, LiquidityEstimator};
use crate::graphql::HyperionIndexer;
use crate::payload::TransactionPayload;
use crate::rpc::ChainView;
use async_trait::async_trait;
use chrono::Utc;
use fleeditto_domain::enums::DexId;
use fleeditto_domain::fees::FeeTier;
use fleeditto_domain::pool::{PoolInfo, PoolLookup, PoolStats};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, warn};

/// Seconds a Hyperion add-liquidity transaction stays valid.
pub const ADD_LIQUIDITY_DEADLINE_SECS: i64 = 300;

/// Existence of a pool plus its stats when they could be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStateReport {
    pub exists: bool,
    pub stats: Option<PoolStats>,
}

pub struct HyperionAdapter {
    /// Registry address, used by the generic payload.
    contract_address: String,
    /// Hyperion core package for the active network.
    hyperion_contract: String,
    chain: Arc<dyn ChainView>,
    indexer: Option<Arc<dyn HyperionIndexer>>,
    estimator: Arc<dyn LiquidityEstimator>,
}

impl HyperionAdapter {
    pub fn new(
        contract_address: impl Into<String>,
        hyperion_contract: impl Into<String>,
        chain: Arc<dyn ChainView>,
    ) -> Self {
        Self {
            contract_address: contract_address.into(),
            hyperion_contract: hyperion_contract.into(),
            chain,
            indexer: None,
            estimator: Arc::new(ClmmEstimator::new()),
        }
    }

    pub fn with_indexer(mut self, indexer: Arc<dyn HyperionIndexer>) -> Self {
        self.indexer = Some(indexer);
        self
    }

    pub fn with_estimator(mut self, estimator: Arc<dyn LiquidityEstimator>) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn hyperion_contract(&self) -> &str {
        &self.hyperion_contract
    }

    /// Existence check combined with pool stats. Stats are fetched only when a
    /// pool id is known; a stats failure keeps `exists` and drops the stats.
    pub async fn check_pool_state(
        &self,
        pool_id: Option<&str>,
        token_a: &str,
        token_b: &str,
        fee_tier: FeeTier,
    ) -> Result<PoolStateReport, AdapterError> {
        let info = self.check_pool_exists(token_a, token_b, fee_tier).await?;
        if !info.exists {
            return Ok(PoolStateReport {
                exists: false,
                stats: None,
            });
        }

        let pool_id = pool_id.map(str::trim).filter(|id| !id.is_empty());
        let stats = match (pool_id, &self.indexer) {
            (Some(pool_id), Some(indexer)) => match indexer.pool_stats(pool_id).await {
                Ok(stats) => stats,
                Err(e) => {
                    warn!(pool = %pool_id, error = %e, "Failed to fetch pool stats");
                    None
                }
            },
            _ => {
                debug!("Pool exists but no pool id is known, skipping stats");
                None
            }
        };
        Ok(PoolStateReport { exists: true, stats })
    }

    /// Pool id and current tick for a pair and fee tier.
    pub async fn lookup_pool(
        &self,
        token_a: &str,
        token_b: &str,
        fee_tier: FeeTier,
    ) -> Result<Option<PoolLookup>, AdapterError> {
        let Some(indexer) = &self.indexer else {
            return Ok(None);
        };
        Ok(indexer.pool_by_token_pair(token_a, token_b, fee_tier).await?)
    }

    /// Payload of Hyperion's own `add_liquidity` for a pool that already exists.
    pub fn add_liquidity_to_existing_pool_payload(
        &self,
        params: &AddLiquidityParams,
        fee_tier: FeeTier,
    ) -> Result<TransactionPayload, AdapterError> {
        let deadline = Utc::now().timestamp() + ADD_LIQUIDITY_DEADLINE_SECS;
        let [amount_a, amount_b] = params.amount_arguments();
        Ok(TransactionPayload::new(
            format!("{}::hyperion_pool::add_liquidity", self.hyperion_contract),
            params.type_arguments(),
            vec![
                amount_a,
                amount_b,
                decimal_arg(params.min_price),
                decimal_arg(params.max_price),
                json!(fee_tier.index()),
                json!(slippage_bps(params.slippage_tolerance)?.to_string()),
                json!(deadline.to_string()),
            ],
        ))
    }

    /// Payload of the custom entry that creates the pool and seeds it.
    pub fn create_pool_and_add_liquidity_payload(
        &self,
        params: &AddLiquidityParams,
        fee_tier: FeeTier,
        current_price: Decimal,
    ) -> Result<TransactionPayload, AdapterError> {
        let [amount_a, amount_b] = params.amount_arguments();
        Ok(TransactionPayload::new(
            format!("{}::fleeditto::create_pool_and_add_liquidity", self.contract_address),
            params.type_arguments(),
            vec![
                amount_a,
                amount_b,
                decimal_arg(params.min_price),
                decimal_arg(params.max_price),
                json!(fee_tier.index()),
                decimal_arg(current_price),
                json!(slippage_bps(params.slippage_tolerance)?.to_string()),
            ],
        ))
    }
}

#[async_trait]
impl DexAdapter for HyperionAdapter {
    fn id(&self) -> DexId {
        DexId::Hyperion
    }

    /// View failures are reported as a missing pool.
    async fn check_pool_exists(
        &self,
        token_a: &str,
        token_b: &str,
        fee_tier: FeeTier,
    ) -> Result<PoolInfo, AdapterError> {
        let function = format!("{}::pool_v3::liquidity_pool_exists", self.hyperion_contract);
        let arguments = [json!(token_a), json!(token_b), json!(fee_tier.index())];
        let exists = match self.chain.view(&function, &[], &arguments).await {
            Ok(result) => result.first().is_some_and(truthy),
            Err(e) => {
                warn!(token_a = %token_a, token_b = %token_b, fee_tier = %fee_tier, error = %e, "Pool existence check failed");
                false
            }
        };
        debug!(token_a = %token_a, token_b = %token_b, fee_tier = %fee_tier, exists, "Checked Hyperion pool");
        Ok(PoolInfo {
            exists,
            ..PoolInfo::missing(DexId::Hyperion, token_a, token_b, fee_tier)
        })
    }

    fn create_add_liquidity_payload(&self, params: &AddLiquidityParams) -> TransactionPayload {
        TransactionPayload::new(
            format!("{}::pools::create_concentrated_position", self.contract_address),
            params.type_arguments(),
            params.amount_arguments().to_vec(),
        )
    }

    fn contract_address(&self) -> &str {
        &self.contract_address
    }

    fn estimator(&self) -> Option<Arc<dyn LiquidityEstimator>> {
        Some(Arc::clone(&self.estimator))
    }
}

#[async_trait]
impl TokenOrder for HyperionAdapter {
    /// Failures propagate: the calculation path must not guess the order.
    async fn is_sorted(&self, token_a: &str, token_b: &str) -> Result<bool, AdapterError> {
        let function = format!("{}::utils::is_sorted", self.hyperion_contract);
        let result = self
            .chain
            .view(&function, &[], &[json!(token_a), json!(token_b)])
            .await?;
        Ok(result.first().is_some_and(truthy))
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s == "true",
        _ => false,
    }
}

fn decimal_arg(value: Decimal) -> Value {
    json!(value.normalize().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::fixtures;
    use crate::error::{ChainError, GraphQlError};
    use crate::graphql::{PositionApr, PositionAprRequest};
    use fleeditto_domain::position::UserPosition;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    struct StubChain {
        exists: Result<bool, u16>,
        sorted: bool,
        calls: Mutex<Vec<(String, Vec<Value>)>>,
    }

    impl StubChain {
        fn new(exists: Result<bool, u16>) -> Self {
            Self {
                exists,
                sorted: true,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChainView for StubChain {
        async fn view(
            &self,
            function: &str,
            _type_arguments: &[String],
            arguments: &[Value],
        ) -> Result<Vec<Value>, ChainError> {
            self.calls
                .lock()
                .unwrap()
                .push((function.to_string(), arguments.to_vec()));
            if function.ends_with("::is_sorted") {
                return Ok(vec![json!(self.sorted)]);
            }
            match self.exists {
                Ok(exists) => Ok(vec![json!(exists)]),
                Err(status) => Err(ChainError::Http {
                    status,
                    body: "boom".to_string(),
                }),
            }
        }

        async fn account_resource(&self, _address: &str, _resource_type: &str) -> Result<Value, ChainError> {
            Err(ChainError::Decode("unused".to_string()))
        }
    }

    struct StubIndexer {
        stats: Result<Option<PoolStats>, ()>,
    }

    #[async_trait]
    impl HyperionIndexer for StubIndexer {
        async fn pool_stats(&self, _pool_id: &str) -> Result<Option<PoolStats>, GraphQlError> {
            self.stats.clone().map_err(|_| GraphQlError::Status(502))
        }

        async fn position_apr(&self, _request: &PositionAprRequest) -> Result<PositionApr, GraphQlError> {
            Ok(PositionApr::default())
        }

        async fn pool_by_token_pair(
            &self,
            _token1: &str,
            _token2: &str,
            _fee_tier: FeeTier,
        ) -> Result<Option<PoolLookup>, GraphQlError> {
            Ok(Some(PoolLookup {
                pool_id: "0xpool".to_string(),
                current_tick: Some(-23028),
            }))
        }

        async fn user_positions(&self, _address: &str) -> Result<Vec<UserPosition>, GraphQlError> {
            Ok(Vec::new())
        }
    }

    fn stats() -> PoolStats {
        PoolStats {
            id: "0xpool".to_string(),
            daily_volume_usd: dec!(1000),
            farm_apr: dec!(5),
            fee_apr: dec!(3),
            fees_usd: dec!(10),
            tvl_usd: dec!(50000),
            pool: None,
        }
    }

    fn adapter(chain: Arc<StubChain>) -> HyperionAdapter {
        HyperionAdapter::new("0xregistry", "0xhyperion", chain)
    }

    #[tokio::test]
    async fn test_pool_exists_view_arguments() {
        let chain = Arc::new(StubChain::new(Ok(true)));
        let info = adapter(chain.clone())
            .check_pool_exists("0xa", "0xb", FeeTier::new(2).unwrap())
            .await
            .unwrap();
        assert!(info.exists);
        let calls = chain.calls.lock().unwrap();
        assert_eq!(calls[0].0, "0xhyperion::pool_v3::liquidity_pool_exists");
        assert_eq!(calls[0].1, vec![json!("0xa"), json!("0xb"), json!(2)]);
    }

    #[tokio::test]
    async fn test_view_failure_reads_as_missing_pool() {
        let chain = Arc::new(StubChain::new(Err(500)));
        let info = adapter(chain)
            .check_pool_exists("0xa", "0xb", FeeTier::new(1).unwrap())
            .await
            .unwrap();
        assert!(!info.exists);
        assert_eq!(info.dex, DexId::Hyperion);
    }

    #[tokio::test]
    async fn test_pool_state_fetches_stats_only_with_pool_id() {
        let chain = Arc::new(StubChain::new(Ok(true)));
        let adapter = adapter(chain).with_indexer(Arc::new(StubIndexer { stats: Ok(Some(stats())) }));
        let tier = FeeTier::new(2).unwrap();

        let with_id = adapter.check_pool_state(Some("0xpool"), "0xa", "0xb", tier).await.unwrap();
        assert_eq!(with_id.stats, Some(stats()));

        let without_id = adapter.check_pool_state(Some("  "), "0xa", "0xb", tier).await.unwrap();
        assert!(without_id.exists);
        assert!(without_id.stats.is_none());
    }

    #[tokio::test]
    async fn test_stats_failure_keeps_existence() {
        let chain = Arc::new(StubChain::new(Ok(true)));
        let adapter = adapter(chain).with_indexer(Arc::new(StubIndexer { stats: Err(()) }));
        let report = adapter
            .check_pool_state(Some("0xpool"), "0xa", "0xb", FeeTier::new(2).unwrap())
            .await
            .unwrap();
        assert!(report.exists);
        assert!(report.stats.is_none());
    }

    #[tokio::test]
    async fn test_is_sorted() {
        let chain = Arc::new(StubChain::new(Ok(true)));
        assert!(adapter(chain.clone()).is_sorted("0xa", "0xb").await.unwrap());
        assert_eq!(chain.calls.lock().unwrap()[0].0, "0xhyperion::utils::is_sorted");
    }

    #[test]
    fn test_existing_pool_payload() {
        let adapter = adapter(Arc::new(StubChain::new(Ok(true))));
        let before = Utc::now().timestamp();
        let payload = adapter
            .add_liquidity_to_existing_pool_payload(&fixtures::params(), FeeTier::new(2).unwrap())
            .unwrap();
        assert_eq!(payload.function, "0xhyperion::hyperion_pool::add_liquidity");
        assert_eq!(payload.type_arguments, vec!["0xa", "0xb"]);
        assert_eq!(payload.arguments.len(), 7);
        assert_eq!(payload.arguments[2], json!("9.5"));
        assert_eq!(payload.arguments[4], json!(2));
        assert_eq!(payload.arguments[5], json!("50"));
        let deadline: i64 = payload.arguments[6].as_str().unwrap().parse().unwrap();
        assert!(deadline >= before + ADD_LIQUIDITY_DEADLINE_SECS);
    }

    #[test]
    fn test_create_pool_payload() {
        let adapter = adapter(Arc::new(StubChain::new(Ok(false))));
        let payload = adapter
            .create_pool_and_add_liquidity_payload(&fixtures::params(), FeeTier::new(4).unwrap(), dec!(10))
            .unwrap();
        assert_eq!(payload.function, "0xregistry::fleeditto::create_pool_and_add_liquidity");
        assert_eq!(payload.arguments[5], json!("10"));
        assert_eq!(payload.arguments[6], json!("50"));
    }

    #[test]
    fn test_capabilities() {
        let adapter = adapter(Arc::new(StubChain::new(Ok(true))));
        let tiers: Vec<u8> = adapter.supported_fee_tiers().iter().map(FeeTier::index).collect();
        assert_eq!(tiers, vec![0, 1, 2, 4, 5]);
        assert!(adapter.estimator().is_some());
        assert_eq!(adapter.contract_address(), "0xregistry");
    }
}
