//! Stub chain and indexer shared by the service tests.

use async_trait::async_trait;
use fleeditto_domain::fees::FeeTier;
use fleeditto_domain::pool::{PoolLookup, PoolStats};
use fleeditto_domain::position::UserPosition;
use fleeditto_protocols::error::{ChainError, GraphQlError};
use fleeditto_protocols::graphql::{HyperionIndexer, PositionApr, PositionAprRequest};
use fleeditto_protocols::rpc::ChainView;
use fleeditto_protocols::HyperionAdapter;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Answers `liquidity_pool_exists` with `exists` and `is_sorted` with `true`.
pub struct StubChain {
    pub exists: bool,
    pub calls: AtomicUsize,
}

impl StubChain {
    pub fn new(exists: bool) -> Arc<Self> {
        Arc::new(Self {
            exists,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainView for StubChain {
    async fn view(&self, function: &str, _type_arguments: &[String], _arguments: &[Value]) -> Result<Vec<Value>, ChainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if function.ends_with("::is_sorted") {
            return Ok(vec![json!(true)]);
        }
        Ok(vec![json!(self.exists)])
    }

    async fn account_resource(&self, _address: &str, _resource_type: &str) -> Result<Value, ChainError> {
        Err(ChainError::Decode("unused".to_string()))
    }
}

/// Indexer with canned answers; `failing` makes every call return a 502.
#[derive(Default)]
pub struct StubIndexer {
    pub lookup: Option<PoolLookup>,
    pub stats: Option<PoolStats>,
    pub apr: PositionApr,
    pub positions: Vec<UserPosition>,
    pub failing: bool,
    pub apr_requests: Mutex<Vec<PositionAprRequest>>,
}

impl StubIndexer {
    fn check(&self) -> Result<(), GraphQlError> {
        if self.failing { Err(GraphQlError::Status(502)) } else { Ok(()) }
    }
}

#[async_trait]
impl HyperionIndexer for StubIndexer {
    async fn pool_stats(&self, _pool_id: &str) -> Result<Option<PoolStats>, GraphQlError> {
        self.check()?;
        Ok(self.stats.clone())
    }

    async fn position_apr(&self, request: &PositionAprRequest) -> Result<PositionApr, GraphQlError> {
        self.check()?;
        self.apr_requests.lock().unwrap().push(request.clone());
        Ok(self.apr.clone())
    }

    async fn pool_by_token_pair(
        &self,
        _token1: &str,
        _token2: &str,
        _fee_tier: FeeTier,
    ) -> Result<Option<PoolLookup>, GraphQlError> {
        self.check()?;
        Ok(self.lookup.clone())
    }

    async fn user_positions(&self, _address: &str) -> Result<Vec<UserPosition>, GraphQlError> {
        self.check()?;
        Ok(self.positions.clone())
    }
}

pub fn lookup() -> PoolLookup {
    PoolLookup {
        pool_id: "0xpool".to_string(),
        current_tick: Some(-23028),
    }
}

pub fn stats() -> PoolStats {
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

pub fn hyperion(chain: Arc<StubChain>, indexer: Arc<StubIndexer>) -> Arc<HyperionAdapter> {
    Arc::new(HyperionAdapter::new("0xregistry", "0xhyperion", chain).with_indexer(indexer))
}
