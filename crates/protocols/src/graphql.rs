//! Hyperion GraphQL client.
//!
//! Two endpoints are involved: the stats indexer serves `getPoolStat`, the
//! public API serves position APR, pool lookup and user positions.

use crate::config::ProtocolConfig;
use crate::error::GraphQlError;
use async_trait::async_trait;
use fleeditto_domain::fees::FeeTier;
use fleeditto_domain::pool::{PoolLookup, PoolSnapshot, PoolStats};
use fleeditto_domain::position::UserPosition;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

const POOL_STATS_QUERY: &str = r#"
query GetPoolStats($poolId: String!) {
  api {
    getPoolStat(poolId: $poolId) {
      dailyVolumeUSD
      farmAPR
      feeAPR
      feesUSD
      id
      tvlUSD
      pool {
        currentTick
        sqrtPrice
        token1
        token2
      }
    }
  }
}"#;

const POSITION_APR_QUERY: &str = r#"
query fetchPositionAPR(
  $poolId: String = ""
  $tickLower: Float = 1.5
  $tickUpper: Float = 1.5
  $token1Amount: String = ""
  $token2Amount: String = ""
) {
  api {
    getPositionAPR(
      poolId: $poolId
      tickLower: $tickLower
      tickUpper: $tickUpper
      token1Amount: $token1Amount
      token2Amount: $token2Amount
    ) {
      dailyVolume
      farmAPR
      feeAPR
      lpAmount
      poolActiveLPAmountALL
      poolActiveLPAmountExclude
      value
    }
  }
}"#;

const POOL_LOOKUP_QUERY: &str = r#"
query GetPoolByTokenPair($token1: String!, $token2: String!, $feeTier: Float!) {
  api {
    getPoolByTokenPairAndFeeTier(token1: $token1, token2: $token2, feeTier: $feeTier) {
      poolId
      currentTick
    }
  }
}"#;

const USER_POSITIONS_QUERY: &str = r#"
query GetUserPositions($address: String!) {
  api {
    getPositionsByAddress(address: $address) {
      objectId
      poolId
      tickLower
      tickUpper
      value
      unclaimedFeesUSD
      pool {
        token1
        token2
      }
    }
  }
}"#;

/// Arguments of a position APR query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionAprRequest {
    pub pool_id: String,
    /// Signed tick, not normalized.
    pub tick_lower: i32,
    pub tick_upper: i32,
    /// Raw amount of the pool's token1.
    pub token1_amount: String,
    pub token2_amount: String,
}

/// APR estimate for a prospective position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PositionApr {
    pub daily_volume: Decimal,
    #[serde(rename = "farmAPR")]
    pub farm_apr: Decimal,
    #[serde(rename = "feeAPR")]
    pub fee_apr: Decimal,
    pub lp_amount: Decimal,
    #[serde(rename = "poolActiveLPAmountALL")]
    pub pool_active_lp_amount_all: Decimal,
    #[serde(rename = "poolActiveLPAmountExclude")]
    pub pool_active_lp_amount_exclude: Decimal,
    pub value: Decimal,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPoolStats {
    #[serde(rename = "dailyVolumeUSD", default)]
    daily_volume_usd: Decimal,
    #[serde(rename = "farmAPR", default)]
    farm_apr: Decimal,
    #[serde(rename = "feeAPR", default)]
    fee_apr: Decimal,
    #[serde(rename = "feesUSD", default)]
    fees_usd: Decimal,
    id: String,
    #[serde(rename = "tvlUSD", default)]
    tvl_usd: Decimal,
    pool: Option<RawPoolSnapshot>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPoolSnapshot {
    current_tick: Option<i64>,
    sqrt_price: Option<Value>,
    token1: Option<String>,
    token2: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPoolLookup {
    pool_id: Option<String>,
    current_tick: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUserPosition {
    object_id: String,
    pool_id: String,
    #[serde(default)]
    tick_lower: i64,
    #[serde(default)]
    tick_upper: i64,
    #[serde(default)]
    value: Decimal,
    #[serde(rename = "unclaimedFeesUSD", default)]
    unclaimed_fees_usd: Decimal,
    pool: Option<RawPoolSnapshot>,
}

impl From<RawPoolStats> for PoolStats {
    fn from(raw: RawPoolStats) -> Self {
        Self {
            id: raw.id,
            daily_volume_usd: raw.daily_volume_usd,
            farm_apr: raw.farm_apr,
            fee_apr: raw.fee_apr,
            fees_usd: raw.fees_usd,
            tvl_usd: raw.tvl_usd,
            pool: raw.pool.map(|p| PoolSnapshot {
                current_tick: p.current_tick,
                sqrt_price: p.sqrt_price.map(|v| match v {
                    Value::String(s) => s,
                    other => other.to_string(),
                }),
                token1: p.token1,
                token2: p.token2,
            }),
        }
    }
}

/// Read queries served by the Hyperion indexers.
#[async_trait]
pub trait HyperionIndexer: Send + Sync {
    async fn pool_stats(&self, pool_id: &str) -> Result<Option<PoolStats>, GraphQlError>;

    async fn position_apr(&self, request: &PositionAprRequest) -> Result<PositionApr, GraphQlError>;

    async fn pool_by_token_pair(
        &self,
        token1: &str,
        token2: &str,
        fee_tier: FeeTier,
    ) -> Result<Option<PoolLookup>, GraphQlError>;

    async fn user_positions(&self, address: &str) -> Result<Vec<UserPosition>, GraphQlError>;
}

/// Client for both Hyperion GraphQL endpoints.
#[derive(Debug, Clone)]
pub struct HyperionGraphQl {
    http: Client,
    stats_url: String,
    api_url: String,
}

impl HyperionGraphQl {
    pub fn new(stats_url: impl Into<String>, api_url: impl Into<String>) -> Result<Self, GraphQlError> {
        let http = Client::builder().timeout(Duration::from_secs(15)).build()?;
        Ok(Self {
            http,
            stats_url: stats_url.into(),
            api_url: api_url.into(),
        })
    }

    pub fn from_config(config: &ProtocolConfig) -> Result<Self, GraphQlError> {
        Self::new(
            config.hyperion_graphql_url.clone(),
            config.hyperion_apr_graphql_url.clone(),
        )
    }

    async fn query<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &str,
        variables: Value,
    ) -> Result<T, GraphQlError> {
        let response = self
            .http
            .post(url)
            .header("accept", "application/graphql-response+json, application/json")
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GraphQlError::Status(status.as_u16()));
        }

        let envelope: Envelope = response.json().await?;
        decode_envelope(envelope)
    }
}

#[async_trait]
impl HyperionIndexer for HyperionGraphQl {
    /// Fetches 24h stats of a pool. `None` when the indexer does not know it.
    async fn pool_stats(&self, pool_id: &str) -> Result<Option<PoolStats>, GraphQlError> {
        debug!(pool = %pool_id, "Fetching pool stats");
        let data: Value = self
            .query(&self.stats_url, POOL_STATS_QUERY, json!({ "poolId": pool_id }))
            .await?;
        match data.pointer("/api/getPoolStat") {
            Some(Value::Null) | None => {
                warn!(pool = %pool_id, "No pool stats returned");
                Ok(None)
            }
            Some(stats) => {
                let raw: RawPoolStats = serde_json::from_value(stats.clone())?;
                Ok(Some(raw.into()))
            }
        }
    }

    /// Estimates fee and farm APR for a prospective position.
    async fn position_apr(&self, request: &PositionAprRequest) -> Result<PositionApr, GraphQlError> {
        debug!(
            pool = %request.pool_id,
            tick_lower = request.tick_lower,
            tick_upper = request.tick_upper,
            "Fetching position APR"
        );
        let variables = json!({
            "poolId": request.pool_id,
            "tickLower": request.tick_lower,
            "tickUpper": request.tick_upper,
            "token1Amount": request.token1_amount,
            "token2Amount": request.token2_amount,
        });
        let data: Value = self.query(&self.api_url, POSITION_APR_QUERY, variables).await?;
        let apr = data
            .pointer("/api/getPositionAPR")
            .filter(|v| !v.is_null())
            .ok_or(GraphQlError::MissingData("getPositionAPR"))?;
        Ok(serde_json::from_value(apr.clone())?)
    }

    /// Resolves the pool id and current tick for a token pair and fee tier.
    async fn pool_by_token_pair(
        &self,
        token1: &str,
        token2: &str,
        fee_tier: FeeTier,
    ) -> Result<Option<PoolLookup>, GraphQlError> {
        debug!(token1 = %token1, token2 = %token2, fee_tier = %fee_tier, "Looking up pool");
        let variables = json!({
            "token1": token1,
            "token2": token2,
            "feeTier": fee_tier.index(),
        });
        let data: Value = self.query(&self.api_url, POOL_LOOKUP_QUERY, variables).await?;
        let Some(raw) = data
            .pointer("/api/getPoolByTokenPairAndFeeTier")
            .filter(|v| !v.is_null())
        else {
            return Ok(None);
        };
        let raw: RawPoolLookup = serde_json::from_value(raw.clone())?;
        Ok(raw.pool_id.filter(|id| !id.trim().is_empty()).map(|pool_id| PoolLookup {
            pool_id,
            current_tick: raw.current_tick,
        }))
    }

    /// Lists liquidity positions owned by `address`.
    async fn user_positions(&self, address: &str) -> Result<Vec<UserPosition>, GraphQlError> {
        debug!(owner = %address, "Fetching user positions");
        let data: Value = self
            .query(&self.api_url, USER_POSITIONS_QUERY, json!({ "address": address }))
            .await?;
        let raw = match data.pointer("/api/getPositionsByAddress") {
            Some(Value::Null) | None => return Ok(Vec::new()),
            Some(list) => list.clone(),
        };
        let raw: Vec<RawUserPosition> = serde_json::from_value(raw)?;
        Ok(raw
            .into_iter()
            .map(|p| {
                let (token_a, token_b) = p
                    .pool
                    .map(|pool| (pool.token1.unwrap_or_default(), pool.token2.unwrap_or_default()))
                    .unwrap_or_default();
                UserPosition {
                    position_id: p.object_id,
                    pool_id: p.pool_id,
                    token_a,
                    token_b,
                    tick_lower: p.tick_lower as i32,
                    tick_upper: p.tick_upper as i32,
                    value_usd: p.value,
                    unclaimed_fees_usd: p.unclaimed_fees_usd,
                }
            })
            .collect())
    }
}

fn decode_envelope<T: DeserializeOwned>(envelope: Envelope) -> Result<T, GraphQlError> {
    if !envelope.errors.is_empty() {
        let messages: Vec<String> = envelope
            .errors
            .iter()
            .map(|e| {
                e.get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| e.to_string())
            })
            .collect();
        return Err(GraphQlError::Errors(messages.join("; ")));
    }
    let data = envelope.data.ok_or(GraphQlError::MissingData("data"))?;
    Ok(serde_json::from_value(data)?)
}
