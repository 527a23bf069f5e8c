//! USD prices from DexScreener, with a short in-memory cache.

use crate::config::DEXSCREENER_API_URL;
use crate::error::PriceError;
use fleeditto_domain::enums::Network;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, trace, warn};

/// Identical requests inside this window are served from cache.
pub const DEDUPE_WINDOW_SECS: u64 = 60;

const API_TIMEOUT_SECS: u64 = 10;

/// Price reported for every token off mainnet, where no market exists.
pub const MOCK_PRICE_USD: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// Market data of a token's most liquid pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPrice {
    pub address: String,
    pub price_usd: Decimal,
    pub price_change_24h: Decimal,
    pub volume_24h: Decimal,
    pub liquidity_usd: Decimal,
    pub fdv: Decimal,
    pub market_cap: Decimal,
}

impl TokenPrice {
    fn mock(address: &str) -> Self {
        Self {
            address: address.to_string(),
            price_usd: MOCK_PRICE_USD,
            price_change_24h: Decimal::ZERO,
            volume_24h: Decimal::ZERO,
            liquidity_usd: Decimal::ZERO,
            fdv: Decimal::ZERO,
            market_cap: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DexScreenerResponse {
    #[serde(default)]
    pairs: Option<Vec<DexScreenerPair>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DexScreenerPair {
    price_usd: Option<String>,
    price_change: Option<Window>,
    volume: Option<Window>,
    liquidity: Option<Liquidity>,
    fdv: Option<Decimal>,
    market_cap: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct Window {
    h24: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct Liquidity {
    usd: Option<Decimal>,
}

impl DexScreenerPair {
    fn liquidity_usd(&self) -> Decimal {
        self.liquidity.as_ref().and_then(|l| l.usd).unwrap_or_default()
    }
}

/// Picks the pair with the highest positive USD liquidity.
fn best_pair(address: &str, pairs: Vec<DexScreenerPair>) -> Option<TokenPrice> {
    let pair = pairs
        .into_iter()
        .filter(|p| p.liquidity_usd() > Decimal::ZERO)
        .max_by(|a, b| a.liquidity_usd().cmp(&b.liquidity_usd()))?;

    Some(TokenPrice {
        address: address.to_string(),
        price_usd: pair
            .price_usd
            .as_deref()
            .and_then(|p| p.parse().ok())
            .unwrap_or_default(),
        price_change_24h: pair.price_change.as_ref().and_then(|w| w.h24).unwrap_or_default(),
        volume_24h: pair.volume.as_ref().and_then(|w| w.h24).unwrap_or_default(),
        liquidity_usd: pair.liquidity_usd(),
        fdv: pair.fdv.unwrap_or_default(),
        market_cap: pair.market_cap.unwrap_or_default(),
    })
}

/// `price_a / price_b`, or zero when `price_b` is zero.
pub fn relative_price(price_a: Decimal, price_b: Decimal) -> Decimal {
    if price_b.is_zero() {
        return Decimal::ZERO;
    }
    price_a.checked_div(price_b).unwrap_or_default()
}

struct CachedPrice {
    fetched_at: Instant,
    price: Option<TokenPrice>,
}

#[derive(Clone)]
pub struct PriceService {
    http: Client,
    base_url: String,
    network: Network,
    dedupe_window: Duration,
    cache: Arc<RwLock<HashMap<String, CachedPrice>>>,
}

impl PriceService {
    pub fn new(network: Network) -> Result<Self, PriceError> {
        Self::with_base_url(DEXSCREENER_API_URL, network)
    }

    pub fn with_base_url(base_url: impl Into<String>, network: Network) -> Result<Self, PriceError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(API_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            network,
            dedupe_window: Duration::from_secs(DEDUPE_WINDOW_SECS),
            cache: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// Market data of `address`, `None` when no pair has liquidity.
    pub async fn token_price(&self, address: &str) -> Result<Option<TokenPrice>, PriceError> {
        if self.network != Network::Mainnet {
            trace!(token = %address, network = %self.network, "Using mock price");
            return Ok(Some(TokenPrice::mock(address)));
        }

        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.get(address) {
                if cached.fetched_at.elapsed() < self.dedupe_window {
                    trace!(token = %address, "Price served from cache");
                    return Ok(cached.price.clone());
                }
            }
        }

        let price = self.fetch(address).await?;
        self.cache.write().await.insert(
            address.to_string(),
            CachedPrice {
                fetched_at: Instant::now(),
                price: price.clone(),
            },
        );
        Ok(price)
    }

    /// Price of `token_a` in units of `token_b`. `None` if either price is unknown.
    pub async fn relative_price(&self, token_a: &str, token_b: &str) -> Result<Option<Decimal>, PriceError> {
        let (a, b) = tokio::try_join!(self.token_price(token_a), self.token_price(token_b))?;
        Ok(a.zip(b).map(|(a, b)| relative_price(a.price_usd, b.price_usd)))
    }

    /// USD prices keyed by address, for batch valuation. Unknown tokens are omitted.
    pub async fn usd_prices(&self, addresses: &[String]) -> HashMap<String, Decimal> {
        let mut prices = HashMap::new();
        for address in addresses {
            match self.token_price(address).await {
                Ok(Some(price)) => {
                    prices.insert(address.clone(), price.price_usd);
                }
                Ok(None) => debug!(token = %address, "No priced pair"),
                Err(e) => warn!(token = %address, error = %e, "Failed to fetch token price"),
            }
        }
        prices
    }

    async fn fetch(&self, address: &str) -> Result<Option<TokenPrice>, PriceError> {
        debug!(token = %address, "Fetching token price");
        let response = self
            .http
            .get(format!("{}/tokens/{}", self.base_url, address))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PriceError::Status(status.as_u16()));
        }
        let body: DexScreenerResponse = response.json().await?;
        Ok(best_pair(address, body.pairs.unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_best_pair_prefers_liquidity() {
        let body: DexScreenerResponse = serde_json::from_value(json!({
            "schemaVersion": "1.0.0",
            "pairs": [
                { "priceUsd": "4.90", "liquidity": { "usd": 1000.0 } },
                { "priceUsd": "5.02", "liquidity": { "usd": 250000.5 }, "volume": { "h24": 12000 } },
                { "priceUsd": "9.99", "liquidity": { "usd": 0 } }
            ]
        }))
        .unwrap();
        let price = best_pair("0xa", body.pairs.unwrap()).unwrap();
        assert_eq!(price.price_usd, dec!(5.02));
        assert_eq!(price.volume_24h, dec!(12000));
    }

    #[test]
    fn test_no_liquid_pair() {
        let body: DexScreenerResponse = serde_json::from_value(json!({ "pairs": null })).unwrap();
        assert!(best_pair("0xa", body.pairs.unwrap_or_default()).is_none());
    }

    #[test]
    fn test_relative_price() {
        assert_eq!(relative_price(dec!(5), dec!(0.5)), dec!(10));
        assert_eq!(relative_price(dec!(5), Decimal::ZERO), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_mock_price_off_mainnet() {
        let service = PriceService::new(Network::Testnet).unwrap();
        let price = service.token_price("0xa").await.unwrap().unwrap();
        assert_eq!(price.price_usd, MOCK_PRICE_USD);
        assert_eq!(service.relative_price("0xa", "0xb").await.unwrap(), Some(Decimal::ONE));
    }
}
