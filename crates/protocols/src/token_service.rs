//! Token metadata and wallet balances read from chain.

use crate::rpc::{ChainView, value_to_u256};
use fleeditto_domain::catalog::{find_token_by_address, is_apt};
use fleeditto_domain::enums::Network;
use fleeditto_domain::token::{DEFAULT_DECIMALS, TokenBalance, TokenMetadata};
use primitive_types::U256;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, warn};

const METADATA_RESOURCE: &str = "0x1::fungible_asset::Metadata";
const FA_BALANCE_VIEW: &str = "0x1::primary_fungible_store::balance";

#[derive(Clone)]
pub struct TokenService {
    chain: Arc<dyn ChainView>,
    network: Network,
}

impl TokenService {
    pub fn new(chain: Arc<dyn ChainView>, network: Network) -> Self {
        Self { chain, network }
    }

    /// Reads the fungible-asset metadata of `address`.
    ///
    /// Never fails: an unreadable resource falls back to the known-token list,
    /// then to `UNKNOWN` with 8 decimals.
    pub async fn metadata(&self, address: &str) -> TokenMetadata {
        match self.chain.account_resource(address, METADATA_RESOURCE).await {
            Ok(resource) => metadata_from_resource(address, &resource),
            Err(e) => {
                let fallback = find_token_by_address(self.network, address)
                    .map(|known| TokenMetadata {
                        address: address.to_string(),
                        ..known
                    })
                    .unwrap_or_else(|| TokenMetadata::unknown(address));
                warn!(token = %address, error = %e, symbol = %fallback.symbol, "Failed to fetch token metadata");
                fallback
            }
        }
    }

    /// Balance of `token` held by `owner`. Read failures yield zero.
    pub async fn balance(&self, owner: &str, token: &str) -> TokenBalance {
        let metadata = self.metadata(token).await;
        let raw = self.raw_balance(owner, token).await;
        debug!(owner = %owner, token = %token, raw = %raw, "Fetched token balance");
        TokenBalance::new(token, raw, metadata.decimals)
    }

    async fn raw_balance(&self, owner: &str, token: &str) -> U256 {
        if is_apt(token) {
            return match self.chain.account_apt_amount(owner).await {
                Ok(amount) => amount,
                Err(e) => {
                    debug!(owner = %owner, error = %e, "APT balance unavailable, using 0");
                    U256::zero()
                }
            };
        }

        let result = self
            .chain
            .view(
                FA_BALANCE_VIEW,
                &[METADATA_RESOURCE.to_string()],
                &[json!(owner), json!(token)],
            )
            .await;
        match result {
            Ok(values) => values.first().and_then(value_to_u256).unwrap_or_default(),
            // The store does not exist until the owner first receives the asset.
            Err(e) if e.is_not_found() => U256::zero(),
            Err(e) => {
                warn!(owner = %owner, token = %token, error = %e, "Failed to fetch fungible store balance");
                U256::zero()
            }
        }
    }
}

fn metadata_from_resource(address: &str, resource: &Value) -> TokenMetadata {
    let text = |key: &str| {
        resource
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let decimals = match resource.get("decimals") {
        Some(Value::Number(n)) => n.as_u64().and_then(|d| u8::try_from(d).ok()),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    }
    .unwrap_or(DEFAULT_DECIMALS);

    TokenMetadata::new(
        address,
        text("symbol").unwrap_or_else(|| "UNKNOWN".to_string()),
        decimals,
        text("name").unwrap_or_else(|| "Unknown Token".to_string()),
    )
}
