//! Read access to an Aptos fullnode.

use crate::config::NetworkConfig;
use crate::error::ChainError;
use async_trait::async_trait;
use fleeditto_domain::catalog::APT_COIN_TYPE;
use primitive_types::U256;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

/// Read-only chain queries used by adapters and services.
#[async_trait]
pub trait ChainView: Send + Sync {
    /// Calls a Move view function and returns its return values.
    async fn view(
        &self,
        function: &str,
        type_arguments: &[String],
        arguments: &[Value],
    ) -> Result<Vec<Value>, ChainError>;

    /// Reads the `data` of a resource stored under `address`.
    async fn account_resource(&self, address: &str, resource_type: &str) -> Result<Value, ChainError>;

    /// Native APT balance of `address` in octas.
    async fn account_apt_amount(&self, address: &str) -> Result<U256, ChainError> {
        let result = self
            .view(
                "0x1::coin::balance",
                &[APT_COIN_TYPE.to_string()],
                &[json!(address)],
            )
            .await?;
        result
            .first()
            .and_then(value_to_u256)
            .ok_or_else(|| ChainError::Decode(format!("APT balance for {address}")))
    }
}

/// Parses a u64/u128 view value, which the node encodes as a decimal string.
pub fn value_to_u256(value: &Value) -> Option<U256> {
    match value {
        Value::String(s) => U256::from_dec_str(s).ok(),
        Value::Number(n) => n.as_u64().map(U256::from),
        _ => None,
    }
}

/// Fullnode REST client.
#[derive(Debug, Clone)]
pub struct AptosRestClient {
    http: Client,
    base_url: String,
}

impl AptosRestClient {
    /// Creates a client for `base_url` (the fullnode `/v1` root).
    pub fn new(base_url: impl Into<String>) -> Result<Self, ChainError> {
        let http = Client::builder().timeout(Duration::from_secs(15)).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &NetworkConfig) -> Result<Self, ChainError> {
        Self::new(config.fullnode_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn read_json(response: reqwest::Response) -> Result<Value, ChainError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChainError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl ChainView for AptosRestClient {
    async fn view(
        &self,
        function: &str,
        type_arguments: &[String],
        arguments: &[Value],
    ) -> Result<Vec<Value>, ChainError> {
        debug!(function = %function, "Calling view function");
        let body = json!({
            "function": function,
            "type_arguments": type_arguments,
            "arguments": arguments,
        });
        let response = self
            .http
            .post(format!("{}/view", self.base_url))
            .json(&body)
            .send()
            .await?;

        match Self::read_json(response).await? {
            Value::Array(values) => Ok(values),
            other => Err(ChainError::Decode(format!("view {function} returned {other}"))),
        }
    }

    async fn account_resource(&self, address: &str, resource_type: &str) -> Result<Value, ChainError> {
        debug!(address = %address, resource = %resource_type, "Fetching account resource");
        let response = self
            .http
            .get(format!(
                "{}/accounts/{}/resource/{}",
                self.base_url, address, resource_type
            ))
            .send()
            .await?;

        let mut resource = Self::read_json(response).await?;
        match resource.get_mut("data") {
            Some(data) => Ok(data.take()),
            None => Err(ChainError::Decode(format!("resource {resource_type} has no data"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_to_u256() {
        assert_eq!(value_to_u256(&json!("123456789012345678901")), U256::from_dec_str("123456789012345678901").ok());
        assert_eq!(value_to_u256(&json!(42)), Some(U256::from(42u64)));
        assert_eq!(value_to_u256(&json!(true)), None);
        assert_eq!(value_to_u256(&json!("abc")), None);
    }

    #[test]
    fn test_base_url_is_trimmed() {
        let client = AptosRestClient::new("https://fullnode.mainnet.aptoslabs.com/v1/").unwrap();
        assert_eq!(client.base_url(), "https://fullnode.mainnet.aptoslabs.com/v1");
    }

    #[test]
    fn test_not_found() {
        let err = ChainError::Http {
            status: 404,
            body: String::new(),
        };
        assert!(err.is_not_found());
    }
}
