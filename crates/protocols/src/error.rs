use fleeditto_domain::DomainError;
use fleeditto_domain::math::MathError;
use thiserror::Error;

/// Failures talking to an Aptos fullnode.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Transport-level failure.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Node answered with a non-success status.
    #[error("Node returned {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },
    /// Response body did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ChainError {
    /// Whether the node reported the resource as absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Http { status: 404, .. })
    }
}

/// Failures querying the Hyperion GraphQL API.
#[derive(Debug, Error)]
pub enum GraphQlError {
    #[error("GraphQL request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("GraphQL endpoint returned status {0}")]
    Status(u16),
    /// Non-empty `errors[]` in the response.
    #[error("GraphQL errors: {0}")]
    Errors(String),
    #[error("GraphQL response missing {0}")]
    MissingData(&'static str),
    #[error("Failed to decode GraphQL response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors raised by DEX adapters and the liquidity estimator.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error(transparent)]
    GraphQl(#[from] GraphQlError),
    #[error(transparent)]
    Math(#[from] MathError),
    /// Payload arguments could not be assembled.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
    #[error("Operation not supported by {dex}: {operation}")]
    Unsupported {
        dex: &'static str,
        operation: &'static str,
    },
}

/// Failures of the USD price feed.
#[derive(Debug, Error)]
pub enum PriceError {
    #[error("Price request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Price feed returned status {0}")]
    Status(u16),
}
