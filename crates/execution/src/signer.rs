//! Wallet boundary for entry-function transactions.

use async_trait::async_trait;
use fleeditto_protocols::TransactionPayload;
use thiserror::Error;

/// Fallback shown when the wallet reports a failure without a message.
pub const GENERIC_TRANSACTION_ERROR: &str = "Transaction failed";

/// Errors reported by a wallet.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignerError {
    #[error("User rejected the request")]
    Rejected,
    #[error("No wallet connected")]
    NotConnected,
    #[error("{}", if .0.trim().is_empty() { GENERIC_TRANSACTION_ERROR } else { .0.as_str() })]
    Failed(String),
}

/// Signs and submits transactions on behalf of the connected account.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// Address of the signing account.
    fn address(&self) -> Option<String>;

    /// Submits `payload` and returns the transaction hash.
    async fn sign_and_submit(&self, payload: TransactionPayload) -> Result<String, SignerError>;
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use std::sync::Mutex;

    /// Records every payload; fails when `failure` is set.
    #[derive(Default)]
    pub struct RecordingSigner {
        pub failure: Option<SignerError>,
        pub submitted: Mutex<Vec<TransactionPayload>>,
    }

    impl RecordingSigner {
        pub fn failing(error: SignerError) -> Self {
            Self {
                failure: Some(error),
                ..Self::default()
            }
        }

        pub fn submitted(&self) -> Vec<TransactionPayload> {
            self.submitted.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TransactionSigner for RecordingSigner {
        fn address(&self) -> Option<String> {
            Some("0xuser".to_string())
        }

        async fn sign_and_submit(&self, payload: TransactionPayload) -> Result<String, SignerError> {
            self.submitted.lock().unwrap().push(payload);
            match &self.failure {
                Some(error) => Err(error.clone()),
                None => Ok("0xhash".to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message_falls_back() {
        assert_eq!(SignerError::Failed(String::new()).to_string(), GENERIC_TRANSACTION_ERROR);
        assert_eq!(SignerError::Failed("out of gas".to_string()).to_string(), "out of gas");
    }
}
