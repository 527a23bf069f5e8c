//! On-chain positions of the connected account.

use crate::signer::TransactionSigner;
use fleeditto_domain::enums::{DexId, Network};
use fleeditto_domain::position::UserPosition;
use fleeditto_protocols::TransactionPayload;
use fleeditto_protocols::batch_contract::{batch_claim_hyperion, remove_all_hyperion, remove_hyperion};
use fleeditto_protocols::error::GraphQlError;
use fleeditto_protocols::graphql::HyperionIndexer;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum PositionError {
    #[error("Position not found: {0}")]
    NotFound(String),
    #[error("TAPP batch claiming not yet implemented")]
    TappClaimUnsupported,
    #[error("Thala batch claiming not yet implemented")]
    ThalaClaimUnsupported,
    #[error("Failed to load positions: {0}")]
    Indexer(#[from] GraphQlError),
    /// Wallet or transaction failure, verbatim.
    #[error("{0}")]
    Transaction(String),
}

/// Configuration for the position list.
#[derive(Debug, Clone)]
pub struct PositionsConfig {
    /// How long an error stays visible.
    pub error_ttl: Duration,
    /// Package exposing the `batch` module.
    pub batch_contract: String,
    /// Network used in explorer links.
    pub network: Network,
}

impl PositionsConfig {
    pub fn new(batch_contract: impl Into<String>, network: Network) -> Self {
        Self {
            error_ttl: Duration::from_secs(5),
            batch_contract: batch_contract.into(),
            network,
        }
    }
}

/// Explorer page of a position object.
pub fn explorer_url(position_id: &str, network: Network) -> String {
    format!("https://explorer.aptoslabs.com/object/{position_id}?network={network}")
}

/// Position list with optimistic remove and claim.
///
/// Each mutation is applied locally before the transaction is signed and
/// rolled back to the exact prior list if signing or submission fails.
#[derive(Clone)]
pub struct UserPositions {
    indexer: Arc<dyn HyperionIndexer>,
    config: PositionsConfig,
    positions: Arc<RwLock<Vec<UserPosition>>>,
    error: Arc<RwLock<Option<(String, Instant)>>>,
    /// Serializes mutations so a rollback never overwrites a later change.
    mutation: Arc<Mutex<()>>,
}

impl UserPositions {
    pub fn new(indexer: Arc<dyn HyperionIndexer>, config: PositionsConfig) -> Self {
        Self {
            indexer,
            config,
            positions: Arc::new(RwLock::new(Vec::new())),
            error: Arc::new(RwLock::new(None)),
            mutation: Arc::new(Mutex::new(())),
        }
    }

    pub async fn positions(&self) -> Vec<UserPosition> {
        self.positions.read().await.clone()
    }

    /// Current error, if it was raised within the error TTL.
    pub async fn error(&self) -> Option<String> {
        let mut error = self.error.write().await;
        if error
            .as_ref()
            .is_some_and(|(_, raised)| raised.elapsed() >= self.config.error_ttl)
        {
            *error = None;
        }
        error.as_ref().map(|(message, _)| message.clone())
    }

    pub fn explorer_url(&self, position_id: &str) -> String {
        explorer_url(position_id, self.config.network)
    }

    /// Replaces the list with the positions the indexer reports for `owner`.
    pub async fn load(&self, owner: &str) -> Result<usize, PositionError> {
        let _guard = self.mutation.lock().await;
        match self.indexer.user_positions(owner).await {
            Ok(positions) => {
                let count = positions.len();
                info!(owner = %owner, count, "Loaded positions");
                *self.positions.write().await = positions;
                Ok(count)
            }
            Err(e) => {
                let e = PositionError::from(e);
                self.set_error(&e).await;
                Err(e)
            }
        }
    }

    /// Closes one position.
    pub async fn remove(&self, position_id: &str, signer: &dyn TransactionSigner) -> Result<String, PositionError> {
        let _guard = self.mutation.lock().await;
        if !self.positions.read().await.iter().any(|p| p.position_id == position_id) {
            return Err(PositionError::NotFound(position_id.to_string()));
        }

        let payload = remove_hyperion(&self.config.batch_contract, position_id);
        self.optimistic(payload, signer, |positions| {
            positions.retain(|p| p.position_id != position_id);
        })
        .await
    }

    /// Closes every listed position. `None` when the list is empty.
    pub async fn remove_all(&self, signer: &dyn TransactionSigner) -> Result<Option<String>, PositionError> {
        let _guard = self.mutation.lock().await;
        let ids = self.position_ids().await;
        if ids.is_empty() {
            return Ok(None);
        }

        let payload = remove_all_hyperion(&self.config.batch_contract, &ids);
        self.optimistic(payload, signer, Vec::clear).await.map(Some)
    }

    /// Claims fees and rewards of every listed position on `dex`.
    pub async fn claim_all(
        &self,
        dex: DexId,
        signer: &dyn TransactionSigner,
    ) -> Result<Option<String>, PositionError> {
        let unsupported = match dex {
            DexId::Hyperion => None,
            DexId::Tapp => Some(PositionError::TappClaimUnsupported),
            DexId::Thala => Some(PositionError::ThalaClaimUnsupported),
        };
        if let Some(e) = unsupported {
            self.set_error(&e).await;
            return Err(e);
        }

        let _guard = self.mutation.lock().await;
        let ids = self.position_ids().await;
        if ids.is_empty() {
            return Ok(None);
        }

        let payload = batch_claim_hyperion(&self.config.batch_contract, &ids);
        self.optimistic(payload, signer, |positions| {
            for position in positions.iter_mut() {
                position.unclaimed_fees_usd = Decimal::ZERO;
            }
        })
        .await
        .map(Some)
    }

    async fn position_ids(&self) -> Vec<String> {
        self.positions
            .read()
            .await
            .iter()
            .map(|p| p.position_id.clone())
            .collect()
    }

    async fn optimistic(
        &self,
        payload: TransactionPayload,
        signer: &dyn TransactionSigner,
        mutate: impl FnOnce(&mut Vec<UserPosition>),
    ) -> Result<String, PositionError> {
        let snapshot = {
            let mut positions = self.positions.write().await;
            let snapshot = positions.clone();
            mutate(&mut *positions);
            snapshot
        };
        *self.error.write().await = None;

        let function = payload.entry_name().to_string();
        match signer.sign_and_submit(payload).await {
            Ok(hash) => {
                info!(function = %function, hash = %hash, "Position transaction submitted");
                Ok(hash)
            }
            Err(e) => {
                error!(function = %function, error = %e, "Position transaction failed, rolling back");
                *self.positions.write().await = snapshot;
                let e = PositionError::Transaction(e.to_string());
                self.set_error(&e).await;
                Err(e)
            }
        }
    }

    async fn set_error(&self, e: &PositionError) {
        *self.error.write().await = Some((e.to_string(), Instant::now()));
    }
}
