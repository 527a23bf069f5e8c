use super::{DexAdapter, HyperionAdapter, TappAdapter, ThalaAdapter};
use crate::config::{DexInfo, ProtocolConfig, dex_info, supported_dexes};
use crate::error::AdapterError;
use crate::graphql::HyperionIndexer;
use crate::rpc::ChainView;
use fleeditto_domain::enums::DexId;
use std::sync::Arc;

/// Builds adapters sharing one chain client and indexer.
#[derive(Clone)]
pub struct AdapterFactory {
    chain: Arc<dyn ChainView>,
    indexer: Option<Arc<dyn HyperionIndexer>>,
    config: ProtocolConfig,
}

impl AdapterFactory {
    pub fn new(chain: Arc<dyn ChainView>, config: ProtocolConfig) -> Self {
        Self {
            chain,
            indexer: None,
            config,
        }
    }

    pub fn with_indexer(mut self, indexer: Arc<dyn HyperionIndexer>) -> Self {
        self.indexer = Some(indexer);
        self
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Resolves a DEX id such as `"hyperion"` to its adapter.
    pub fn get_dex_adapter(&self, dex_id: &str) -> Result<Arc<dyn DexAdapter>, AdapterError> {
        let id: DexId = dex_id.parse()?;
        Ok(self.adapter_for(id))
    }

    pub fn adapter_for(&self, id: DexId) -> Arc<dyn DexAdapter> {
        match id {
            DexId::Hyperion => Arc::new(self.hyperion()),
            DexId::Tapp => Arc::new(TappAdapter::new(dex_info(id).contract_address)),
            DexId::Thala => Arc::new(ThalaAdapter::new(dex_info(id).contract_address)),
        }
    }

    /// Concrete Hyperion adapter, for the operations outside the shared interface.
    pub fn hyperion(&self) -> HyperionAdapter {
        let adapter = HyperionAdapter::new(
            dex_info(DexId::Hyperion).contract_address,
            self.config.hyperion_contract.clone(),
            Arc::clone(&self.chain),
        );
        match &self.indexer {
            Some(indexer) => adapter.with_indexer(Arc::clone(indexer)),
            None => adapter,
        }
    }

    /// Every supported DEX with its adapter, in registry order.
    pub fn all_dex_adapters(&self) -> Vec<(DexInfo, Arc<dyn DexAdapter>)> {
        supported_dexes()
            .into_iter()
            .map(|info| {
                let adapter = self.adapter_for(info.id);
                (info, adapter)
            })
            .collect()
    }
}
