//! Network endpoints and protocol addresses.
//!
//! Every value has a built-in default; environment variables override them:
//! - `APTOS_NETWORK`, `APTOS_RPC_URL`
//! - `HYPERION_GRAPHQL_URL`, `HYPERION_APR_GRAPHQL_URL`
//! - `BATCH_CONTRACT_ADDRESS`

use fleeditto_domain::DomainError;
use fleeditto_domain::enums::{DexId, Network};
use std::env;

/// Hyperion stats indexer (pool stats).
pub const HYPERION_GRAPHQL_URL: &str = "https://hyperfluid-api.alcove.pro/v1/graphql";
/// Hyperion public API (position APR, pool lookup).
pub const HYPERION_APR_GRAPHQL_URL: &str = "https://api.hyperion.xyz/v1/graphql";
/// Hyperion core package on mainnet.
pub const HYPERION_MAINNET_CONTRACT: &str =
    "0x8b4a2c4bb53857c718a04c020b98f8c2e1f99a68b0f57389a8bf5434cd22e05c";
/// Hyperion core package on testnet.
pub const HYPERION_TESTNET_CONTRACT: &str =
    "0x3673bee9e7b78ae63d4a9e3d58425bc97e7f3b8d68efc846ee732b14369333dd";
/// Package exposing the `batch` module.
pub const BATCH_CONTRACT_ADDRESS: &str =
    "0x3a911a96b4d6736392120b4af910db1aeda07c4e0b19e9059e1aedb35b4fc10a";
/// USD price feed.
pub const DEXSCREENER_API_URL: &str = "https://api.dexscreener.com/latest/dex";

/// Static description of a supported DEX.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DexInfo {
    pub id: DexId,
    pub name: &'static str,
    pub logo_url: &'static str,
    pub contract_address: &'static str,
}

pub fn dex_info(id: DexId) -> DexInfo {
    match id {
        DexId::Thala => DexInfo {
            id,
            name: "Thala",
            logo_url: "https://media.aptosfoundation.org/1687169730-thala-labs.jpeg?auto=format&fit=crop&h=344&w=344",
            contract_address: "0x007730cd28ee1cdc9e999336cbc430f99e7c44397c0aa77516f6f23a78559bb5",
        },
        DexId::Tapp => DexInfo {
            id,
            name: "tapp Exchange",
            logo_url: "https://tapp.exchange/main-icon.png",
            contract_address: "0x487e905f899ccb6d46fdaec56ba1e0c4cf119862a16c409904b8c78fab1f5e8a",
        },
        DexId::Hyperion => DexInfo {
            id,
            name: "Hyperion",
            logo_url: "https://hyperion.xyz/fav-new.svg",
            contract_address: HYPERION_MAINNET_CONTRACT,
        },
    }
}

/// Registry of supported DEXes, in display order.
pub fn supported_dexes() -> Vec<DexInfo> {
    DexId::ALL.into_iter().map(dex_info).collect()
}

/// Fullnode and indexer endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Network in use.
    pub network: Network,
    /// Fullnode REST base URL, ending in `/v1`.
    pub fullnode_url: String,
    /// Indexer GraphQL URL.
    pub indexer_url: String,
}

impl NetworkConfig {
    /// Default endpoints of `network`.
    #[must_use]
    pub fn for_network(network: Network) -> Self {
        Self {
            network,
            fullnode_url: format!("https://fullnode.{}.aptoslabs.com/v1", network.as_str()),
            indexer_url: format!("https://indexer.{}.aptoslabs.com/v1/graphql", network.as_str()),
        }
    }

    /// Reads `APTOS_NETWORK` and `APTOS_RPC_URL`.
    pub fn from_env() -> Result<Self, DomainError> {
        let network = match env::var("APTOS_NETWORK") {
            Ok(value) => value.parse()?,
            Err(_) => Network::default(),
        };
        let mut config = Self::for_network(network);
        if let Ok(url) = env::var("APTOS_RPC_URL") {
            config.fullnode_url = url;
        }
        Ok(config)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::for_network(Network::default())
    }
}

/// Contract addresses and API endpoints of the protocols in use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolConfig {
    /// Hyperion core package for the configured network.
    pub hyperion_contract: String,
    /// Batch module package.
    pub batch_contract: String,
    /// Pool stats endpoint.
    pub hyperion_graphql_url: String,
    /// Position APR and pool lookup endpoint.
    pub hyperion_apr_graphql_url: String,
    /// USD price feed base URL.
    pub price_api_url: String,
}

impl ProtocolConfig {
    /// Defaults for `network`. Networks without a Hyperion deployment fall back to mainnet.
    #[must_use]
    pub fn for_network(network: Network) -> Self {
        let hyperion_contract = match network {
            Network::Testnet => HYPERION_TESTNET_CONTRACT,
            Network::Mainnet | Network::Devnet => HYPERION_MAINNET_CONTRACT,
        };
        Self {
            hyperion_contract: hyperion_contract.to_string(),
            batch_contract: BATCH_CONTRACT_ADDRESS.to_string(),
            hyperion_graphql_url: HYPERION_GRAPHQL_URL.to_string(),
            hyperion_apr_graphql_url: HYPERION_APR_GRAPHQL_URL.to_string(),
            price_api_url: DEXSCREENER_API_URL.to_string(),
        }
    }

    /// Applies `HYPERION_GRAPHQL_URL`, `HYPERION_APR_GRAPHQL_URL` and
    /// `BATCH_CONTRACT_ADDRESS` on top of the network defaults.
    pub fn from_env(network: Network) -> Self {
        let mut config = Self::for_network(network);
        if let Ok(url) = env::var("HYPERION_GRAPHQL_URL") {
            config.hyperion_graphql_url = url;
        }
        if let Ok(url) = env::var("HYPERION_APR_GRAPHQL_URL") {
            config.hyperion_apr_graphql_url = url;
        }
        if let Ok(address) = env::var("BATCH_CONTRACT_ADDRESS") {
            config.batch_contract = address;
        }
        config
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self::for_network(Network::default())
    }
}
