use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Aptos network the dashboard talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Aptos mainnet.
    #[default]
    Mainnet,
    /// Aptos testnet.
    Testnet,
    /// Aptos devnet.
    Devnet,
}

impl Network {
    /// Lowercase network name as used in explorer URLs and pool keys.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Devnet => "devnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            "devnet" => Ok(Self::Devnet),
            other => Err(DomainError::UnknownNetwork(other.to_string())),
        }
    }
}

/// DEX protocols the dashboard can build positions for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DexId {
    Thala,
    Tapp,
    Hyperion,
}

impl DexId {
    /// Every supported DEX, in registry order.
    pub const ALL: [DexId; 3] = [DexId::Thala, DexId::Tapp, DexId::Hyperion];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Thala => "thala",
            Self::Tapp => "tapp",
            Self::Hyperion => "hyperion",
        }
    }

    /// Human-readable protocol name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Thala => "Thala",
            Self::Tapp => "Tapp",
            Self::Hyperion => "Hyperion",
        }
    }

    /// Comma-separated list of supported ids, used in error messages.
    #[must_use]
    pub fn supported_list() -> String {
        Self::ALL.iter().map(DexId::as_str).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for DexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DexId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|dex| dex.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::UnsupportedDex(s.to_string()))
    }
}

/// Which of the two token slots an operation refers to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenSide {
    /// Base token (slot A).
    #[default]
    A,
    /// Quote token (slot B).
    B,
}

impl TokenSide {
    /// Returns the opposite slot.
    #[must_use]
    pub fn other(&self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

/// Lifecycle of the pool-existence check for the current selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolState {
    /// No DEX or token pair selected, or selection changed.
    #[default]
    Idle,
    /// Existence check in flight.
    Loading,
    /// Pool exists on chain.
    Exists,
    /// Pool does not exist on chain.
    NotExists,
}

impl PoolState {
    /// Whether the check has reached a terminal answer.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Exists | Self::NotExists)
    }
}
