//! The resolved network configuration and its JSON rendering.
//!
//! The rendering matches what `JSON.stringify` would emit for the same
//! object in the consuming framework: undefined fields are dropped and
//! non-finite numbers become `null`.

use crate::config::ConfigVariant;
use serde::{Serialize, Serializer};

/// Chain id of the simulated network, as resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum ChainId {
    /// A coerced number. May be NaN or infinite.
    Number(f64),
    /// The raw environment value.
    Text(String),
    /// No value.
    Unset,
}

impl ChainId {
    /// True if the chain id is undefined.
    pub const fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// The chain id as an integer, if it is one.
    ///
    /// Text values are parsed as plain decimal integers. Numbers must be
    /// finite, non-negative and integral.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Number(n) => f64_as_u64(*n),
            Self::Text(s) => s.parse().ok(),
            Self::Unset => None,
        }
    }
}

/// Largest integer an f64 holds exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

fn f64_as_u64(n: f64) -> Option<u64> {
    (n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n <= MAX_SAFE_INTEGER).then_some(n as u64)
}

impl Serialize for ChainId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(n) if !n.is_finite() => serializer.serialize_none(),
            Self::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER => {
                serializer.serialize_i64(*n as i64)
            }
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Unset => serializer.serialize_unit(),
        }
    }
}

/// Fork source settings for a network profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Forking {
    /// Endpoint to fork state from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Block to fork at. `None` forks at the latest block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

/// The `hardhat` network profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkProfile {
    /// Chain id of the simulated network.
    #[serde(skip_serializing_if = "ChainId::is_unset")]
    pub chain_id: ChainId,
    /// Fork source settings.
    pub forking: Forking,
}

/// Named network profiles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Networks {
    /// The in-process simulated network.
    pub hardhat: NetworkProfile,
}

/// The full configuration object handed to the framework.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HardhatConfig {
    /// Compiler version.
    pub solidity: String,
    /// Network profiles.
    pub networks: Networks,
    /// The variant this configuration was resolved with.
    #[serde(skip)]
    pub variant: ConfigVariant,
}

impl HardhatConfig {
    /// Get the fork source URL, if set.
    pub fn fork_url(&self) -> Option<&str> {
        self.networks.hardhat.forking.url.as_deref()
    }

    /// Get the chain id as an integer, if it is one.
    pub fn chain_id(&self) -> Option<u64> {
        self.networks.hardhat.chain_id.as_u64()
    }

    /// Render as a JSON value.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    /// Render as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Check the configuration for values the framework is likely to choke
    /// on. The configuration itself is left untouched.
    pub fn check(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        let id = &self.networks.hardhat.chain_id;
        match id {
            ChainId::Unset => issues.push(ConfigIssue::ChainIdMissing),
            ChainId::Number(n) if n.is_nan() => issues.push(ConfigIssue::ChainIdNotANumber),
            ChainId::Number(n) if id.as_u64().is_none() => {
                issues.push(ConfigIssue::ChainIdNotInteger(n.to_string()))
            }
            ChainId::Text(s) if id.as_u64().is_none() => {
                issues.push(ConfigIssue::ChainIdNotInteger(s.clone()))
            }
            _ => {}
        }

        let var = self.variant.rpc_url_var();
        match self.fork_url() {
            None => issues.push(ConfigIssue::ForkUrlMissing { var }),
            Some(url) => {
                if let Err(reason) = check_fork_url(url) {
                    issues.push(ConfigIssue::ForkUrlInvalid { var, url: url.to_owned(), reason });
                }
            }
        }

        issues
    }
}

fn check_fork_url(url: &str) -> Result<(), String> {
    let parsed = url::Url::parse(url).map_err(|e| e.to_string())?;
    match parsed.scheme() {
        "http" | "https" | "ws" | "wss" => Ok(()),
        other => Err(format!("unsupported scheme `{other}`")),
    }
}

/// A problem found by [`HardhatConfig::check`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigIssue {
    /// `CHAIN_ID` was not set.
    #[error("CHAIN_ID is not set, chainId will be undefined")]
    ChainIdMissing,

    /// `CHAIN_ID` did not coerce to a number.
    #[error("CHAIN_ID is unset or not numeric, chainId will be NaN")]
    ChainIdNotANumber,

    /// `CHAIN_ID` is a number or string, but not a valid chain id.
    #[error("CHAIN_ID {0:?} is not a non-negative integer")]
    ChainIdNotInteger(String),

    /// The fork URL variable was not set.
    #[error("{var} is not set, forking url will be undefined")]
    ForkUrlMissing {
        /// The variable that was read.
        var: &'static str,
    },

    /// The fork URL is not a usable RPC endpoint.
    #[error("{var} {url:?} is not a valid rpc url: {reason}")]
    ForkUrlInvalid {
        /// The variable that was read.
        var: &'static str,
        /// The value that was read.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
}
