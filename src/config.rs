use crate::profile::{ChainId, Forking, HardhatConfig, NetworkProfile, Networks};
use init4_bin_base::utils::from_env::FromEnv;
use std::str::FromStr;

/// The compiler version every resolved configuration targets.
pub const SOLIDITY_VERSION: &str = "0.8.19";

/// The JSON-RPC endpoint of the fork node, if `HARDHAT_NODE_URL` is unset.
pub const DEFAULT_NODE_URL: &str = "http://hardhat-network:8545";

/// Number of blocks behind the upstream head to fork at, if
/// `FORK_BLOCK_LAG` is unset.
pub const DEFAULT_BLOCK_LAG: u64 = 10;

/// Raw environment inputs to the network configuration.
///
/// Every field is read verbatim. A missing variable is `None`, never an
/// error. Interpretation is left to [`ConfigVariant::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq, FromEnv)]
pub struct ForkEnv {
    /// Chain id of the simulated network.
    #[from_env(
        var = "CHAIN_ID",
        desc = "Chain id of the simulated network",
        infallible,
        optional
    )]
    pub chain_id: Option<String>,

    /// Fork source endpoint, read by the numeric variant.
    #[from_env(
        var = "RPC_URL",
        desc = "Fork source endpoint (numeric variant)",
        infallible,
        optional
    )]
    pub rpc_url: Option<String>,

    /// Fork source endpoint, read by the pass-through variant.
    #[from_env(
        var = "ETHEREUM_RPC_URL",
        desc = "Fork source endpoint (pass-through variant)",
        infallible,
        optional
    )]
    pub ethereum_rpc_url: Option<String>,

    /// Which variant to resolve with. See [`ConfigVariant`].
    #[from_env(
        var = "FORKNET_VARIANT",
        desc = "Configuration variant: `a` (numeric chain id, RPC_URL) or `b` (raw chain id, ETHEREUM_RPC_URL). Defaults to `a`",
        infallible,
        optional
    )]
    pub variant: Option<String>,
}

impl ForkEnv {
    /// Parse the selected variant, defaulting to [`ConfigVariant::A`].
    pub fn variant(&self) -> Result<ConfigVariant, UnknownVariant> {
        self.variant.as_deref().map_or(Ok(ConfigVariant::default()), |v| v.parse())
    }

    /// Resolve the configuration with the selected variant.
    pub fn resolve(&self) -> Result<HardhatConfig, UnknownVariant> {
        self.variant().map(|variant| variant.resolve(self))
    }
}

/// Returned when `FORKNET_VARIANT` names no known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown configuration variant {0:?}, expected `a` or `b`")]
pub struct UnknownVariant(pub String);

/// The two known shapes of the network configuration. They disagree on the
/// fork URL variable and on chain id coercion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigVariant {
    /// `CHAIN_ID` coerced to a number, fork URL from `RPC_URL`.
    #[default]
    A,
    /// `CHAIN_ID` passed through as text, fork URL from `ETHEREUM_RPC_URL`.
    B,
}

impl FromStr for ConfigVariant {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "numeric" => Ok(Self::A),
            "b" | "passthrough" => Ok(Self::B),
            _ => Err(UnknownVariant(s.to_owned())),
        }
    }
}

impl ConfigVariant {
    /// The environment variable this variant reads the fork URL from.
    pub const fn rpc_url_var(&self) -> &'static str {
        match self {
            Self::A => "RPC_URL",
            Self::B => "ETHEREUM_RPC_URL",
        }
    }

    /// Build the configuration from raw environment inputs. Values are
    /// passed through without validation.
    pub fn resolve(&self, env: &ForkEnv) -> HardhatConfig {
        let (chain_id, url) = match self {
            Self::A => (
                ChainId::Number(env.chain_id.as_deref().map_or(f64::NAN, coerce_number)),
                env.rpc_url.clone(),
            ),
            Self::B => (
                env.chain_id.clone().map_or(ChainId::Unset, ChainId::Text),
                env.ethereum_rpc_url.clone(),
            ),
        };

        HardhatConfig {
            solidity: SOLIDITY_VERSION.to_owned(),
            networks: Networks {
                hardhat: NetworkProfile {
                    chain_id,
                    forking: Forking { url, block_number: None },
                },
            },
            variant: *self,
        }
    }
}

/// Coerce a string to a number following ECMAScript `Number()` rules.
///
/// Leading and trailing whitespace is ignored and an empty string is `0`.
/// `0x`, `0o` and `0b` prefixes are unsigned radix integers. `Infinity` may
/// be signed. Everything else must be a decimal literal, or the result is
/// NaN. A missing value (`Number(undefined)`) is NaN, see
/// [`ConfigVariant::resolve`].
pub fn coerce_number(s: &str) -> f64 {
    let s = s.trim_matches(is_js_whitespace);
    if s.is_empty() {
        return 0.0;
    }

    if let Some(n) = radix_literal(s) {
        return n;
    }

    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    if is_decimal_literal(s) { s.parse().unwrap_or(f64::NAN) } else { f64::NAN }
}

/// ECMAScript WhiteSpace and LineTerminator code points.
const fn is_js_whitespace(c: char) -> bool {
    matches!(
        c,
        '\t' | '\u{b}'
            | '\u{c}'
            | '\u{feff}'
            | '\n'
            | '\r'
            | '\u{2028}'
            | '\u{2029}'
            // Zs
            | ' '
            | '\u{a0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200a}'
            | '\u{202f}'
            | '\u{205f}'
            | '\u{3000}'
    )
}

fn radix_literal(s: &str) -> Option<f64> {
    let (radix, digits) = match s.get(..2)? {
        "0x" | "0X" => (16, &s[2..]),
        "0o" | "0O" => (8, &s[2..]),
        "0b" | "0B" => (2, &s[2..]),
        _ => return None,
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Some(f64::NAN);
    }

    // Oversized literals round, they never overflow.
    Some(digits.chars().fold(0.0, |acc, c| {
        acc * radix as f64 + c.to_digit(radix).unwrap_or_default() as f64
    }))
}

/// `[+-]? (digits [. digits?] | . digits) ([eE] [+-]? digits)?`
fn is_decimal_literal(s: &str) -> bool {
    let s = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(idx) => (&s[..idx], Some(&s[idx + 1..])),
        None => (s, None),
    };

    let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int) || !all_digits(frac) || (int.is_empty() && frac.is_empty()) {
        return false;
    }

    match exponent {
        None => true,
        Some(exp) => {
            let exp = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !exp.is_empty() && all_digits(exp)
        }
    }
}

/// Configuration for driving a running fork node.
#[derive(Debug, Clone, FromEnv)]
pub struct ControllerConfig {
    /// JSON-RPC URL of the fork node.
    #[from_env(
        var = "HARDHAT_NODE_URL",
        desc = "JSON-RPC URL of the fork node. Defaults to http://hardhat-network:8545",
        infallible,
        optional
    )]
    pub node_url: Option<String>,

    /// Number of blocks behind the upstream head to fork at.
    #[from_env(
        var = "FORK_BLOCK_LAG",
        desc = "Number of blocks behind the upstream head to fork at when resetting",
        default = 10
    )]
    pub block_lag: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self { node_url: None, block_lag: DEFAULT_BLOCK_LAG }
    }
}

impl ControllerConfig {
    /// The fork node URL, falling back to [`DEFAULT_NODE_URL`].
    pub fn node_url(&self) -> Result<url::Url, url::ParseError> {
        url::Url::parse(self.node_url.as_deref().unwrap_or(DEFAULT_NODE_URL))
    }
}

/// Configuration for the `forknet` binary's HTTP surface.
#[derive(Debug, Clone, FromEnv)]
pub struct ServeConfig {
    /// Port to serve the resolved configuration on. Nothing is served if
    /// unset.
    #[from_env(
        var = "FORKNET_PORT",
        desc = "Port to serve the resolved configuration and healthcheck on"
    )]
    pub port: Option<u16>,
}
