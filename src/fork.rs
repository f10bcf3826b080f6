use crate::{config::ControllerConfig, profile::HardhatConfig};
use alloy::{
    network::Ethereum,
    primitives::U256,
    providers::{Provider, RootProvider},
    transports::TransportError,
};
use init4_bin_base::deps::metrics::counter;
use serde::Serialize;
use std::future::Future;
use tracing::{debug, error, info, instrument};
use url::Url;

type Result<T> = core::result::Result<T, ForkError>;

/// Errors that can occur when driving a fork node.
#[derive(Debug, thiserror::Error)]
pub enum ForkError {
    /// The configuration has no fork source URL.
    #[error("no fork url configured, set {0}")]
    NoForkUrl(&'static str),

    /// A URL could not be parsed.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// Error talking to the fork node or the fork source.
    #[error("rpc error: {0}")]
    Rpc(#[from] TransportError),

    /// The node answered `hardhat_reset` with `false`.
    #[error("node rejected reset to block {0:?}")]
    ResetRejected(Option<u64>),

    /// The node answered `evm_revert` with `false`.
    #[error("node rejected revert to snapshot {0}")]
    RevertRejected(U256),
}

/// Parameters for `hardhat_reset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResetParams {
    /// The fork to reset to.
    pub forking: ForkTarget,
}

/// Fork source and height for a reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForkTarget {
    /// Endpoint to fork state from.
    pub json_rpc_url: String,
    /// Block to fork at. Omitted to fork at the latest block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

/// The block to fork at, `lag` blocks behind `head`.
pub const fn fork_block(head: u64, lag: u64) -> u64 {
    head.saturating_sub(lag)
}

/// Drives a running fork node over JSON-RPC.
///
/// Resets use the fork source's current head, so the controller holds a
/// provider for both the node and the source. The fork source URL is sent
/// to the node exactly as configured.
#[derive(Debug, Clone)]
pub struct ForkController {
    node: RootProvider<Ethereum>,
    upstream: RootProvider<Ethereum>,
    fork_url: String,
    block_lag: u64,
}

impl ForkController {
    /// Create a controller for the node at `node`, forking from `fork_url`.
    pub fn new(node: Url, fork_url: impl Into<String>, block_lag: u64) -> Result<Self> {
        let fork_url = fork_url.into();
        Ok(Self {
            node: RootProvider::new_http(node),
            upstream: RootProvider::new_http(Url::parse(&fork_url)?),
            fork_url,
            block_lag,
        })
    }

    /// Create a controller from the controller config and the resolved
    /// network configuration.
    pub fn from_config(config: &ControllerConfig, hardhat: &HardhatConfig) -> Result<Self> {
        let fork_url = hardhat.fork_url().ok_or(ForkError::NoForkUrl(hardhat.variant.rpc_url_var()))?;
        Self::new(config.node_url()?, fork_url, config.block_lag)
    }

    /// Get the fork source URL, as configured.
    pub fn fork_url(&self) -> &str {
        &self.fork_url
    }

    /// Get the number of blocks behind head that resets fork at.
    pub const fn block_lag(&self) -> u64 {
        self.block_lag
    }

    /// Build `hardhat_reset` parameters for the given block.
    pub fn reset_params(&self, block_number: Option<u64>) -> ResetParams {
        ResetParams {
            forking: ForkTarget { json_rpc_url: self.fork_url.clone(), block_number },
        }
    }

    /// Fetch the latest block number of the fork source.
    #[instrument(skip(self), fields(fork_url = %self.fork_url))]
    pub async fn upstream_head(&self) -> Result<u64> {
        self.upstream.get_block_number().await.map_err(|err| {
            error!(%err, "failed to fetch upstream block number");
            err.into()
        })
    }

    /// Reset the node to fork from the source at `block_number`, or at the
    /// latest block if `None`.
    ///
    /// Hardhat replies `true` and Anvil replies `null`. Only an explicit
    /// `false` is a rejection.
    #[instrument(skip(self))]
    pub async fn reset(&self, block_number: Option<u64>) -> Result<()> {
        let params = self.reset_params(block_number);
        let reply: serde_json::Value =
            self.node.client().request("hardhat_reset", (params,)).await.map_err(|err| {
                error!(%err, "hardhat_reset failed");
                ForkError::from(err)
            })?;

        if reply == serde_json::Value::Bool(false) {
            return Err(ForkError::ResetRejected(block_number));
        }

        counter!("forknet.fork_resets").increment(1);
        info!("node re-forked");
        Ok(())
    }

    /// Reset the node to fork `block_lag` blocks behind the source's head.
    /// Returns the block forked at.
    #[instrument(skip(self))]
    pub async fn reset_behind_head(&self) -> Result<u64> {
        let head = self.upstream_head().await?;
        let block = fork_block(head, self.block_lag);
        debug!(head, block, "resetting behind upstream head");
        self.reset(Some(block)).await?;
        Ok(block)
    }

    /// Snapshot the node's state.
    #[instrument(skip(self))]
    pub async fn snapshot(&self) -> Result<U256> {
        let id: U256 = self.node.client().request_noparams("evm_snapshot").await.map_err(|err| {
            error!(%err, "evm_snapshot failed");
            ForkError::from(err)
        })?;
        debug!(%id, "took snapshot");
        Ok(id)
    }

    /// Revert the node to a snapshot. Returns `false` if the node did not
    /// know the snapshot.
    #[instrument(skip(self))]
    pub async fn revert(&self, id: U256) -> Result<bool> {
        self.node.client().request("evm_revert", (id,)).await.map_err(|err| {
            error!(%err, "evm_revert failed");
            err.into()
        })
    }

    /// Run `f` against a freshly forked node, then put the node back.
    ///
    /// The node is re-forked behind head and snapshotted before `f` runs.
    /// Afterwards it is reverted and re-forked again, whatever `f` did.
    pub async fn isolated<F, Fut, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.reset_behind_head().await?;
        let id = self.snapshot().await?;

        let out = f().await;

        let reverted = self.revert(id).await;
        let reset = self.reset_behind_head().await;
        if !reverted? {
            return Err(ForkError::RevertRejected(id));
        }
        reset?;

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigVariant, ForkEnv};
    use serde_json::json;

    fn controller() -> ForkController {
        ForkController::new("http://localhost:8545".parse().unwrap(), "https://eth.example.test/v1", 10)
            .unwrap()
    }

    #[test]
    fn reset_params_shape() {
        let controller = controller();
        assert_eq!(
            serde_json::to_value((controller.reset_params(Some(100)),)).unwrap(),
            json!([{ "forking": { "jsonRpcUrl": "https://eth.example.test/v1", "blockNumber": 100 } }])
        );
        assert_eq!(
            serde_json::to_value(controller.reset_params(None)).unwrap(),
            json!({ "forking": { "jsonRpcUrl": "https://eth.example.test/v1" } })
        );
    }

    #[test]
    fn reset_params_keep_url_verbatim() {
        let controller =
            ForkController::new("http://localhost:8545".parse().unwrap(), "https://eth.example.test", 10)
                .unwrap();
        assert_eq!(controller.fork_url(), "https://eth.example.test");
        assert_eq!(controller.reset_params(None).forking.json_rpc_url, "https://eth.example.test");
    }

    #[test]
    fn fork_block_saturates() {
        assert_eq!(fork_block(100, 10), 90);
        assert_eq!(fork_block(5, 10), 0);
        assert_eq!(fork_block(0, 0), 0);
    }

    #[test]
    fn from_config() {
        let config = ControllerConfig::default();
        let env = ForkEnv { rpc_url: Some("https://eth.example.test".into()), ..Default::default() };

        let controller = ForkController::from_config(&config, &ConfigVariant::A.resolve(&env)).unwrap();
        assert_eq!(controller.fork_url(), "https://eth.example.test");
        assert_eq!(controller.block_lag(), 10);

        let err = ForkController::from_config(&config, &ConfigVariant::B.resolve(&env)).unwrap_err();
        assert!(matches!(err, ForkError::NoForkUrl("ETHEREUM_RPC_URL")));

        let env = ForkEnv { rpc_url: Some("not a url".into()), ..Default::default() };
        let err = ForkController::from_config(&config, &ConfigVariant::A.resolve(&env)).unwrap_err();
        assert!(matches!(err, ForkError::Url(_)));
    }
}
