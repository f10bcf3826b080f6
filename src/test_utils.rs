//! Test utilities for forknet.
use crate::config::ForkEnv;
use init4_bin_base::deps::tracing_subscriber::{
    EnvFilter, Layer, fmt, layer::SubscriberExt, registry, util::SubscriberInitExt,
};

/// Chain id used by test environments.
pub const TEST_CHAIN_ID: &str = "1337";

/// Fork source used by test environments.
pub const TEST_RPC_URL: &str = "https://example.test";

/// Returns a [`ForkEnv`] with every input set to test values.
pub fn setup_test_env() -> ForkEnv {
    ForkEnv {
        chain_id: Some(TEST_CHAIN_ID.into()),
        rpc_url: Some(TEST_RPC_URL.into()),
        ethereum_rpc_url: Some(TEST_RPC_URL.into()),
        variant: None,
    }
}

/// Initializes a logger that prints during testing
pub fn setup_logging() {
    let filter = EnvFilter::from_default_env();
    let fmt = fmt::layer().with_filter(filter);
    let registry = registry().with(fmt);
    let _ = registry.try_init();
}
