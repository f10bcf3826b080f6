use forknet::{
    config::{ForkEnv, ServeConfig},
    service::serve_config,
};
use init4_bin_base::{
    deps::tracing::{info, info_span, warn},
    utils::from_env::FromEnv,
};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> eyre::Result<()> {
    let _guard = init4_bin_base::init4();
    let init_span_guard = info_span!("forknet initialization").entered();

    // Pull the raw inputs from the environment. Missing values are passed
    // through, not rejected.
    let env = ForkEnv::from_env()?;
    let config = env.resolve()?;
    info!(variant = ?config.variant, chain_id = ?config.networks.hardhat.chain_id, "resolved network configuration");

    for issue in config.check() {
        warn!(%issue, "network configuration issue");
    }

    println!("{}", config.to_json_pretty()?);

    let serve = ServeConfig::from_env()?;
    drop(init_span_guard);

    if let Some(port) = serve.port {
        serve_config(([0, 0, 0, 0], port), config).await?;
        info!("server finished");
    }

    Ok(())
}
