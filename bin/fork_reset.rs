use forknet::{
    config::{ControllerConfig, ForkEnv},
    fork::ForkController,
};
use init4_bin_base::{
    deps::tracing::{info, warn},
    utils::from_env::FromEnv,
};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let _guard = init4_bin_base::init4();

    let hardhat = ForkEnv::from_env()?.resolve()?;
    for issue in hardhat.check() {
        warn!(%issue, "network configuration issue");
    }

    let controller = ForkController::from_config(&ControllerConfig::from_env()?, &hardhat)?;
    let block = controller.reset_behind_head().await?;
    info!(block, fork_url = %controller.fork_url(), "node forked");

    Ok(())
}
