//! Walk one DB instance through its whole lifecycle: create, stop,
//! start, restart, delete.

use ::mydbs_common::{config::Config, error::Result, resource::ShutdownMode, tracing::info};
use ::mydbs_manager::shutdown::ManagerPair;

use crate::setup;

pub async fn run(pair: &ManagerPair, config: &Config) -> Result<()> {
    let request = setup::create_instance_request(
        config,
        setup::unique_display_name("mydbs-sample-instance"),
    );
    info!("Creating DB instance '{}'", request.display_name);
    let instance = pair.instances.create_and_wait(&request).await?;
    info!("DB instance {} is Active", instance.id);

    info!("Stopping DB instance {}", instance.id);
    pair.instances
        .stop_and_wait(&instance.id, ShutdownMode::Fast)
        .await?;

    info!("Starting DB instance {}", instance.id);
    pair.instances.start_and_wait(&instance.id).await?;

    info!("Restarting DB instance {}", instance.id);
    pair.instances
        .restart_and_wait(&instance.id, ShutdownMode::Fast)
        .await?;

    info!("Deleting DB instance {}", instance.id);
    pair.instances
        .delete_and_wait(&[instance.id.clone()])
        .await?;
    info!("DB instance {} is gone", instance.id);
    Ok(())
}
