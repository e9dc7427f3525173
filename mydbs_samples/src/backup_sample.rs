//! Take a full backup of a fresh DB instance, then delete both. The
//! instance is deleted first; its backup outlives it and is deleted
//! last.

use ::mydbs_common::{
    config::Config,
    error::Result,
    resource::{BackupType, CreateBackupRequest},
    tracing::info,
};
use ::mydbs_manager::shutdown::ManagerPair;

use crate::setup;

pub async fn run(pair: &ManagerPair, config: &Config) -> Result<()> {
    let request = setup::create_instance_request(
        config,
        setup::unique_display_name("mydbs-sample-backup-instance"),
    );
    info!("Creating DB instance '{}'", request.display_name);
    let instance = pair.instances.create_and_wait(&request).await?;

    let backup_request = CreateBackupRequest {
        display_name: setup::unique_display_name("mydbs-sample-backup"),
        description: Some("Full backup created by the mydbs samples".to_owned()),
        backup_type: BackupType::Full,
        retention_in_days: 1,
        db_instance_id: instance.id.clone(),
    };
    info!(
        "Creating full backup '{}' of DB instance {}",
        backup_request.display_name, instance.id
    );
    let backup = pair.backups.create_and_wait(&backup_request).await?;
    info!("Backup {} is Active", backup.id);

    info!("Deleting DB instance {}", instance.id);
    pair.instances
        .delete_and_wait(&[instance.id.clone()])
        .await?;

    info!("Deleting backup {}", backup.id);
    pair.backups.delete_and_wait(&[backup.id.clone()]).await?;
    Ok(())
}
