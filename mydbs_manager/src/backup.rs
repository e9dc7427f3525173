//! Tracking manager for backups. Mirrors the DB instance manager with
//! backup timeouts and states.

use ::std::{sync::Mutex, time::Duration};

use ::mydbs_client::{is_not_found, ResourceClient};
use ::mydbs_common::{
    config::Config,
    error::{MydbsError, Result},
    resource::{Backup, BackupState, CreateBackupRequest, ResourceId},
    tracing::error,
};

use crate::lifecycle::{wait_for_lifecycle, ResourceFetcher, WaitSettings};

pub struct BackupManager {
    client: ResourceClient,
    /// IDs created by this manager, in creation order.
    tracked: Mutex<Vec<ResourceId>>,
    create_timeout: Duration,
    delete_timeout: Duration,
    wait_settings: WaitSettings,
}

fn transient(error: reqwest::Error) -> MydbsError {
    MydbsError::TransientError(error.to_string())
}

impl BackupManager {
    pub fn new(client: ResourceClient, config: &Config) -> Self {
        Self {
            client,
            tracked: Mutex::new(Vec::new()),
            create_timeout: Duration::from_secs(config.timeouts.create_backup_secs),
            delete_timeout: Duration::from_secs(config.timeouts.delete_backup_secs),
            wait_settings: WaitSettings::from(&config.poll),
        }
    }

    /* CREATE */

    pub async fn create(&self, request: &CreateBackupRequest) -> Result<Backup> {
        let backup = self.client.create_backup(request).await.map_err(transient)?;
        self.track(backup.id.clone());
        Ok(backup)
    }

    /// Create several backups sequentially, deleting the partial batch
    /// again when any single create fails.
    pub async fn create_many(&self, requests: &[CreateBackupRequest]) -> Result<Vec<Backup>> {
        let mut created = Vec::with_capacity(requests.len());
        for request in requests {
            match self.client.create_backup(request).await {
                Ok(backup) => {
                    self.track(backup.id.clone());
                    created.push(backup);
                }
                Err(e) => {
                    error!("Can't create Backup '{}': {}", request.display_name, e);
                    self.roll_back(&created).await;
                    return Err(MydbsError::CreationError(e.to_string()));
                }
            }
        }
        Ok(created)
    }

    pub async fn create_and_wait(&self, request: &CreateBackupRequest) -> Result<Backup> {
        let backup = self.create(request).await?;
        self.wait_for(&[backup.id.clone()], BackupState::Active, self.create_timeout)
            .await?;
        Ok(backup)
    }

    pub async fn create_many_and_wait(
        &self,
        requests: &[CreateBackupRequest],
    ) -> Result<Vec<Backup>> {
        let created = self.create_many(requests).await?;
        let ids: Vec<ResourceId> = created.iter().map(|backup| backup.id.clone()).collect();
        self.wait_for(&ids, BackupState::Active, self.create_timeout)
            .await?;
        Ok(created)
    }

    async fn roll_back(&self, created: &[Backup]) {
        for backup in created {
            if let Err(e) = self.client.delete_backup(&backup.id).await {
                error!("Failed to roll back Backup {}: {}", backup.id, e);
            }
            self.untrack(&backup.id);
        }
    }

    /* DELETE */

    pub async fn delete(&self, id: &ResourceId) -> Result<()> {
        self.client.delete_backup(id).await.map_err(transient)
    }

    pub async fn delete_many(&self, ids: &[ResourceId]) -> Result<()> {
        for id in ids {
            self.delete(id).await?;
        }
        Ok(())
    }

    pub async fn delete_all(&self) -> Result<()> {
        let ids = self.tracked_ids();
        self.delete_many(&ids).await
    }

    pub async fn delete_and_wait(&self, ids: &[ResourceId]) -> Result<()> {
        self.delete_many(ids).await?;
        self.wait_for(ids, BackupState::Deleted, self.delete_timeout)
            .await
    }

    pub async fn delete_all_and_wait(&self) -> Result<()> {
        let ids = self.tracked_ids();
        self.delete_and_wait(&ids).await
    }

    /* GET */

    pub async fn get(&self, id: &ResourceId) -> Result<Backup> {
        match self.client.get_backup(id).await {
            Ok(backup) => Ok(backup),
            Err(e) if is_not_found(&e) => Err(MydbsError::NotFoundError(id.clone())),
            Err(e) => Err(transient(e)),
        }
    }

    /// Re-fetch every tracked backup live; nothing is cached.
    pub async fn get_all(&self) -> Result<Vec<Backup>> {
        let ids = self.tracked_ids();
        let mut backups = Vec::with_capacity(ids.len());
        for id in &ids {
            backups.push(self.fetch(id).await?);
        }
        Ok(backups)
    }

    pub fn tracked_ids(&self) -> Vec<ResourceId> {
        self.lock_tracked().clone()
    }

    async fn wait_for(
        &self,
        ids: &[ResourceId],
        target: BackupState,
        timeout: Duration,
    ) -> Result<()> {
        wait_for_lifecycle(self, ids, target, timeout, &self.wait_settings).await
    }

    fn track(&self, id: ResourceId) {
        self.lock_tracked().push(id);
    }

    fn untrack(&self, id: &ResourceId) {
        self.lock_tracked().retain(|tracked| tracked != id);
    }

    fn lock_tracked(&self) -> std::sync::MutexGuard<'_, Vec<ResourceId>> {
        self.tracked
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ResourceFetcher for BackupManager {
    type Resource = Backup;

    async fn fetch(&self, id: &ResourceId) -> Result<Backup> {
        match self.client.get_backup(id).await {
            Ok(backup) => Ok(backup),
            Err(e) if is_not_found(&e) => Ok(Backup::deleted(id.clone())),
            Err(e) => Err(transient(e)),
        }
    }
}
