//! Tracking manager for DB instances.
//!
//! Every instance created through this manager is remembered for the
//! rest of the session so that bulk deletion and shutdown cleanup can
//! operate without asking the control plane for an inventory.

use ::std::{
    sync::Mutex,
    time::Duration,
};

use ::mydbs_client::{is_not_found, ResourceClient};
use ::mydbs_common::{
    config::Config,
    error::{MydbsError, Result},
    resource::{
        CreateDbInstanceRequest, DbInstance, InstanceState, ResourceId, RestartDbInstanceRequest,
        ShutdownMode, StopDbInstanceRequest,
    },
    tracing::error,
};

use crate::lifecycle::{wait_for_lifecycle, ResourceFetcher, WaitSettings};

pub struct DbInstanceManager {
    client: ResourceClient,
    /// IDs created by this manager, in creation order.
    tracked: Mutex<Vec<ResourceId>>,
    create_timeout: Duration,
    delete_timeout: Duration,
    updating_timeout: Duration,
    wait_settings: WaitSettings,
}

fn transient(error: reqwest::Error) -> MydbsError {
    MydbsError::TransientError(error.to_string())
}

impl DbInstanceManager {
    pub fn new(client: ResourceClient, config: &Config) -> Self {
        Self {
            client,
            tracked: Mutex::new(Vec::new()),
            create_timeout: Duration::from_secs(config.timeouts.create_instance_secs),
            delete_timeout: Duration::from_secs(config.timeouts.delete_instance_secs),
            updating_timeout: Duration::from_secs(config.timeouts.updating_instance_secs),
            wait_settings: WaitSettings::from(&config.poll),
        }
    }

    /* CREATE */

    pub async fn create(&self, request: &CreateDbInstanceRequest) -> Result<DbInstance> {
        let instance = self
            .client
            .create_db_instance(request)
            .await
            .map_err(transient)?;
        self.track(instance.id.clone());
        Ok(instance)
    }

    /// Create several instances sequentially. If any single create
    /// fails, the instances created so far are deleted again and the
    /// whole batch is reported as failed.
    pub async fn create_many(
        &self,
        requests: &[CreateDbInstanceRequest],
    ) -> Result<Vec<DbInstance>> {
        let mut created = Vec::with_capacity(requests.len());
        for request in requests {
            match self.client.create_db_instance(request).await {
                Ok(instance) => {
                    self.track(instance.id.clone());
                    created.push(instance);
                }
                Err(e) => {
                    error!(
                        "Can't create DbInstance '{}': {}",
                        request.display_name, e
                    );
                    self.roll_back(&created).await;
                    return Err(MydbsError::CreationError(e.to_string()));
                }
            }
        }
        Ok(created)
    }

    pub async fn create_and_wait(&self, request: &CreateDbInstanceRequest) -> Result<DbInstance> {
        let instance = self.create(request).await?;
        self.wait_for(
            &[instance.id.clone()],
            InstanceState::Active,
            self.create_timeout,
        )
        .await?;
        Ok(instance)
    }

    pub async fn create_many_and_wait(
        &self,
        requests: &[CreateDbInstanceRequest],
    ) -> Result<Vec<DbInstance>> {
        let created = self.create_many(requests).await?;
        let ids: Vec<ResourceId> = created.iter().map(|instance| instance.id.clone()).collect();
        self.wait_for(&ids, InstanceState::Active, self.create_timeout)
            .await?;
        Ok(created)
    }

    async fn roll_back(&self, created: &[DbInstance]) {
        for instance in created {
            if let Err(e) = self.client.delete_db_instance(&instance.id).await {
                error!("Failed to roll back DbInstance {}: {}", instance.id, e);
            }
            self.untrack(&instance.id);
        }
    }

    /* STOP / START / RESTART */

    pub async fn stop(&self, id: &ResourceId, mode: ShutdownMode) -> Result<()> {
        let request = StopDbInstanceRequest {
            shutdown_type: mode,
        };
        self.client
            .stop_db_instance(id, &request)
            .await
            .map_err(transient)
    }

    pub async fn stop_and_wait(&self, id: &ResourceId, mode: ShutdownMode) -> Result<()> {
        self.stop(id, mode).await?;
        self.wait_for(
            &[id.clone()],
            InstanceState::Inactive,
            self.updating_timeout,
        )
        .await
    }

    pub async fn start(&self, id: &ResourceId) -> Result<()> {
        self.client.start_db_instance(id).await.map_err(transient)
    }

    pub async fn start_and_wait(&self, id: &ResourceId) -> Result<()> {
        self.start(id).await?;
        self.wait_for(&[id.clone()], InstanceState::Active, self.updating_timeout)
            .await
    }

    pub async fn restart(&self, id: &ResourceId, mode: ShutdownMode) -> Result<()> {
        let request = RestartDbInstanceRequest {
            shutdown_type: mode,
        };
        self.client
            .restart_db_instance(id, &request)
            .await
            .map_err(transient)
    }

    pub async fn restart_and_wait(&self, id: &ResourceId, mode: ShutdownMode) -> Result<()> {
        self.restart(id, mode).await?;
        self.wait_for(&[id.clone()], InstanceState::Active, self.updating_timeout)
            .await
    }

    /* DELETE */

    pub async fn delete(&self, id: &ResourceId) -> Result<()> {
        self.client.delete_db_instance(id).await.map_err(transient)
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
        self.wait_for(ids, InstanceState::Deleted, self.delete_timeout)
            .await
    }

    pub async fn delete_all_and_wait(&self) -> Result<()> {
        let ids = self.tracked_ids();
        self.delete_and_wait(&ids).await
    }

    /* GET */

    pub async fn get(&self, id: &ResourceId) -> Result<DbInstance> {
        match self.client.get_db_instance(id).await {
            Ok(instance) => Ok(instance),
            Err(e) if is_not_found(&e) => Err(MydbsError::NotFoundError(id.clone())),
            Err(e) => Err(transient(e)),
        }
    }

    /// Current declared state; a forgotten instance counts as deleted.
    pub async fn lifecycle_state(&self, id: &ResourceId) -> Result<InstanceState> {
        Ok(self.fetch(id).await?.lifecycle_state)
    }

    /// Re-fetch every tracked instance live; nothing is cached.
    pub async fn get_all(&self) -> Result<Vec<DbInstance>> {
        let ids = self.tracked_ids();
        let mut instances = Vec::with_capacity(ids.len());
        for id in &ids {
            instances.push(self.fetch(id).await?);
        }
        Ok(instances)
    }

    pub fn tracked_ids(&self) -> Vec<ResourceId> {
        self.lock_tracked().clone()
    }

    pub fn updating_timeout(&self) -> Duration {
        self.updating_timeout
    }

    pub fn wait_settings(&self) -> &WaitSettings {
        &self.wait_settings
    }

    async fn wait_for(
        &self,
        ids: &[ResourceId],
        target: InstanceState,
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

impl ResourceFetcher for DbInstanceManager {
    type Resource = DbInstance;

    async fn fetch(&self, id: &ResourceId) -> Result<DbInstance> {
        match self.client.get_db_instance(id).await {
            Ok(instance) => Ok(instance),
            // The control plane forgets an instance once its deletion
            // completes; for polling purposes that is the Deleted state.
            Err(e) if is_not_found(&e) => Ok(DbInstance::deleted(id.clone())),
            Err(e) => Err(transient(e)),
        }
    }
}
