//! Shutdown-time reconciliation.
//!
//! A sample run registers its manager pair here; when the workflow
//! fails or the process is interrupted, [`run_cleanup`] deletes
//! whatever the managers still track. Backups can refuse deletion
//! while their DB instance exists, so backup deletion is retried and
//! each failed attempt re-issues the instance deletes.

use ::std::{future::Future, mem, sync::Arc, sync::Mutex, time::Duration};

use ::mydbs_common::{
    config::CleanupConfig,
    error::{MydbsError, Result},
    resource::{Backup, BackupState, InstanceState, ResourceId},
    tokio::{self, time::sleep, time::Instant},
    tracing::{info, warn},
};

use crate::{backup::BackupManager, db_instance::DbInstanceManager};

/// The managers of one sample run, cleaned up together.
#[derive(Clone)]
pub struct ManagerPair {
    pub instances: Arc<DbInstanceManager>,
    pub backups: Arc<BackupManager>,
}

/// Retry tuning for the backup-deletion loop.
#[derive(Debug, Clone)]
pub struct CleanupSettings {
    pub max_attempts: u32,
    pub retry_interval: Duration,
}

impl Default for CleanupSettings {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            retry_interval: Duration::from_secs(10),
        }
    }
}

impl From<&CleanupConfig> for CleanupSettings {
    fn from(config: &CleanupConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            retry_interval: Duration::from_secs(config.retry_interval_secs),
        }
    }
}

/// Manager pairs awaiting cleanup. Draining is destructive, so one
/// cleanup run never repeats another's work.
#[derive(Default)]
pub struct ShutdownRegistry {
    pairs: Mutex<Vec<ManagerPair>>,
}

static GLOBAL: ShutdownRegistry = ShutdownRegistry::new();

impl ShutdownRegistry {
    pub const fn new() -> Self {
        Self {
            pairs: Mutex::new(Vec::new()),
        }
    }

    /// The process-wide registry.
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    pub fn register(&self, pair: ManagerPair) {
        self.lock_pairs().push(pair);
    }

    fn drain(&self) -> Vec<ManagerPair> {
        mem::take(&mut *self.lock_pairs())
    }

    fn lock_pairs(&self) -> std::sync::MutexGuard<'_, Vec<ManagerPair>> {
        self.pairs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Run `workflow`, cleaning up the registered managers if it fails or
/// the process receives Ctrl-C. A workflow that finishes cleanly has
/// already deleted its own resources, so no cleanup runs.
pub async fn run_with_cleanup<F>(
    registry: &ShutdownRegistry,
    settings: &CleanupSettings,
    workflow: F,
) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    tokio::select! {
        result = workflow => match result {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("Workflow failed ({}), cleaning up left-over resources", e);
                run_cleanup(registry, settings).await;
                Err(e)
            }
        },
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, cleaning up left-over resources");
            run_cleanup(registry, settings).await;
            Err(MydbsError::Interrupted)
        }
    }
}

/// Delete everything still tracked by the registered manager pairs.
/// Each pair is cleaned up on its own task; failures are logged, never
/// returned.
pub async fn run_cleanup(registry: &ShutdownRegistry, settings: &CleanupSettings) {
    let pairs = registry.drain();
    if pairs.is_empty() {
        return;
    }
    let handles: Vec<_> = pairs
        .into_iter()
        .map(|pair| {
            let settings = settings.clone();
            tokio::spawn(async move { clean_up_pair(pair, settings).await })
        })
        .collect();
    for handle in handles {
        if let Err(e) = handle.await {
            warn!("Cleanup task panicked: {}", e);
        }
    }
}

async fn clean_up_pair(pair: ManagerPair, settings: CleanupSettings) {
    clean_up_instances(&pair, &settings).await;
    clean_up_backups(&pair, &settings).await;
}

async fn clean_up_instances(pair: &ManagerPair, settings: &CleanupSettings) {
    wait_for_updating_instances(pair, settings).await;
    let remaining = instances_not_deleted(&pair.instances).await;
    if remaining.is_empty() {
        return;
    }
    info!("Cleaning up DbInstance(s): {}", join_ids(&remaining));
    delete_instances(&pair.instances, &remaining).await;
}

/// An instance with an attached backup rejects deletion while it is
/// still `Updating` from that backup. Wait it out, bounded by the
/// instance manager's updating timeout.
async fn wait_for_updating_instances(pair: &ManagerPair, settings: &CleanupSettings) {
    let backups = match pair.backups.get_all().await {
        Ok(backups) => backups,
        Err(e) => {
            warn!("Can't inspect tracked backups before cleanup: {}", e);
            return;
        }
    };
    let with_backups = instance_ids_of(&backups);
    let deadline = Instant::now() + pair.instances.updating_timeout();
    for id in &with_backups {
        loop {
            match pair.instances.lifecycle_state(id).await {
                Ok(InstanceState::Updating) => {}
                Ok(_) => break,
                Err(e) => {
                    warn!("Can't check state of DbInstance {}: {}", id, e);
                    break;
                }
            }
            if Instant::now() >= deadline {
                warn!("DbInstance {} still Updating, deleting it anyway", id);
                break;
            }
            info!("DbInstance {} is Updating, waiting before cleanup", id);
            sleep(settings.retry_interval).await;
        }
    }
}

async fn clean_up_backups(pair: &ManagerPair, settings: &CleanupSettings) {
    for attempt in 1..=settings.max_attempts {
        let remaining = backups_not_deleted(&pair.backups).await;
        if remaining.is_empty() {
            return;
        }
        info!("Cleaning up Backup(s): {}", join_ids(&remaining));
        let mut failed = false;
        for id in &remaining {
            if let Err(e) = pair.backups.delete(id).await {
                warn!(
                    "Attempt [{}/{}]: can't delete Backup {}: {}",
                    attempt, settings.max_attempts, id, e
                );
                failed = true;
            }
        }
        if !failed {
            return;
        }
        // Backups usually refuse deletion because their instance still
        // exists; nudge the instance deletes again before retrying.
        let instances = instances_not_deleted(&pair.instances).await;
        delete_instances(&pair.instances, &instances).await;
        sleep(settings.retry_interval).await;
    }
    warn!(
        "Gave up deleting Backup(s) {} after {} attempts",
        join_ids(&pair.backups.tracked_ids()),
        settings.max_attempts
    );
}

async fn delete_instances(instances: &DbInstanceManager, ids: &[ResourceId]) {
    for id in ids {
        if let Err(e) = instances.delete(id).await {
            warn!("Can't delete DbInstance {}: {}", id, e);
        }
    }
}

/// Tracked instances whose deletion has not started yet. Falls back to
/// every tracked ID when the control plane can't be reached.
async fn instances_not_deleted(instances: &DbInstanceManager) -> Vec<ResourceId> {
    match instances.get_all().await {
        Ok(all) => all
            .iter()
            .filter(|instance| {
                !matches!(
                    instance.lifecycle_state,
                    InstanceState::Deleted | InstanceState::Deleting
                )
            })
            .map(|instance| instance.id.clone())
            .collect(),
        Err(e) => {
            warn!("Can't inspect tracked DB instances: {}", e);
            instances.tracked_ids()
        }
    }
}

async fn backups_not_deleted(backups: &BackupManager) -> Vec<ResourceId> {
    match backups.get_all().await {
        Ok(all) => all
            .iter()
            .filter(|backup| {
                !matches!(
                    backup.lifecycle_state,
                    BackupState::Deleted | BackupState::Deleting
                )
            })
            .map(|backup| backup.id.clone())
            .collect(),
        Err(e) => {
            warn!("Can't inspect tracked backups: {}", e);
            backups.tracked_ids()
        }
    }
}

fn instance_ids_of(backups: &[Backup]) -> Vec<ResourceId> {
    let mut ids: Vec<ResourceId> = Vec::new();
    for backup in backups {
        if let Some(id) = &backup.db_instance_id {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
    }
    ids
}

fn join_ids(ids: &[ResourceId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
