//! Generic lifecycle-convergence poller.
//!
//! A wait call repeatedly re-fetches the declared state of a set of
//! resources until all of them reach the target state, any of them
//! reaches a faulty state, or the deadline elapses. The poller only
//! observes transitions; mutations go through the managers.

use ::std::time::Duration;

use ::mydbs_common::{
    config::PollConfig,
    error::{MydbsError, Result},
    resource::{LifecycleState, ManagedResource, ResourceId},
    tokio::time::{sleep, Instant},
    tracing::{info, warn},
};

/// Poll interval and transient-error budget for one wait call.
#[derive(Debug, Clone)]
pub struct WaitSettings {
    pub interval: Duration,
    /// Consecutive transient fetch errors tolerated before the wait is
    /// abandoned.
    pub transient_error_budget: u32,
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            transient_error_budget: 5,
        }
    }
}

impl From<&PollConfig> for WaitSettings {
    fn from(config: &PollConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.interval_secs),
            transient_error_budget: config.transient_error_budget,
        }
    }
}

/// Fetch-by-id capability the poller needs from a resource kind.
#[allow(async_fn_in_trait)]
pub trait ResourceFetcher {
    type Resource: ManagedResource;

    /// Fetch the current declared state of one resource.
    async fn fetch(&self, id: &ResourceId) -> Result<Self::Resource>;
}

/// Wait until every resource in `resource_ids` reaches `target`.
///
/// Duplicate IDs are collapsed; an empty set succeeds after one pass.
/// Fails fast with [`MydbsError::FaultyStateError`] as soon as any
/// resource enters a faulty state, and with
/// [`MydbsError::TimeoutError`] (listing the still-pending IDs) once
/// the deadline elapses or the transient-error budget is exhausted.
pub async fn wait_for_lifecycle<F>(
    fetcher: &F,
    resource_ids: &[ResourceId],
    target: <F::Resource as ManagedResource>::State,
    timeout: Duration,
    settings: &WaitSettings,
) -> Result<()>
where
    F: ResourceFetcher,
{
    if timeout.is_zero() {
        return Err(MydbsError::IllegalArgument(
            "wait timeout must be strictly positive".to_owned(),
        ));
    }

    let ids = dedup(resource_ids);
    let start = Instant::now();
    let deadline = start + timeout;
    let mut consecutive_errors: u32 = 0;
    // One snapshot per iteration, reused for the faulty check, the
    // convergence check and the failure message. `None` until the
    // first refresh succeeds.
    let mut snapshot: Option<Vec<F::Resource>> = None;

    loop {
        match refresh(fetcher, &ids).await {
            Ok(resources) => {
                consecutive_errors = 0;
                snapshot = Some(resources);
            }
            Err(e) => {
                consecutive_errors += 1;
                warn!(
                    "{} - transient error {}/{}",
                    e, consecutive_errors, settings.transient_error_budget
                );
            }
        }

        let resources = snapshot.as_deref().unwrap_or_default();

        let faulty: Vec<&F::Resource> = resources
            .iter()
            .filter(|resource| resource.state().is_faulty())
            .collect();
        if !faulty.is_empty() {
            return Err(MydbsError::FaultyStateError {
                states: faulty
                    .iter()
                    .map(|resource| format!("{:?}", resource.state()))
                    .collect(),
                target: format!("{:?}", target),
                ids: faulty.iter().map(|resource| resource.id().clone()).collect(),
            });
        }

        let pending = pending_ids(&snapshot, &ids, &target);
        if pending.is_empty() {
            return Ok(());
        }

        if Instant::now() >= deadline
            || consecutive_errors >= settings.transient_error_budget
        {
            return Err(MydbsError::TimeoutError {
                target: format!("{:?}", target),
                pending,
            });
        }

        info!(
            "Waiting to become [{:?}] ... elapsed {}s (timeout: {}s)\n{}",
            target,
            start.elapsed().as_secs(),
            timeout.as_secs(),
            render(resources)
        );
        sleep(settings.interval).await;
    }
}

async fn refresh<F>(fetcher: &F, ids: &[ResourceId]) -> Result<Vec<F::Resource>>
where
    F: ResourceFetcher,
{
    let mut resources = Vec::with_capacity(ids.len());
    for id in ids {
        resources.push(fetcher.fetch(id).await?);
    }
    Ok(resources)
}

/// IDs not yet observed in the target state. Before the first
/// successful refresh every ID counts as pending.
fn pending_ids<R>(
    snapshot: &Option<Vec<R>>,
    ids: &[ResourceId],
    target: &R::State,
) -> Vec<ResourceId>
where
    R: ManagedResource,
{
    match snapshot {
        None => ids.to_vec(),
        Some(resources) => resources
            .iter()
            .filter(|resource| resource.state() != target)
            .map(|resource| resource.id().clone())
            .collect(),
    }
}

fn dedup(ids: &[ResourceId]) -> Vec<ResourceId> {
    let mut unique: Vec<ResourceId> = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(id) {
            unique.push(id.clone());
        }
    }
    unique
}

fn render<R: ManagedResource>(resources: &[R]) -> String {
    resources
        .iter()
        .map(|resource| {
            format!(
                "| {} [{:?}]: {} - '{}'\n",
                resource.kind(),
                resource.state(),
                resource.id(),
                resource.display_name()
            )
        })
        .collect()
}
