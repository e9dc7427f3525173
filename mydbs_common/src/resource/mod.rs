//! Data model of the remotely managed resources.
//!
//! The lifecycle of a resource is progressed only by the control
//! plane; this crate merely observes it through re-fetches.

use ::std::{borrow::Cow, collections::BTreeMap, fmt};

mod backup;
mod db_instance;
mod resource_id;

pub use backup::{Backup, BackupState, BackupType, CreateBackupRequest};
pub use db_instance::{
    CreateDbInstanceRequest, DbInstance, InstanceState, RestartDbInstanceRequest, ShutdownMode,
    StopDbInstanceRequest,
};
pub use resource_id::ResourceId;

pub type MysqlVersion = String;
pub type FreeformTags = BTreeMap<Cow<'static, str>, Cow<'static, str>>;

/// Capability set of a per-kind lifecycle state enum: comparable for
/// equality and classifiable as faulty.
pub trait LifecycleState: Clone + PartialEq + fmt::Debug + Send + Sync {
    /// Terminal failure states; reaching one aborts any wait immediately.
    fn is_faulty(&self) -> bool;
}

/// Accessors every remotely managed resource exposes to the poller.
pub trait ManagedResource: Send + Sync {
    type State: LifecycleState;

    fn id(&self) -> &ResourceId;
    /// Human label, for diagnostics only.
    fn display_name(&self) -> &str;
    fn state(&self) -> &Self::State;
    /// Resource family tag, e.g. `"DbInstance"`.
    fn kind(&self) -> &'static str;
}
