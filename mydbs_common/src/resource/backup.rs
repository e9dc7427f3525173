use ::serde::{Deserialize, Serialize};
use ::time::OffsetDateTime;

use super::{LifecycleState, ManagedResource, ResourceId};

/// States of a DB instance backup.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BackupState {
    Creating,
    Active,
    Deleting,
    Deleted,
    Failed,
}

impl LifecycleState for BackupState {
    fn is_faulty(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BackupType {
    Full,
    Incremental,
}

/// A backup as returned by the control plane. `db_instance_id` points
/// at the instance the backup was taken from; the shutdown reconciler
/// uses it to avoid deleting an instance mid-backup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Backup {
    pub id: ResourceId,
    pub display_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub lifecycle_state: BackupState,
    pub backup_type: BackupType,
    #[serde(default)]
    pub retention_in_days: Option<u32>,
    #[serde(default)]
    pub db_instance_id: Option<ResourceId>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub time_created: Option<OffsetDateTime>,
}

impl Backup {
    /// Placeholder for a backup the control plane no longer knows.
    pub fn deleted(id: ResourceId) -> Self {
        Self {
            id,
            display_name: String::new(),
            description: None,
            lifecycle_state: BackupState::Deleted,
            backup_type: BackupType::Full,
            retention_in_days: None,
            db_instance_id: None,
            time_created: None,
        }
    }
}

impl ManagedResource for Backup {
    type State = BackupState;

    fn id(&self) -> &ResourceId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn state(&self) -> &BackupState {
        &self.lifecycle_state
    }

    fn kind(&self) -> &'static str {
        "Backup"
    }
}

/// Request body to create a backup of a DB instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CreateBackupRequest {
    pub display_name: String,
    pub description: Option<String>,
    pub backup_type: BackupType,
    pub retention_in_days: u32,
    pub db_instance_id: ResourceId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::serde_json::json;

    #[test]
    fn deserialize_backup() -> anyhow::Result<()> {
        let backup: Backup = serde_json::from_value(json!({
            "id": "bkp-1",
            "display_name": "nightly",
            "lifecycle_state": "ACTIVE",
            "backup_type": "FULL",
            "retention_in_days": 1,
            "db_instance_id": "inst-1"
        }))?;
        assert_eq!(backup.lifecycle_state, BackupState::Active);
        assert_eq!(
            backup.db_instance_id,
            Some(ResourceId::try_from("inst-1")?)
        );
        Ok(())
    }

    #[test]
    fn deleted_placeholder_has_no_instance_reference() -> anyhow::Result<()> {
        let backup = Backup::deleted("bkp-1".try_into()?);
        assert_eq!(backup.lifecycle_state, BackupState::Deleted);
        assert_eq!(backup.db_instance_id, None);
        Ok(())
    }
}
