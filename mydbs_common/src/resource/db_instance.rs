use ::serde::{Deserialize, Serialize};
use ::time::OffsetDateTime;

use super::{FreeformTags, LifecycleState, ManagedResource, MysqlVersion, ResourceId};

/// States of a managed DB instance, as declared by the control plane.
///
/// `Creating -> Active` on creation, `Active <-> Inactive` via
/// stop/start, `Updating` while a control-plane operation (including a
/// backup) is in flight, `Deleting -> Deleted` on deletion. `Failed`
/// is terminal.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceState {
    Creating,
    Active,
    Updating,
    Inactive,
    Deleting,
    Deleted,
    Failed,
}

impl LifecycleState for InstanceState {
    fn is_faulty(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// A managed DB instance as returned by the control plane.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DbInstance {
    pub id: ResourceId,
    pub display_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub compartment_id: String,
    pub lifecycle_state: InstanceState,
    #[serde(default)]
    pub mysql_version: MysqlVersion,
    #[serde(default)]
    pub shape_name: Option<String>,
    #[serde(default)]
    pub subnet_id: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub time_created: Option<OffsetDateTime>,
}

impl DbInstance {
    /// Placeholder for an instance the control plane no longer knows.
    /// A 404 on refresh means its deletion has completed.
    pub fn deleted(id: ResourceId) -> Self {
        Self {
            id,
            display_name: String::new(),
            description: None,
            compartment_id: String::new(),
            lifecycle_state: InstanceState::Deleted,
            mysql_version: MysqlVersion::new(),
            shape_name: None,
            subnet_id: None,
            time_created: None,
        }
    }
}

impl ManagedResource for DbInstance {
    type State = InstanceState;

    fn id(&self) -> &ResourceId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn state(&self) -> &InstanceState {
        &self.lifecycle_state
    }

    fn kind(&self) -> &'static str {
        "DbInstance"
    }
}

/// InnoDB shutdown mode used by stop and restart.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShutdownMode {
    Immediate,
    Fast,
    Slow,
}

/// Request body to create a DB instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CreateDbInstanceRequest {
    pub display_name: String,
    pub description: Option<String>,
    pub compartment_id: String,
    pub subnet_id: String,
    pub shape_name: String,
    pub mysql_version: MysqlVersion,
    pub admin_username: String,
    pub admin_password: String,
    pub data_storage_size_in_gbs: u32,
    pub port: u16,
    #[serde(default)]
    pub freeform_tags: Option<FreeformTags>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StopDbInstanceRequest {
    pub shutdown_type: ShutdownMode,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RestartDbInstanceRequest {
    pub shutdown_type: ShutdownMode,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::serde_json::json;

    #[test]
    fn instance_state_wire_form_is_screaming_snake_case() -> anyhow::Result<()> {
        assert_eq!(serde_json::to_value(InstanceState::Active)?, json!("ACTIVE"));
        let state: InstanceState = serde_json::from_value(json!("DELETING"))?;
        assert_eq!(state, InstanceState::Deleting);
        Ok(())
    }

    #[test]
    fn only_failed_is_faulty() {
        assert!(InstanceState::Failed.is_faulty());
        assert!(!InstanceState::Creating.is_faulty());
        assert!(!InstanceState::Deleted.is_faulty());
    }

    #[test]
    fn deleted_placeholder_reports_deleted_state() -> anyhow::Result<()> {
        let instance = DbInstance::deleted("abc".try_into()?);
        assert_eq!(instance.lifecycle_state, InstanceState::Deleted);
        assert_eq!(instance.id().as_str(), "abc");
        Ok(())
    }
}
