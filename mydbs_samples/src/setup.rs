//! Shared fixtures for the sample scenarios.

use ::std::{
    borrow::Cow,
    time::{SystemTime, UNIX_EPOCH},
};

use ::mydbs_common::{
    config::Config,
    resource::{CreateDbInstanceRequest, FreeformTags},
};

pub const ADMIN_USERNAME: &str = "SampleAdmin";
/// Hardcoded for the sample only. Real applications must source the
/// admin password from a secret store.
pub const ADMIN_PASSWORD: &str = "SampleAdmin#1";
pub const DATA_STORAGE_SIZE_GB: u32 = 50;

/// Display names carry a timestamp so reruns don't collide.
pub fn unique_display_name(prefix: &str) -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default();
    format!("{}-{}", prefix, timestamp)
}

pub fn create_instance_request(config: &Config, display_name: String) -> CreateDbInstanceRequest {
    CreateDbInstanceRequest {
        display_name,
        description: Some("Created by the mydbs samples".to_owned()),
        compartment_id: config.compartment_id.clone(),
        subnet_id: config.instance.subnet_id.clone(),
        shape_name: config.instance.shape.clone(),
        mysql_version: config.instance.mysql_version.clone(),
        admin_username: ADMIN_USERNAME.to_owned(),
        admin_password: ADMIN_PASSWORD.to_owned(),
        data_storage_size_in_gbs: DATA_STORAGE_SIZE_GB,
        port: config.instance.port,
        freeform_tags: Some(FreeformTags::from([(
            Cow::Borrowed("created-by"),
            Cow::Borrowed("mydbs-samples"),
        )])),
    }
}
