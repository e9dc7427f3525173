use ::mydbs_common::resource::{
    Backup, CreateBackupRequest, CreateDbInstanceRequest, DbInstance, ResourceId,
    RestartDbInstanceRequest, StopDbInstanceRequest,
};

use crate::Credentials;

type Result<T> = std::result::Result<T, reqwest::Error>;

/// `true` when the control plane answered that it no longer knows the
/// resource. Callers waiting for a delete treat this as converged.
pub fn is_not_found(error: &reqwest::Error) -> bool {
    error.status() == Some(reqwest::StatusCode::NOT_FOUND)
}

/// Client for the managed MySQL control plane.
#[derive(Clone)]
pub struct ResourceClient {
    /// Base URL of the control plane.
    base_url: String,
    /// Credentials for authenticating requests.
    credentials: Option<Credentials>,
    /// HTTP client for making requests to the control plane.
    client: reqwest::Client,
}

impl ResourceClient {
    /// Create a new `ResourceClient`.
    pub fn new(base_url: impl Into<String>, credentials: Option<Credentials>) -> Self {
        Self {
            base_url: base_url.into(),
            credentials,
            client: reqwest::Client::new(),
        }
    }

    /* DB instances */

    pub async fn create_db_instance(
        &self,
        request: &CreateDbInstanceRequest,
    ) -> Result<DbInstance> {
        let url = self.build_url("/dbInstances");
        let builder = self.client.post(url).json(request);
        let builder = self.enable_auth_for_request(builder);
        builder.send().await?.error_for_status()?.json().await
    }

    pub async fn get_db_instance(&self, id: &ResourceId) -> Result<DbInstance> {
        let url = self.build_url(&format!("/dbInstances/{}", id));
        let builder = self.client.get(url);
        let builder = self.enable_auth_for_request(builder);
        builder.send().await?.error_for_status()?.json().await
    }

    pub async fn list_db_instances(&self, compartment_id: &str) -> Result<Vec<DbInstance>> {
        let url = self.build_url("/dbInstances");
        let builder = self
            .client
            .get(url)
            .query(&[("compartmentId", compartment_id)]);
        let builder = self.enable_auth_for_request(builder);
        builder.send().await?.error_for_status()?.json().await
    }

    pub async fn delete_db_instance(&self, id: &ResourceId) -> Result<()> {
        let url = self.build_url(&format!("/dbInstances/{}", id));
        let builder = self.client.delete(url);
        let builder = self.enable_auth_for_request(builder);
        builder.send().await?.error_for_status()?;
        Ok(())
    }

    pub async fn stop_db_instance(
        &self,
        id: &ResourceId,
        request: &StopDbInstanceRequest,
    ) -> Result<()> {
        let url = self.build_url(&format!("/dbInstances/{}/actions/stop", id));
        let builder = self.client.post(url).json(request);
        let builder = self.enable_auth_for_request(builder);
        builder.send().await?.error_for_status()?;
        Ok(())
    }

    pub async fn start_db_instance(&self, id: &ResourceId) -> Result<()> {
        let url = self.build_url(&format!("/dbInstances/{}/actions/start", id));
        let builder = self.client.post(url);
        let builder = self.enable_auth_for_request(builder);
        builder.send().await?.error_for_status()?;
        Ok(())
    }

    pub async fn restart_db_instance(
        &self,
        id: &ResourceId,
        request: &RestartDbInstanceRequest,
    ) -> Result<()> {
        let url = self.build_url(&format!("/dbInstances/{}/actions/restart", id));
        let builder = self.client.post(url).json(request);
        let builder = self.enable_auth_for_request(builder);
        builder.send().await?.error_for_status()?;
        Ok(())
    }

    /* Backups */

    pub async fn create_backup(&self, request: &CreateBackupRequest) -> Result<Backup> {
        let url = self.build_url("/backups");
        let builder = self.client.post(url).json(request);
        let builder = self.enable_auth_for_request(builder);
        builder.send().await?.error_for_status()?.json().await
    }

    pub async fn get_backup(&self, id: &ResourceId) -> Result<Backup> {
        let url = self.build_url(&format!("/backups/{}", id));
        let builder = self.client.get(url);
        let builder = self.enable_auth_for_request(builder);
        builder.send().await?.error_for_status()?.json().await
    }

    pub async fn list_backups(
        &self,
        compartment_id: &str,
        db_instance_id: Option<&ResourceId>,
    ) -> Result<Vec<Backup>> {
        let url = self.build_url("/backups");
        let mut query = vec![("compartmentId", compartment_id.to_owned())];
        if let Some(id) = db_instance_id {
            query.push(("dbInstanceId", id.to_string()));
        }
        let builder = self.client.get(url).query(&query);
        let builder = self.enable_auth_for_request(builder);
        builder.send().await?.error_for_status()?.json().await
    }

    pub async fn delete_backup(&self, id: &ResourceId) -> Result<()> {
        let url = self.build_url(&format!("/backups/{}", id));
        let builder = self.client.delete(url);
        let builder = self.enable_auth_for_request(builder);
        builder.send().await?.error_for_status()?;
        Ok(())
    }

    /// Build a full URL from a path.
    fn build_url(&self, path: &str) -> String {
        self.base_url.clone() + path
    }

    /// Enable authentication for a request builder.
    fn enable_auth_for_request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credentials {
            Some(Credentials::Basic { username, password }) => {
                builder.basic_auth(username, password.as_ref())
            }
            Some(Credentials::Bearer { token }) => builder.bearer_auth(token),
            None => builder,
        }
    }
}
