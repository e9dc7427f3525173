pub mod resource_client;

pub use resource_client::{is_not_found, ResourceClient};

use ::mydbs_common::config::CredentialsConfig;

/// Credentials for authenticating with the control plane.
#[derive(Clone)]
pub enum Credentials {
    Basic {
        username: String,
        password: Option<String>,
    },
    Bearer {
        token: String,
    },
}

impl Credentials {
    pub fn from_config(config: &CredentialsConfig) -> Self {
        match config {
            CredentialsConfig::Basic { username, password } => Self::Basic {
                username: username.clone(),
                password: password.clone(),
            },
            CredentialsConfig::Bearer { token } => Self::Bearer {
                token: token.clone(),
            },
        }
    }
}
