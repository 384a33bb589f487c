//! Cloud connection settings

use serde::{Deserialize, Serialize};

use crate::clouds_yaml::CloudsFile;
use crate::error::ConfigError;

/// Keystone credentials.
///
/// Opaque to the reconciler; handed to the SDK driver as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub auth_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub project_name: Option<String>,
    pub project_id: Option<String>,
    pub user_domain_name: Option<String>,
    pub project_domain_name: Option<String>,
    pub token: Option<String>,
}

impl AuthConfig {
    /// Read the standard `OS_*` variables
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            auth_url: var("OS_AUTH_URL"),
            username: var("OS_USERNAME"),
            password: var("OS_PASSWORD"),
            project_name: var("OS_PROJECT_NAME").or_else(|| var("OS_TENANT_NAME")),
            project_id: var("OS_PROJECT_ID").or_else(|| var("OS_TENANT_ID")),
            user_domain_name: var("OS_USER_DOMAIN_NAME"),
            project_domain_name: var("OS_PROJECT_DOMAIN_NAME"),
            token: var("OS_TOKEN"),
        }
    }

    /// Fill every unset field from `other`
    pub fn fill_from(&mut self, other: &AuthConfig) {
        fn fill(slot: &mut Option<String>, value: &Option<String>) {
            if slot.is_none() {
                slot.clone_from(value);
            }
        }

        fill(&mut self.auth_url, &other.auth_url);
        fill(&mut self.username, &other.username);
        fill(&mut self.password, &other.password);
        fill(&mut self.project_name, &other.project_name);
        fill(&mut self.project_id, &other.project_id);
        fill(&mut self.user_domain_name, &other.user_domain_name);
        fill(&mut self.project_domain_name, &other.project_domain_name);
        fill(&mut self.token, &other.token);
    }

    pub fn is_empty(&self) -> bool {
        *self == AuthConfig::default()
    }
}

fn default_driver() -> String {
    "openstack".to_string()
}

const DEFAULT_INTERFACE: &str = "public";

fn default_timeout() -> u64 {
    30
}

/// Everything needed to construct an SDK session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudConfig {
    /// SDK driver name (`openstack` or `memory`)
    #[serde(default = "default_driver")]
    pub driver: String,
    /// Named entry in clouds.yaml
    #[serde(default)]
    pub cloud: Option<String>,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub region_name: Option<String>,
    /// Endpoint interface; unset means clouds.yaml or `public`
    #[serde(default)]
    pub interface: Option<String>,
    /// TLS verification; unset means clouds.yaml or `true`
    #[serde(default)]
    pub verify: Option<bool>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Persistence file for the memory driver
    #[serde(default)]
    pub state_file: Option<String>,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            driver: default_driver(),
            cloud: None,
            auth: AuthConfig::default(),
            region_name: None,
            interface: None,
            verify: None,
            timeout_secs: default_timeout(),
            state_file: None,
        }
    }
}

impl CloudConfig {
    /// Endpoint interface to select from the service catalog
    pub fn interface(&self) -> &str {
        self.interface.as_deref().unwrap_or(DEFAULT_INTERFACE)
    }

    /// Whether TLS certificates are verified
    pub fn verify(&self) -> bool {
        self.verify.unwrap_or(true)
    }

    /// Layer the named clouds.yaml entry and `OS_*` variables under the
    /// explicitly given settings.
    pub fn resolve(&self) -> Result<CloudConfig, ConfigError> {
        let clouds = match &self.cloud {
            Some(_) => CloudsFile::discover()?,
            None => None,
        };
        let mut resolved = self.resolve_with(clouds.as_ref(), &AuthConfig::from_env())?;
        if resolved.region_name.is_none() {
            resolved.region_name = std::env::var("OS_REGION_NAME").ok();
        }
        Ok(resolved)
    }

    pub fn resolve_with(
        &self,
        clouds: Option<&CloudsFile>,
        env: &AuthConfig,
    ) -> Result<CloudConfig, ConfigError> {
        let mut resolved = self.clone();

        if let Some(name) = &self.cloud {
            let entry = clouds
                .and_then(|file| file.get(name))
                .ok_or_else(|| ConfigError::CloudNotFound(name.clone()))?;

            resolved.auth.fill_from(&entry.auth);
            if resolved.region_name.is_none() {
                resolved.region_name.clone_from(&entry.region_name);
            }
            if resolved.interface.is_none() {
                resolved.interface.clone_from(&entry.interface);
            }
            if resolved.verify.is_none() {
                resolved.verify = entry.verify;
            }
            log::debug!("Using clouds.yaml entry '{}'", name);
        }

        resolved.auth.fill_from(env);
        Ok(resolved)
    }
}
