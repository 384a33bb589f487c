//! Declarative quota task files

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cloud::CloudConfig;
use crate::error::ConfigError;
use os_quota_types::{QuotaDomain, QuotaRequest, QuotaSet, QuotaState};

/// Environment prefix for task overrides, e.g. `OSQUOTA_PROJECT=demo`
pub const ENV_PREFIX: &str = "OSQUOTA";

/// One reconcile invocation described in a YAML, TOML or JSON file.
///
/// ```yaml
/// domain: compute
/// project: demo
/// state: present
/// quota:
///   instances: 33
///   cores: 33
/// connection:
///   cloud: mycloud
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaTask {
    pub domain: QuotaDomain,
    pub project: String,
    #[serde(default)]
    pub state: QuotaState,
    #[serde(default)]
    pub quota: Option<QuotaSet>,
    #[serde(default)]
    pub check_mode: bool,
    #[serde(default)]
    pub connection: CloudConfig,
}

impl QuotaTask {
    /// Load a task file, letting `OSQUOTA_*` variables override its keys.
    ///
    /// Nested keys use a double underscore: `OSQUOTA_CONNECTION__CLOUD`.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "task file not found"),
            });
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let task: QuotaTask = settings.try_deserialize()?;
        log::debug!(
            "Loaded {} task for project '{}' from {}",
            task.domain,
            task.project,
            path.display()
        );
        Ok(task)
    }

    pub fn request(&self) -> QuotaRequest {
        QuotaRequest {
            domain: self.domain,
            project: self.project.clone(),
            state: self.state,
            quota: self.quota.clone(),
        }
    }
}
