//! clouds.yaml lookup

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cloud::AuthConfig;
use crate::error::ConfigError;

/// One named cloud from clouds.yaml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudEntry {
    pub auth: AuthConfig,
    pub region_name: Option<String>,
    pub interface: Option<String>,
    pub verify: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudsFile {
    #[serde(default)]
    pub clouds: HashMap<String, CloudEntry>,
}

impl CloudsFile {
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Candidate locations in lookup order
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Ok(explicit) = std::env::var("OS_CLIENT_CONFIG_FILE") {
            paths.push(PathBuf::from(explicit));
        }
        paths.push(PathBuf::from("clouds.yaml"));
        if let Ok(home) = std::env::var("HOME") {
            paths.push(Path::new(&home).join(".config/openstack/clouds.yaml"));
        }
        paths.push(PathBuf::from("/etc/openstack/clouds.yaml"));
        paths
    }

    /// Load the first clouds.yaml found, if any
    pub fn discover() -> Result<Option<Self>, ConfigError> {
        for path in Self::search_paths() {
            if path.exists() {
                log::debug!("Loading clouds from {}", path.display());
                return Self::load(&path).map(Some);
            }
        }
        Ok(None)
    }

    pub fn get(&self, name: &str) -> Option<&CloudEntry> {
        self.clouds.get(name)
    }
}
