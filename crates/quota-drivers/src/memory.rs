//! In-memory quota driver
//!
//! Keeps per-project overrides on top of the domain defaults, optionally
//! persisted to a JSON file so separate invocations share state.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use os_quota_core::{QuotaSdk, SdkError};
use os_quota_types::{QuotaDomain, QuotaSet};

use crate::SDK_VERSION;

/// Persisted state of a [`MemoryCloud`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct MemoryState {
    /// Known projects; empty means any project name is accepted
    #[serde(default)]
    projects: BTreeSet<String>,
    #[serde(default)]
    overrides: BTreeMap<String, BTreeMap<QuotaDomain, QuotaSet>>,
}

/// Quota backend held in process memory
pub struct MemoryCloud {
    version: String,
    state: RwLock<MemoryState>,
    storage: Option<PathBuf>,
    calls: AtomicUsize,
}

impl MemoryCloud {
    /// Create an empty cloud accepting any project
    pub fn new() -> Self {
        Self {
            version: SDK_VERSION.to_string(),
            state: RwLock::new(MemoryState::default()),
            storage: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Restrict the cloud to the given projects, keeping any loaded overrides
    pub fn with_projects<I, S>(mut self, projects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .get_mut()
            .projects
            .extend(projects.into_iter().map(Into::into));
        self
    }

    /// Report a different SDK release (used to exercise version gating)
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Back the cloud with a JSON file, loading any existing content
    pub async fn with_storage<P: AsRef<Path>>(mut self, path: P) -> Result<Self, SdkError> {
        let path = path.as_ref().to_path_buf();

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                let loaded: MemoryState = serde_json::from_str(&content).map_err(|e| {
                    SdkError::new(format!("Invalid state file {}: {}", path.display(), e))
                })?;
                let state = self.state.get_mut();
                state.projects.extend(loaded.projects);
                state.overrides = loaded.overrides;
                log::info!("Loaded quota state from {}", path.display());
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!(
                    "No quota state found at {}, starting from defaults",
                    path.display()
                );
            }
            Err(e) => {
                return Err(SdkError::new(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        }

        self.storage = Some(path);
        Ok(self)
    }

    /// Number of quota calls served so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn save_to_storage(&self) -> Result<(), SdkError> {
        let Some(path) = &self.storage else {
            return Ok(());
        };

        let content = {
            let state = self.state.read().await;
            serde_json::to_string_pretty(&*state)
                .map_err(|e| SdkError::new(format!("Failed to encode quota state: {}", e)))?
        };

        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, content)
            .await
            .map_err(|e| SdkError::new(format!("Failed to write {}: {}", temp_path.display(), e)))?;
        tokio::fs::rename(&temp_path, path)
            .await
            .map_err(|e| SdkError::new(format!("Failed to write {}: {}", path.display(), e)))?;

        log::debug!("Saved quota state to {}", path.display());
        Ok(())
    }

    fn check_project(state: &MemoryState, project: &str) -> Result<(), SdkError> {
        if state.projects.is_empty() || state.projects.contains(project) {
            Ok(())
        } else {
            Err(SdkError::new(format!("Project {} not found", project)))
        }
    }
}

impl Default for MemoryCloud {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuotaSdk for MemoryCloud {
    fn name(&self) -> String {
        "memory".to_string()
    }

    fn version(&self) -> String {
        self.version.clone()
    }

    async fn get_quotas(&self, domain: QuotaDomain, project: &str) -> Result<QuotaSet, SdkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.read().await;
        Self::check_project(&state, project)?;

        let mut quotas = domain.defaults();
        if let Some(custom) = state
            .overrides
            .get(project)
            .and_then(|domains| domains.get(&domain))
        {
            quotas.merge(custom);
        }
        Ok(quotas)
    }

    async fn set_quotas(
        &self,
        domain: QuotaDomain,
        project: &str,
        quotas: &QuotaSet,
    ) -> Result<(), SdkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        {
            let mut state = self.state.write().await;
            Self::check_project(&state, project)?;

            if let Some(field) = quotas.keys().find(|field| !domain.is_recognized(field)) {
                return Err(SdkError::new(format!(
                    "Bad key(s) in {} quota: {}",
                    domain, field
                )));
            }

            state
                .overrides
                .entry(project.to_string())
                .or_default()
                .entry(domain)
                .or_default()
                .merge(quotas);
        }

        log::debug!("Set {} quotas for project {}", domain, project);
        self.save_to_storage().await
    }

    async fn delete_quotas(&self, domain: QuotaDomain, project: &str) -> Result<(), SdkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        {
            let mut state = self.state.write().await;
            Self::check_project(&state, project)?;

            if let Some(domains) = state.overrides.get_mut(project) {
                domains.remove(&domain);
                if domains.is_empty() {
                    state.overrides.remove(project);
                }
            }
        }

        log::debug!("Deleted {} quotas for project {}", domain, project);
        self.save_to_storage().await
    }

    async fn get_default_quotas(
        &self,
        domain: QuotaDomain,
        project: &str,
    ) -> Result<QuotaSet, SdkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.read().await;
        Self::check_project(&state, project)?;
        Ok(domain.defaults())
    }
}
