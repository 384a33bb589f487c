//! SDK driver factory
//!
//! Loads the quota SDK named in the cloud settings.

use std::sync::Arc;

use os_quota_config::CloudConfig;
use os_quota_core::{QuotaError, QuotaSdk};

use crate::memory::MemoryCloud;

/// Driver names this build can load
pub fn available_drivers() -> Vec<&'static str> {
    let mut drivers = vec!["memory"];
    if cfg!(feature = "openstack") {
        drivers.push("openstack");
    }
    drivers
}

/// SDK driver factory
pub struct SdkFactory;

impl SdkFactory {
    /// Create the driver selected by `config.driver`.
    ///
    /// A driver that is unknown or compiled out is reported as
    /// [`QuotaError::DependencyUnavailable`] before any quota call is made.
    pub async fn load(config: &CloudConfig) -> Result<Arc<dyn QuotaSdk>, QuotaError> {
        match config.driver.as_str() {
            "memory" => {
                let mut cloud = MemoryCloud::new();
                if let Some(path) = &config.state_file {
                    cloud = cloud
                        .with_storage(path)
                        .await
                        .map_err(|e| QuotaError::Configuration(e.message))?;
                }
                log::debug!("Loaded memory quota driver");
                Ok(Arc::new(cloud))
            }
            "openstack" => Self::load_openstack(config),
            other => {
                log::error!(
                    "Unknown quota driver '{}' (available: {})",
                    other,
                    available_drivers().join(", ")
                );
                Err(QuotaError::DependencyUnavailable {
                    sdk: other.to_string(),
                })
            }
        }
    }

    #[cfg(feature = "openstack")]
    fn load_openstack(config: &CloudConfig) -> Result<Arc<dyn QuotaSdk>, QuotaError> {
        let cloud = crate::openstack::OpenStackCloud::new(config.clone())
            .map_err(|e| QuotaError::Configuration(e.message))?;
        log::debug!("Loaded openstack quota driver");
        Ok(Arc::new(cloud))
    }

    #[cfg(not(feature = "openstack"))]
    fn load_openstack(_config: &CloudConfig) -> Result<Arc<dyn QuotaSdk>, QuotaError> {
        Err(QuotaError::DependencyUnavailable {
            sdk: "openstack".to_string(),
        })
    }
}
