use std::sync::Arc;

use anyhow::{Context, Result};
use os_quota_config::CloudConfig;
use os_quota_core::QuotaReconciler;
use os_quota_drivers::SdkFactory;

/// Shared state for one CLI invocation
#[derive(Clone)]
pub struct CliContext {
    pub reconciler: Arc<QuotaReconciler>,
}

impl CliContext {
    /// Resolve cloud settings, load the SDK driver and probe its version
    pub async fn bootstrap(cloud: &CloudConfig, check_mode: bool) -> Result<Arc<Self>> {
        let cloud = cloud
            .resolve()
            .context("Failed to resolve cloud configuration")?;

        let sdk = SdkFactory::load(&cloud).await?;
        let reconciler = QuotaReconciler::new(sdk)?.with_check_mode(check_mode);
        log::debug!(
            "Quota driver '{}' ready (sdk {})",
            cloud.driver,
            reconciler.sdk_version()
        );

        Ok(Arc::new(Self {
            reconciler: Arc::new(reconciler),
        }))
    }
}
