//! Cloud SDK contract and capability probe

use async_trait::async_trait;
use semver::Version;

use crate::error::{QuotaError, SdkError};
use os_quota_types::{QuotaDomain, QuotaSet};

/// Oldest SDK release whose quota calls are trusted
pub const MINIMUM_SDK_VERSION: Version = Version::new(1, 8, 0);

/// Operations a cloud SDK must expose for quota reconciliation.
///
/// One implementation serves all three domains; the domain selects which
/// service endpoint the call is routed to.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuotaSdk: Send + Sync {
    /// Human readable SDK name, used in error messages
    fn name(&self) -> String;

    /// Release string reported by the SDK
    fn version(&self) -> String;

    async fn get_quotas(&self, domain: QuotaDomain, project: &str) -> Result<QuotaSet, SdkError>;

    async fn set_quotas(
        &self,
        domain: QuotaDomain,
        project: &str,
        quotas: &QuotaSet,
    ) -> Result<(), SdkError>;

    /// Remove every override so the project reverts to domain defaults
    async fn delete_quotas(&self, domain: QuotaDomain, project: &str) -> Result<(), SdkError>;

    /// Limits the project would have without overrides.
    ///
    /// Clouds whose operators changed the defaults report their own values here.
    async fn get_default_quotas(
        &self,
        domain: QuotaDomain,
        _project: &str,
    ) -> Result<QuotaSet, SdkError> {
        Ok(domain.defaults())
    }
}

/// Result of inspecting an SDK before any quota call is made
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdkCapability {
    Ready(Version),
    Outdated { found: Version, minimum: Version },
    Unparseable { raw: String },
}

impl SdkCapability {
    /// Check the SDK's reported release against [`MINIMUM_SDK_VERSION`].
    ///
    /// Ordering is plain semver: pre-release tags sort before their release,
    /// so `1.8.0-rc.1` is still too old.
    pub fn probe(sdk: &dyn QuotaSdk) -> Self {
        let raw = sdk.version();
        match Version::parse(raw.trim()) {
            Ok(found) if found >= MINIMUM_SDK_VERSION => SdkCapability::Ready(found),
            Ok(found) => SdkCapability::Outdated {
                found,
                minimum: MINIMUM_SDK_VERSION,
            },
            Err(_) => SdkCapability::Unparseable { raw },
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, SdkCapability::Ready(_))
    }

    pub fn into_result(self, sdk: &str) -> Result<Version, QuotaError> {
        match self {
            SdkCapability::Ready(version) => Ok(version),
            SdkCapability::Outdated { found, minimum } => Err(QuotaError::UnsupportedVersion {
                sdk: sdk.to_string(),
                found: found.to_string(),
                minimum: minimum.to_string(),
            }),
            SdkCapability::Unparseable { raw } => Err(QuotaError::UnsupportedVersion {
                sdk: sdk.to_string(),
                found: raw,
                minimum: MINIMUM_SDK_VERSION.to_string(),
            }),
        }
    }
}
