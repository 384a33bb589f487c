//! Quota reconciliation

use std::sync::Arc;

use semver::Version;

use crate::diff::QuotaDiff;
use crate::error::QuotaError;
use crate::sdk::{QuotaSdk, SdkCapability};
use crate::validate::RequestValidator;
use crate::Result;
use os_quota_types::{QuotaDomain, QuotaRequest, QuotaSet, QuotaState, ReconcileOutcome};

/// Brings a project's quotas in line with a [`QuotaRequest`].
///
/// Each call is a single read, write-or-delete, read sequence. Nothing is
/// cached between calls, so concurrent callers against the same project may
/// observe each other's writes in their "before" snapshot.
pub struct QuotaReconciler {
    sdk: Arc<dyn QuotaSdk>,
    sdk_version: Version,
    validator: RequestValidator,
    check_mode: bool,
}

impl QuotaReconciler {
    /// Create a reconciler, probing the SDK version once.
    ///
    /// No quota call is made when the probe fails.
    pub fn new(sdk: Arc<dyn QuotaSdk>) -> Result<Self> {
        let name = sdk.name();
        let sdk_version = SdkCapability::probe(sdk.as_ref()).into_result(&name)?;
        log::debug!("Using {} {} for quota operations", name, sdk_version);

        Ok(Self {
            sdk,
            sdk_version,
            validator: RequestValidator::new(),
            check_mode: false,
        })
    }

    /// Predict the outcome without issuing writes or deletes
    pub fn with_check_mode(mut self, enabled: bool) -> Self {
        self.check_mode = enabled;
        self
    }

    pub fn sdk_version(&self) -> &Version {
        &self.sdk_version
    }

    pub fn check_mode(&self) -> bool {
        self.check_mode
    }

    /// Fetch the current quotas of a project, restricted to the domain's fields
    pub async fn read(&self, domain: QuotaDomain, project: &str) -> Result<QuotaSet> {
        if project.trim().is_empty() {
            return Err(QuotaError::invalid("project must not be empty"));
        }
        self.fetch(domain, project).await
    }

    pub async fn reconcile(&self, request: &QuotaRequest) -> Result<ReconcileOutcome> {
        self.validator.validate(request)?;

        let domain = request.domain;
        let project = request.project.as_str();
        log::info!(
            "Reconciling {} quotas for project '{}' (state: {})",
            domain,
            project,
            request.state
        );

        let before = self.fetch(domain, project).await?;
        log::debug!("{} quotas before: {:?}", domain, before);

        let after = if self.check_mode {
            self.predict(request, &before).await?
        } else {
            self.apply(request).await?;
            self.fetch(domain, project).await?
        };
        log::debug!("{} quotas after: {:?}", domain, after);

        let diff = QuotaDiff::between(domain, &before, &after);
        for change in &diff.changes {
            log::debug!(
                "{} quota {} changed: {:?} -> {:?}",
                domain,
                change.field,
                change.before,
                change.after
            );
        }

        let changed = !diff.is_empty();
        log::info!(
            "{} quotas for project '{}' {}",
            domain,
            project,
            if changed { "changed" } else { "unchanged" }
        );

        Ok(ReconcileOutcome {
            changed,
            quotas: after,
        })
    }

    async fn fetch(&self, domain: QuotaDomain, project: &str) -> Result<QuotaSet> {
        let quotas = self
            .sdk
            .get_quotas(domain, project)
            .await
            .map_err(|e| QuotaError::cloud("get", e))?;
        Ok(quotas.normalized(domain))
    }

    async fn apply(&self, request: &QuotaRequest) -> Result<()> {
        let domain = request.domain;
        let project = request.project.as_str();

        match (request.state, &request.quota) {
            (QuotaState::Present, Some(quota)) => self
                .sdk
                .set_quotas(domain, project, quota)
                .await
                .map_err(|e| QuotaError::cloud("set", e)),
            (QuotaState::Present, None) => Err(QuotaError::invalid(
                "state is present but no quota values were given",
            )),
            (QuotaState::Absent, _) => self
                .sdk
                .delete_quotas(domain, project)
                .await
                .map_err(|e| QuotaError::cloud("delete", e)),
        }
    }

    async fn predict(&self, request: &QuotaRequest, before: &QuotaSet) -> Result<QuotaSet> {
        match (request.state, &request.quota) {
            (QuotaState::Present, Some(quota)) => {
                let mut predicted = before.clone();
                predicted.merge(quota);
                Ok(predicted)
            }
            (QuotaState::Present, None) => Ok(before.clone()),
            (QuotaState::Absent, _) => {
                let defaults = self
                    .sdk
                    .get_default_quotas(request.domain, &request.project)
                    .await
                    .map_err(|e| QuotaError::cloud("defaults", e))?;
                Ok(defaults.normalized(request.domain))
            }
        }
    }
}
