//! Apply command

use std::sync::Arc;

use anyhow::Result;
use os_quota_types::{QuotaDomain, QuotaRequest, QuotaSet, ReconcileOutcome};

use crate::context::CliContext;

/// Set quota overrides on a project
pub struct ApplyCommand {
    context: Arc<CliContext>,
}

impl ApplyCommand {
    pub fn new(context: Arc<CliContext>) -> Self {
        Self { context }
    }

    /// Execute apply command
    pub async fn execute(
        &self,
        domain: QuotaDomain,
        project: &str,
        quota: QuotaSet,
    ) -> Result<ReconcileOutcome> {
        if self.context.reconciler.check_mode() {
            log::info!("Check mode: no {} quotas will be written", domain);
        }

        let request = QuotaRequest::present(domain, project, quota);
        let outcome = self.context.reconciler.reconcile(&request).await?;
        Ok(outcome)
    }
}
