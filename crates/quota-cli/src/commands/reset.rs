//! Reset command

use std::sync::Arc;

use anyhow::Result;
use os_quota_types::{QuotaDomain, QuotaRequest, ReconcileOutcome};

use crate::context::CliContext;

/// Drop a project's overrides so it falls back to the defaults
pub struct ResetCommand {
    context: Arc<CliContext>,
}

impl ResetCommand {
    pub fn new(context: Arc<CliContext>) -> Self {
        Self { context }
    }

    pub async fn execute(&self, domain: QuotaDomain, project: &str) -> Result<ReconcileOutcome> {
        let request = QuotaRequest::absent(domain, project);
        let outcome = self.context.reconciler.reconcile(&request).await?;
        Ok(outcome)
    }
}
