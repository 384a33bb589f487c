//! Show command

use std::sync::Arc;

use anyhow::Result;
use os_quota_types::{QuotaDomain, ReconcileOutcome};

use crate::context::CliContext;

/// Read a project's current quotas without changing them
pub struct ShowCommand {
    context: Arc<CliContext>,
}

impl ShowCommand {
    pub fn new(context: Arc<CliContext>) -> Self {
        Self { context }
    }

    pub async fn execute(&self, domain: QuotaDomain, project: &str) -> Result<ReconcileOutcome> {
        let quotas = self.context.reconciler.read(domain, project).await?;
        Ok(ReconcileOutcome {
            changed: false,
            quotas,
        })
    }
}
