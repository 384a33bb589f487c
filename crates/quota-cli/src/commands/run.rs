//! Run command

use std::path::Path;

use anyhow::{Context, Result};
use os_quota_config::QuotaTask;
use os_quota_types::ReconcileOutcome;

use crate::context::CliContext;

/// Execute a declarative task file
pub struct RunCommand {
    force_check: bool,
}

impl RunCommand {
    /// `force_check` turns on check mode even if the task leaves it off
    pub fn new(force_check: bool) -> Self {
        Self { force_check }
    }

    pub async fn execute<P: AsRef<Path>>(&self, path: P) -> Result<ReconcileOutcome> {
        let path = path.as_ref();
        let task = QuotaTask::load_from_file(path)
            .with_context(|| format!("Failed to load task file {}", path.display()))?;

        let check_mode = self.force_check || task.check_mode;
        let context = CliContext::bootstrap(&task.connection, check_mode).await?;
        let outcome = context.reconciler.reconcile(&task.request()).await?;
        Ok(outcome)
    }
}
