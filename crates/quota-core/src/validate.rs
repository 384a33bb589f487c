//! Request validation performed before any SDK call

use crate::error::QuotaError;
use crate::Result;
use os_quota_types::{QuotaRequest, QuotaState};

/// Checks a [`QuotaRequest`] against the domain's field allow-list
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestValidator;

impl RequestValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, request: &QuotaRequest) -> Result<()> {
        if request.project.trim().is_empty() {
            return Err(QuotaError::invalid("project must not be empty"));
        }

        match request.state {
            QuotaState::Present => {
                let quota = match &request.quota {
                    Some(quota) if !quota.is_empty() => quota,
                    _ => {
                        return Err(QuotaError::invalid(
                            "state is present but no quota values were given",
                        ))
                    }
                };

                let unknown: Vec<&str> = quota
                    .keys()
                    .filter(|field| !request.domain.is_recognized(field))
                    .collect();
                if !unknown.is_empty() {
                    return Err(QuotaError::invalid(format!(
                        "unsupported {} quota fields: {}",
                        request.domain,
                        unknown.join(", ")
                    )));
                }

                let negative: Vec<String> = quota
                    .iter()
                    .filter(|(_, limit)| *limit < 0)
                    .map(|(field, limit)| format!("{}={}", field, limit))
                    .collect();
                if !negative.is_empty() {
                    return Err(QuotaError::invalid(format!(
                        "quota values must be non-negative: {}",
                        negative.join(", ")
                    )));
                }
            }
            QuotaState::Absent => {
                if request.quota.as_ref().is_some_and(|q| !q.is_empty()) {
                    log::warn!(
                        "Ignoring quota values for project '{}': state is absent",
                        request.project
                    );
                }
            }
        }

        Ok(())
    }
}
