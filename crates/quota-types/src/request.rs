use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::QuotaDomain;
use crate::error::SharedTypeError;
use crate::quota::QuotaSet;

/// Desired state of a project's quota overrides
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotaState {
    /// Apply the requested values
    #[default]
    Present,
    /// Drop all overrides so the project falls back to defaults
    Absent,
}

impl fmt::Display for QuotaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuotaState::Present => write!(f, "present"),
            QuotaState::Absent => write!(f, "absent"),
        }
    }
}

impl FromStr for QuotaState {
    type Err = SharedTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "present" => Ok(QuotaState::Present),
            "absent" => Ok(QuotaState::Absent),
            other => Err(SharedTypeError::InvalidValue {
                field: "state",
                value: other.to_string(),
            }),
        }
    }
}

/// One reconcile invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaRequest {
    pub domain: QuotaDomain,
    pub project: String,
    #[serde(default)]
    pub state: QuotaState,
    #[serde(default)]
    pub quota: Option<QuotaSet>,
}

impl QuotaRequest {
    pub fn present(domain: QuotaDomain, project: impl Into<String>, quota: QuotaSet) -> Self {
        Self {
            domain,
            project: project.into(),
            state: QuotaState::Present,
            quota: Some(quota),
        }
    }

    pub fn absent(domain: QuotaDomain, project: impl Into<String>) -> Self {
        Self {
            domain,
            project: project.into(),
            state: QuotaState::Absent,
            quota: None,
        }
    }
}

/// Successful reconcile result: `{"changed": .., "quotas": {..}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileOutcome {
    pub changed: bool,
    pub quotas: QuotaSet,
}

/// Failed reconcile result: `{"failed": true, "msg": ".."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileFailure {
    pub failed: bool,
    pub msg: String,
}

impl ReconcileFailure {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            failed: true,
            msg: msg.into(),
        }
    }
}
