//! OS Quota Core
//!
//! Reconciles a project's compute, network or volume quotas against a
//! declared target through a pluggable cloud SDK.

pub mod diff;
pub mod error;
pub mod reconciler;
pub mod sdk;
pub mod validate;


pub use diff::{FieldChange, QuotaDiff};
pub use error::{QuotaError, SdkError};
pub use reconciler::QuotaReconciler;
pub use sdk::{QuotaSdk, SdkCapability, MINIMUM_SDK_VERSION};
pub use validate::RequestValidator;

pub use os_quota_types::{
    QuotaDomain, QuotaRequest, QuotaSet, QuotaState, ReconcileFailure, ReconcileOutcome,
};

/// Result type for quota operations
pub type Result<T> = std::result::Result<T, QuotaError>;
