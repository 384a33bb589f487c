pub mod domain;
pub mod error;
pub mod quota;
pub mod request;

pub use domain::QuotaDomain;
pub use error::SharedTypeError;
pub use quota::QuotaSet;
pub use request::{QuotaRequest, QuotaState, ReconcileFailure, ReconcileOutcome};
