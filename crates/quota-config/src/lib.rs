//! OS Quota Config
//!
//! Connection settings for the cloud SDK and declarative task files.

pub mod cloud;
pub mod clouds_yaml;
pub mod error;
pub mod task;


pub use cloud::{AuthConfig, CloudConfig};
pub use clouds_yaml::{CloudEntry, CloudsFile};
pub use error::ConfigError;
pub use task::QuotaTask;
