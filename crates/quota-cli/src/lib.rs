//! OS Quota CLI
//!
//! Command-line front end for reconciling OpenStack project quotas.
//!
//! Every command prints a single JSON document: `{"changed": .., "quotas": ..}`
//! on success and `{"failed": true, "msg": ..}` on failure.

pub mod commands;
pub mod context;


pub use context::CliContext;
