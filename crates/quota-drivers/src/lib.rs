//! OS Quota Drivers
//!
//! Cloud SDK implementations behind the [`QuotaSdk`](os_quota_core::QuotaSdk)
//! contract.

pub mod factory;
pub mod memory;
#[cfg(feature = "openstack")]
pub mod openstack;


pub use factory::{available_drivers, SdkFactory};
pub use memory::MemoryCloud;
#[cfg(feature = "openstack")]
pub use openstack::OpenStackCloud;

/// Release reported by the drivers in this crate
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");
