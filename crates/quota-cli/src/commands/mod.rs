//! CLI commands

pub mod apply;
pub mod fields;
pub mod reset;
pub mod run;
pub mod show;

pub use apply::ApplyCommand;
pub use fields::FieldsCommand;
pub use reset::ResetCommand;
pub use run::RunCommand;
pub use show::ShowCommand;

use anyhow::{anyhow, bail, Result};
use clap::Args;
use os_quota_config::CloudConfig;
use os_quota_types::QuotaSet;

/// Connection flags shared by the commands that talk to a cloud
#[derive(Debug, Clone, Default, Args)]
pub struct CloudArgs {
    /// Named cloud from clouds.yaml
    #[arg(long)]
    pub cloud: Option<String>,

    /// SDK driver (openstack, memory)
    #[arg(long)]
    pub driver: Option<String>,

    /// State file for the memory driver
    #[arg(long)]
    pub state_file: Option<String>,

    /// Region name
    #[arg(long)]
    pub region: Option<String>,
}

impl CloudArgs {
    /// Cloud settings before clouds.yaml and `OS_*` resolution
    pub fn to_config(&self) -> CloudConfig {
        let mut config = CloudConfig {
            cloud: self.cloud.clone(),
            region_name: self.region.clone(),
            state_file: self.state_file.clone(),
            ..Default::default()
        };
        if let Some(driver) = &self.driver {
            config.driver.clone_from(driver);
        }
        config
    }
}

/// Parse `key=value` pairs into a quota map.
///
/// Values must be integers; a repeated key keeps the last value.
pub fn parse_quota_pairs<S: AsRef<str>>(pairs: &[S]) -> Result<QuotaSet> {
    let mut quota = QuotaSet::new();
    for pair in pairs {
        let pair = pair.as_ref();
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("Malformed quota '{}', expected key=value", pair))?;

        let key = key.trim();
        if key.is_empty() {
            bail!("Malformed quota '{}', missing field name", pair);
        }
        let value: i64 = value
            .trim()
            .parse()
            .map_err(|_| anyhow!("Quota value for '{}' must be an integer, got '{}'", key, value))?;

        quota.insert(key, value);
    }
    Ok(quota)
}
