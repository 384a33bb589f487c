use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SharedTypeError;
use crate::quota::QuotaSet;

/// Recognized compute (nova) quota fields and their platform defaults.
const COMPUTE_FIELDS: &[(&str, i64)] = &[
    ("instances", 10),
    ("cores", 20),
    ("ram", 51200),
    ("floating_ips", 10),
    ("fixed_ips", -1),
    ("metadata_items", 128),
    ("injected_files", 5),
    ("injected_file_content_bytes", 10240),
    ("injected_file_path_bytes", 255),
    ("key_pairs", 100),
    ("security_groups", 10),
    ("security_group_rules", 20),
    ("server_groups", 10),
    ("server_group_members", 10),
];

/// Recognized network (neutron) quota fields and their platform defaults.
const NETWORK_FIELDS: &[(&str, i64)] = &[
    ("floatingip", 50),
    ("network", 100),
    ("port", 500),
    ("rbac_policy", 10),
    ("router", 10),
    ("security_group", 10),
    ("security_group_rule", 100),
    ("subnet", 100),
    ("subnetpool", -1),
];

/// Recognized volume (cinder) quota fields and their platform defaults.
const VOLUME_FIELDS: &[(&str, i64)] = &[
    ("backup_gigabytes", 1000),
    ("backups", 10),
    ("gigabytes", 1000),
    ("per_volume_gigabytes", -1),
    ("snapshots", 10),
    ("volumes", 10),
];

/// Quota category handled by one reconciler instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotaDomain {
    Compute,
    Network,
    Volume,
}

impl QuotaDomain {
    pub const ALL: [QuotaDomain; 3] = [
        QuotaDomain::Compute,
        QuotaDomain::Network,
        QuotaDomain::Volume,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuotaDomain::Compute => "compute",
            QuotaDomain::Network => "network",
            QuotaDomain::Volume => "volume",
        }
    }

    fn catalog(&self) -> &'static [(&'static str, i64)] {
        match self {
            QuotaDomain::Compute => COMPUTE_FIELDS,
            QuotaDomain::Network => NETWORK_FIELDS,
            QuotaDomain::Volume => VOLUME_FIELDS,
        }
    }

    /// Field names accepted for this domain, in catalog order
    pub fn fields(&self) -> impl Iterator<Item = &'static str> {
        self.catalog().iter().map(|(name, _)| *name)
    }

    pub fn is_recognized(&self, field: &str) -> bool {
        self.catalog().iter().any(|(name, _)| *name == field)
    }

    pub fn default_for(&self, field: &str) -> Option<i64> {
        self.catalog()
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| *value)
    }

    /// Values a project reverts to once its overrides are deleted
    pub fn defaults(&self) -> QuotaSet {
        self.catalog()
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect()
    }
}

impl fmt::Display for QuotaDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuotaDomain {
    type Err = SharedTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compute" | "nova" => Ok(QuotaDomain::Compute),
            "network" | "neutron" => Ok(QuotaDomain::Network),
            "volume" | "cinder" | "block-storage" => Ok(QuotaDomain::Volume),
            other => Err(SharedTypeError::InvalidValue {
                field: "domain",
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_parsing() {
        assert_eq!("compute".parse::<QuotaDomain>().unwrap(), QuotaDomain::Compute);
        assert_eq!("Neutron".parse::<QuotaDomain>().unwrap(), QuotaDomain::Network);
        assert_eq!("cinder".parse::<QuotaDomain>().unwrap(), QuotaDomain::Volume);
        assert!("object".parse::<QuotaDomain>().is_err());
    }

    #[test]
    fn test_field_catalogs() {
        assert_eq!(QuotaDomain::Compute.fields().count(), 14);
        assert_eq!(QuotaDomain::Network.fields().count(), 9);
        assert_eq!(QuotaDomain::Volume.fields().count(), 6);

        assert!(QuotaDomain::Compute.is_recognized("server_group_members"));
        assert!(!QuotaDomain::Compute.is_recognized("floatingip"));
        assert!(QuotaDomain::Network.is_recognized("rbac_policy"));
        assert!(QuotaDomain::Volume.is_recognized("per_volume_gigabytes"));
    }

    #[test]
    fn test_defaults_cover_every_field() {
        for domain in QuotaDomain::ALL {
            let defaults = domain.defaults();
            assert_eq!(defaults.len(), domain.fields().count());
            for field in domain.fields() {
                assert_eq!(defaults.get(field), domain.default_for(field));
            }
        }
        assert_eq!(QuotaDomain::Compute.default_for("ram"), Some(51200));
        assert_eq!(QuotaDomain::Network.default_for("port"), Some(500));
        assert_eq!(QuotaDomain::Volume.default_for("bogus"), None);
    }

    #[test]
    fn test_domain_serde_names() {
        let json = serde_json::to_string(&QuotaDomain::Volume).unwrap();
        assert_eq!(json, "\"volume\"");
        let parsed: QuotaDomain = serde_json::from_str("\"network\"").unwrap();
        assert_eq!(parsed, QuotaDomain::Network);
    }
}
