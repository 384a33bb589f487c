//! Fields command

use std::collections::BTreeMap;

use os_quota_types::{QuotaDomain, QuotaSet};

/// List recognized quota fields with their default limits
pub struct FieldsCommand;

impl FieldsCommand {
    pub fn new() -> Self {
        Self
    }

    /// Defaults for one domain, or for all of them when none is given
    pub fn execute(&self, domain: Option<QuotaDomain>) -> BTreeMap<QuotaDomain, QuotaSet> {
        let domains: &[QuotaDomain] = match &domain {
            Some(domain) => std::slice::from_ref(domain),
            None => &QuotaDomain::ALL,
        };
        domains
            .iter()
            .map(|domain| (*domain, domain.defaults()))
            .collect()
    }
}

impl Default for FieldsCommand {
    fn default() -> Self {
        Self::new()
    }
}
