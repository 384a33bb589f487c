//! Change detection between two quota snapshots

use std::collections::BTreeSet;

use serde::Serialize;

use os_quota_types::{QuotaDomain, QuotaSet};

/// A single field whose limit differs between snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    pub field: String,
    pub before: Option<i64>,
    pub after: Option<i64>,
}

/// Field-level difference of two snapshots of one domain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuotaDiff {
    pub changes: Vec<FieldChange>,
}

impl QuotaDiff {
    /// Compare two snapshots after restricting both to the domain's fields.
    ///
    /// Extra members an API might add between calls never count as a change.
    pub fn between(domain: QuotaDomain, before: &QuotaSet, after: &QuotaSet) -> Self {
        let before = before.normalized(domain);
        let after = after.normalized(domain);

        let fields: BTreeSet<&str> = before.keys().chain(after.keys()).collect();
        let changes = fields
            .into_iter()
            .filter_map(|field| {
                let old = before.get(field);
                let new = after.get(field);
                (old != new).then(|| FieldChange {
                    field: field.to_string(),
                    before: old,
                    after: new,
                })
            })
            .collect();

        Self { changes }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }
}
