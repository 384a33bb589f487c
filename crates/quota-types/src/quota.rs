use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::QuotaDomain;

/// Flat mapping of quota field name to limit.
///
/// Backed by a `BTreeMap` so equality never depends on insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuotaSet(BTreeMap<String, i64>);

impl QuotaSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from a raw JSON object, keeping only integer-valued entries.
    ///
    /// Quota API responses mix limits with bookkeeping members such as `id`
    /// or nested usage objects; those are dropped here.
    pub fn from_json_object(object: &serde_json::Map<String, serde_json::Value>) -> Self {
        object
            .iter()
            .filter_map(|(key, value)| value.as_i64().map(|limit| (key.clone(), limit)))
            .collect()
    }

    pub fn get(&self, field: &str) -> Option<i64> {
        self.0.get(field).copied()
    }

    pub fn insert(&mut self, field: impl Into<String>, limit: i64) -> Option<i64> {
        self.0.insert(field.into(), limit)
    }

    pub fn remove(&mut self, field: &str) -> Option<i64> {
        self.0.remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Overwrite this set's values with every entry of `other`
    pub fn merge(&mut self, other: &QuotaSet) {
        for (field, limit) in other.iter() {
            self.0.insert(field.to_string(), limit);
        }
    }

    /// Copy restricted to the fields the domain recognizes
    pub fn normalized(&self, domain: QuotaDomain) -> QuotaSet {
        self.0
            .iter()
            .filter(|(field, _)| domain.is_recognized(field))
            .map(|(field, limit)| (field.clone(), *limit))
            .collect()
    }

    /// Whether every entry of `subset` has the same value here
    pub fn includes(&self, subset: &QuotaSet) -> bool {
        subset.iter().all(|(field, limit)| self.get(field) == Some(limit))
    }
}

impl FromIterator<(String, i64)> for QuotaSet {
    fn from_iter<I: IntoIterator<Item = (String, i64)>>(iter: I) -> Self {
        QuotaSet(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<(&'a str, i64)> for QuotaSet {
    fn from_iter<I: IntoIterator<Item = (&'a str, i64)>>(iter: I) -> Self {
        QuotaSet(iter.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }
}

impl From<BTreeMap<String, i64>> for QuotaSet {
    fn from(map: BTreeMap<String, i64>) -> Self {
        QuotaSet(map)
    }
}

impl IntoIterator for QuotaSet {
    type Item = (String, i64);
    type IntoIter = btree_map::IntoIter<String, i64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
