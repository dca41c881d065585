//! Per-kind limits.
//!
//! The reserved key `text` holds the display-length budget; every other key is
//! a resource kind and holds the maximum number of occurrences kept.

use std::collections::{BTreeMap, btree_map};
use std::iter;

use serde::{Deserialize, Serialize};

/// Reserved key for the display-length budget.
pub const TEXT_KEY: &str = "text";

/// Default display-length budget.
pub const DEFAULT_TEXT_LIMIT: usize = 140;

/// Occurrence limit used for a kind with no entry.
pub const DEFAULT_KIND_LIMIT: usize = 1;

/// Mapping from kind key to limit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Limits(BTreeMap<String, usize>);

impl Default for Limits {
    fn default() -> Self {
        Self::empty()
            .with(TEXT_KEY, DEFAULT_TEXT_LIMIT)
            .with("image", DEFAULT_KIND_LIMIT)
            .with("link", DEFAULT_KIND_LIMIT)
    }
}

impl Limits {
    /// Limits with no entries; useful for per-call overrides.
    #[must_use]
    pub const fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Set the limit for `key`.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, limit: usize) -> Self {
        self.set(key, limit);
        self
    }

    /// Set the display-length budget.
    #[must_use]
    pub fn with_text(self, limit: usize) -> Self {
        self.with(TEXT_KEY, limit)
    }

    /// Set the limit for `key` in place.
    pub fn set(&mut self, key: impl Into<String>, limit: usize) {
        self.0.insert(key.into(), limit);
    }

    /// Explicit entry for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<usize> {
        self.0.get(key).copied()
    }

    /// Occurrence limit for a resource kind.
    #[must_use]
    pub fn kind(&self, key: &str) -> usize {
        self.get(key).unwrap_or(DEFAULT_KIND_LIMIT)
    }

    /// Display-length budget.
    #[must_use]
    pub fn text(&self) -> usize {
        self.get(TEXT_KEY).unwrap_or(DEFAULT_TEXT_LIMIT)
    }

    /// Entries of `overrides` replace ours; keys they lack keep our value.
    #[must_use]
    pub fn merged(&self, overrides: &Self) -> Self {
        let mut merged = self.clone();
        if overrides.is_empty() {
            return merged;
        }
        for (key, limit) in overrides {
            merged.set(key, limit);
        }
        merged
    }

    /// Whether no entries are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate entries in key order.
    pub fn iter<'a>(&'a self) -> LimitsIter<'a> {
        let entry: fn((&'a String, &'a usize)) -> (&'a str, usize) = |(k, v)| (k.as_str(), *v);
        self.0.iter().map(entry)
    }
}

/// Iterator over `(key, limit)` entries.
pub type LimitsIter<'a> =
    iter::Map<btree_map::Iter<'a, String, usize>, fn((&'a String, &'a usize)) -> (&'a str, usize)>;

impl<'a> IntoIterator for &'a Limits {
    type Item = (&'a str, usize);
    type IntoIter = LimitsIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, usize)> for Limits {
    fn from_iter<I: IntoIterator<Item = (K, usize)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
