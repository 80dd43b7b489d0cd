//! # Resources
//!
//! Classified custom resource types and their aggregation by scope and API
//! group. Aggregation is what makes generated rules independent of the order
//! in which manifests were discovered.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Scope of a custom resource type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
    /// Cluster-wide resources. These feed the module's `manage` roles.
    Cluster,
    /// Namespace-scoped resources. These feed the module's `use` roles.
    Namespaced,
}

impl Scope {
    /// Get the string representation as written in manifests.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Cluster => "Cluster",
            Scope::Namespaced => "Namespaced",
        }
    }

    /// Parse scope from its manifest representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Cluster" => Some(Scope::Cluster),
            "Namespaced" => Some(Scope::Namespaced),
            _ => None,
        }
    }
}

/// A resource type accepted for a module.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ResourceRecord {
    /// API group of the resource (e.g. `deckhouse.io`).
    pub group: String,
    /// Plural resource name (e.g. `moduleconfigs`).
    pub plural: String,
    /// Scope declared by the manifest.
    pub scope: Scope,
}

impl ResourceRecord {
    /// Create a new record.
    pub fn new(group: impl Into<String>, plural: impl Into<String>, scope: Scope) -> Self {
        Self {
            group: group.into(),
            plural: plural.into(),
            scope,
        }
    }
}

/// Accumulates records into per-scope `group -> names` sets.
///
/// # Example
///
/// ```
/// use rbacgen_rbac::resources::{ResourceAggregator, ResourceRecord, Scope};
///
/// let mut agg = ResourceAggregator::new();
/// agg.add(ResourceRecord::new("alpha.io", "widgets", Scope::Cluster));
/// agg.add(ResourceRecord::new("alpha.io", "gadgets", Scope::Namespaced));
/// agg.add(ResourceRecord::new("alpha.io", "widgets", Scope::Cluster));
///
/// let resources = agg.finish();
/// assert_eq!(resources.cluster["alpha.io"], vec!["widgets".to_string()]);
/// assert_eq!(resources.namespaced["alpha.io"], vec!["gadgets".to_string()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResourceAggregator {
    cluster: BTreeMap<String, BTreeSet<String>>,
    namespaced: BTreeMap<String, BTreeSet<String>>,
}

impl ResourceAggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single record under its scope and group.
    pub fn add(&mut self, record: ResourceRecord) {
        let target = match record.scope {
            Scope::Cluster => &mut self.cluster,
            Scope::Namespaced => &mut self.namespaced,
        };
        target.entry(record.group).or_default().insert(record.plural);
    }

    /// Add multiple records.
    pub fn add_all<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = ResourceRecord>,
    {
        for record in records {
            self.add(record);
        }
    }

    /// Flatten into sorted, deduplicated name lists.
    pub fn finish(self) -> AggregatedResources {
        AggregatedResources {
            cluster: flatten(self.cluster),
            namespaced: flatten(self.namespaced),
        }
    }
}

impl FromIterator<ResourceRecord> for ResourceAggregator {
    fn from_iter<T: IntoIterator<Item = ResourceRecord>>(iter: T) -> Self {
        let mut agg = ResourceAggregator::new();
        agg.add_all(iter);
        agg
    }
}

fn flatten(groups: BTreeMap<String, BTreeSet<String>>) -> BTreeMap<String, Vec<String>> {
    groups
        .into_iter()
        .map(|(group, names)| (group, names.into_iter().collect()))
        .collect()
}

/// Resources of one module split by scope.
///
/// Group keys iterate in lexicographic order and every name list is sorted
/// and free of duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedResources {
    /// Cluster-scoped resources, eligible for `manage` roles.
    pub cluster: BTreeMap<String, Vec<String>>,
    /// Namespaced resources, eligible for `use` roles.
    pub namespaced: BTreeMap<String, Vec<String>>,
}

impl AggregatedResources {
    /// Aggregate a set of records.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = ResourceRecord>,
    {
        records.into_iter().collect::<ResourceAggregator>().finish()
    }

    /// Resources of the given scope.
    pub fn scope(&self, scope: Scope) -> &BTreeMap<String, Vec<String>> {
        match scope {
            Scope::Cluster => &self.cluster,
            Scope::Namespaced => &self.namespaced,
        }
    }

    /// Check if no resource of any scope was accepted.
    pub fn is_empty(&self) -> bool {
        self.cluster.is_empty() && self.namespaced.is_empty()
    }
}
