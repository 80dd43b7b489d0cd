//! # Rules
//!
//! A rule grants a set of verbs on resources of one API group, optionally
//! narrowed to named objects.

use serde::{Deserialize, Serialize};

use crate::verbs::{Verb, VerbClass};

/// A single policy rule of a cluster role.
///
/// Fields serialize in lexicographic key order so generated files are stable.
///
/// # Example
///
/// ```
/// use rbacgen_rbac::rules::Rule;
/// use rbacgen_rbac::verbs::{Verb, VerbClass};
///
/// let rule = Rule::for_class("alpha.io", vec!["widgets".to_string()], VerbClass::View);
/// assert_eq!(rule.verbs, vec![Verb::Get, Verb::List, Verb::Watch]);
/// assert!(rule.resource_names.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// API groups the rule applies to. Generated rules always carry one.
    pub api_groups: Vec<String>,
    /// Names of the objects the rule is restricted to.
    /// Empty means every object of the listed resources.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resource_names: Vec<String>,
    /// Plural resource names.
    pub resources: Vec<String>,
    /// Granted verbs.
    pub verbs: Vec<Verb>,
}

impl Rule {
    /// Create a rule over every object of `resources` in `group`.
    pub fn new(group: impl Into<String>, resources: Vec<String>, verbs: &[Verb]) -> Self {
        Self {
            api_groups: vec![group.into()],
            resource_names: Vec::new(),
            resources,
            verbs: verbs.to_vec(),
        }
    }

    /// Create a rule granting the verbs of `class`.
    pub fn for_class(group: impl Into<String>, resources: Vec<String>, class: VerbClass) -> Self {
        Self::new(group, resources, class.verbs())
    }

    /// Restrict the rule to the named objects.
    pub fn with_resource_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resource_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Check if the rule grants `verb`.
    pub fn grants(&self, verb: Verb) -> bool {
        self.verbs.contains(&verb)
    }

    /// Check if the rule mentions `resource` in any of its groups.
    pub fn covers(&self, resource: &str) -> bool {
        self.resources.iter().any(|r| r == resource)
    }

    /// Check if the rule is restricted to named objects.
    pub fn is_specific(&self) -> bool {
        !self.resource_names.is_empty()
    }
}
