//! # Roles
//!
//! Generated cluster roles, their kinds and tiers, and the naming convention
//! that ties a role name to the file it is written to.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::rules::Rule;
use crate::verbs::VerbClass;

/// API version of emitted role objects.
pub const ROLE_API_VERSION: &str = "rbac.authorization.k8s.io/v1";

/// Kind of emitted role objects.
pub const ROLE_OBJECT_KIND: &str = "ClusterRole";

/// Kind of a generated role.
///
/// - **Manage**: operators of a module, over its cluster-scoped resources
///   and its own module configuration
/// - **Use**: consumers of a module, over its namespaced resources
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RoleKind {
    /// Permission to manage the module.
    Manage,
    /// Capability to use the module.
    Use,
}

impl RoleKind {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleKind::Manage => "manage",
            RoleKind::Use => "use",
        }
    }

    /// Parse a role kind from its string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "manage" => Some(RoleKind::Manage),
            "use" => Some(RoleKind::Use),
            _ => None,
        }
    }

    /// Name segment following the kind in a role name.
    pub fn category(&self) -> &'static str {
        match self {
            RoleKind::Manage => "permission",
            RoleKind::Use => "capability",
        }
    }
}

/// Tier a role aggregates into.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RoleTier {
    /// Aggregates into viewer roles.
    Viewer,
    /// Aggregates into manager roles.
    Manager,
}

impl RoleTier {
    /// Get the string representation used as a label value.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleTier::Viewer => "viewer",
            RoleTier::Manager => "manager",
        }
    }
}

impl From<VerbClass> for RoleTier {
    fn from(class: VerbClass) -> Self {
        match class {
            VerbClass::View => RoleTier::Viewer,
            VerbClass::Edit => RoleTier::Manager,
        }
    }
}

/// Structured role name: `<prefix>:<kind>:<category>:module:<module>:<class>`.
///
/// # Example
///
/// ```
/// use rbacgen_rbac::roles::{RoleKind, RoleName};
/// use rbacgen_rbac::verbs::VerbClass;
///
/// let name = RoleName::new("d8", RoleKind::Manage, "alpha", VerbClass::Edit);
/// assert_eq!(name.to_string(), "d8:manage:permission:module:alpha:edit");
///
/// let parsed = RoleName::parse("d8:use:capability:module:alpha:view").unwrap();
/// assert_eq!(parsed.kind, RoleKind::Use);
/// assert_eq!(parsed.class, VerbClass::View);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoleName {
    /// Platform prefix (e.g. `d8`).
    pub prefix: String,
    /// Role kind.
    pub kind: RoleKind,
    /// Module the role belongs to.
    pub module: String,
    /// Verb class of the role.
    pub class: VerbClass,
}

impl RoleName {
    /// Create a new role name.
    pub fn new(
        prefix: impl Into<String>,
        kind: RoleKind,
        module: impl Into<String>,
        class: VerbClass,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            kind,
            module: module.into(),
            class,
        }
    }

    /// Parse a role name produced by [`RoleName`]'s `Display`.
    ///
    /// Returns `None` when the name does not follow the convention, including
    /// when the category segment does not belong to the kind.
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 6 || parts[3] != "module" {
            return None;
        }

        let kind = RoleKind::parse(parts[1])?;
        if parts[2] != kind.category() {
            return None;
        }
        let class = VerbClass::parse(parts[5])?;
        if parts[0].is_empty() || parts[4].is_empty() {
            return None;
        }

        Some(Self::new(parts[0], kind, parts[4], class))
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:module:{}:{}",
            self.prefix,
            self.kind.as_str(),
            self.kind.category(),
            self.module,
            self.class.as_str()
        )
    }
}

/// Object metadata of a generated role.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleMeta {
    /// Labels, in lexicographic key order.
    pub labels: BTreeMap<String, String>,
    /// Role name.
    pub name: String,
}

/// A generated cluster role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Always [`ROLE_API_VERSION`].
    pub api_version: String,
    /// Always [`ROLE_OBJECT_KIND`].
    pub kind: String,
    /// Name and labels.
    pub metadata: RoleMeta,
    /// Rules in emission order.
    pub rules: Vec<Rule>,
}

impl Role {
    /// Create a cluster role with the given name, labels and rules.
    pub fn new(name: &RoleName, labels: BTreeMap<String, String>, rules: Vec<Rule>) -> Self {
        Self {
            api_version: ROLE_API_VERSION.to_string(),
            kind: ROLE_OBJECT_KIND.to_string(),
            metadata: RoleMeta {
                labels,
                name: name.to_string(),
            },
            rules,
        }
    }

    /// The role name.
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Parse the structured name of this role.
    pub fn role_name(&self) -> Option<RoleName> {
        RoleName::parse(&self.metadata.name)
    }

    /// Get a label value.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.metadata.labels.get(key).map(String::as_str)
    }
}
