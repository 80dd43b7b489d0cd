//! Module resource policy
//!
//! The policy decides which discovered resource types a module gets roles
//! for. It is plain data: an ordered allow list and a flat deny list.
//!
//! # Evaluation order
//!
//! 1. A forbidden resource name is rejected, whatever its group.
//! 2. A resource in the platform's reserved group is accepted.
//! 3. A resource matched by an allow entry is accepted.
//! 4. Everything else is rejected.

use serde::{Deserialize, Serialize};

use crate::error::{ModuleError, ModuleResult};

/// Wildcard accepting every resource of an allowed group.
pub const ALL_RESOURCES: &str = "all";

/// One allow-list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedResource {
    /// API group the entry applies to
    pub group: String,

    /// Plural resource names, or `["all"]`
    #[serde(default)]
    pub resources: Vec<String>,
}

impl AllowedResource {
    /// Allow the listed resources of `group`.
    pub fn new<I, S>(group: impl Into<String>, resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            group: group.into(),
            resources: resources.into_iter().map(Into::into).collect(),
        }
    }

    /// Allow every resource of `group`.
    pub fn all(group: impl Into<String>) -> Self {
        Self::new(group, [ALL_RESOURCES])
    }

    /// Check if the entry is the `["all"]` wildcard.
    pub fn is_wildcard(&self) -> bool {
        self.resources.len() == 1 && self.resources[0] == ALL_RESOURCES
    }

    /// Check if the entry allows `resource` of `group`.
    pub fn matches(&self, group: &str, resource: &str) -> bool {
        self.group == group && (self.is_wildcard() || self.resources.iter().any(|r| r == resource))
    }
}

/// Outcome of evaluating a policy for one resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Accepted: the resource belongs to the reserved group.
    Reserved,
    /// Accepted: an allow entry matched.
    Allowed,
    /// Rejected: the resource name is forbidden.
    Forbidden,
    /// Rejected: nothing allowed the resource.
    NotAllowed,
}

impl Admission {
    /// Check if the resource is accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Admission::Reserved | Admission::Allowed)
    }
}

/// Policy file as written on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PolicyFile {
    #[serde(default)]
    crds: Vec<String>,

    #[serde(default)]
    allowed_resources: Vec<AllowedResource>,

    #[serde(default)]
    forbidden_resources: Vec<String>,
}

/// Allow/deny policy of a module.
///
/// # Examples
///
/// ```
/// use rbacgen_module::{AllowedResource, ModulePolicy};
///
/// let policy = ModulePolicy::new(vec![AllowedResource::all("alpha.io")], vec!["gadgets".to_string()]);
///
/// assert!(policy.allows("deckhouse.io", "alpha.io", "widgets"));
/// assert!(!policy.allows("deckhouse.io", "alpha.io", "gadgets"));
/// assert!(policy.allows("deckhouse.io", "deckhouse.io", "moduleconfigs"));
/// assert!(!policy.allows("deckhouse.io", "beta.io", "widgets"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulePolicy {
    /// Allow list, in declaration order
    pub allowed: Vec<AllowedResource>,

    /// Forbidden plural resource names, in any group
    pub forbidden: Vec<String>,
}

impl ModulePolicy {
    /// Create a policy.
    pub fn new(allowed: Vec<AllowedResource>, forbidden: Vec<String>) -> Self {
        Self { allowed, forbidden }
    }

    /// Evaluate the policy for `resource` of `group`.
    ///
    /// # Arguments
    ///
    /// * `reserved_group` - Group whose resources every module may use
    /// * `group` - API group of the resource
    /// * `resource` - Plural resource name
    pub fn evaluate(&self, reserved_group: &str, group: &str, resource: &str) -> Admission {
        if self.forbidden.iter().any(|f| f == resource) {
            return Admission::Forbidden;
        }

        if group == reserved_group {
            return Admission::Reserved;
        }

        if self.allowed.iter().any(|a| a.matches(group, resource)) {
            return Admission::Allowed;
        }

        Admission::NotAllowed
    }

    /// Check if `resource` of `group` is accepted.
    pub fn allows(&self, reserved_group: &str, group: &str, resource: &str) -> bool {
        self.evaluate(reserved_group, group, resource).is_accepted()
    }
}

/// Decoded policy file: the policy plus the manifest globs it applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicySpec {
    /// Glob patterns of resource manifests, relative to the scanned root
    pub crds: Vec<String>,

    /// Allow/deny policy
    pub policy: ModulePolicy,
}

impl PolicySpec {
    /// Decode a policy file from YAML.
    pub fn from_yaml(raw: &str) -> ModuleResult<Self> {
        let file: PolicyFile = serde_yaml::from_str(raw).map_err(ModuleError::InvalidPolicy)?;
        Ok(Self {
            crds: file.crds,
            policy: ModulePolicy::new(file.allowed_resources, file.forbidden_resources),
        })
    }
}
