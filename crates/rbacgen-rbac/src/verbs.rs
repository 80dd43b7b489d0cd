//! # Verbs
//!
//! Kubernetes API verbs granted by generated roles, and the two verb classes
//! (`view` and `edit`) every generated role belongs to.

use serde::{Deserialize, Serialize};

/// Verbs that can appear in a generated rule.
///
/// Only the verbs used by the generator are modelled:
/// - **Get**, **List**, **Watch**: read access
/// - **Create**, **Update**, **Patch**, **Delete**, **DeleteCollection**: write access
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    /// Read a single object.
    Get,
    /// List objects of a resource.
    List,
    /// Watch a resource for changes.
    Watch,
    /// Create new objects.
    Create,
    /// Replace existing objects.
    Update,
    /// Partially modify existing objects.
    Patch,
    /// Delete a single object.
    Delete,
    /// Delete every object matched by a selector.
    DeleteCollection,
}

impl Verb {
    /// Get the string representation used in rules.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::List => "list",
            Verb::Watch => "watch",
            Verb::Create => "create",
            Verb::Update => "update",
            Verb::Patch => "patch",
            Verb::Delete => "delete",
            Verb::DeleteCollection => "deletecollection",
        }
    }

    /// Parse a verb from its rule representation.
    ///
    /// # Example
    ///
    /// ```
    /// use rbacgen_rbac::verbs::Verb;
    ///
    /// assert_eq!(Verb::parse("watch"), Some(Verb::Watch));
    /// assert_eq!(Verb::parse("deletecollection"), Some(Verb::DeleteCollection));
    /// assert_eq!(Verb::parse("escalate"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "get" => Some(Verb::Get),
            "list" => Some(Verb::List),
            "watch" => Some(Verb::Watch),
            "create" => Some(Verb::Create),
            "update" => Some(Verb::Update),
            "patch" => Some(Verb::Patch),
            "delete" => Some(Verb::Delete),
            "deletecollection" => Some(Verb::DeleteCollection),
            _ => None,
        }
    }

    /// Check if this is a read-only verb.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Verb::Get | Verb::List | Verb::Watch)
    }

    /// Check if this verb removes more than one object at a time.
    pub fn is_bulk(&self) -> bool {
        matches!(self, Verb::DeleteCollection)
    }
}

/// Verbs granted by every `view` rule.
pub const VIEW_VERBS: [Verb; 3] = [Verb::Get, Verb::List, Verb::Watch];

/// Verbs granted by every `edit` rule.
pub const EDIT_VERBS: [Verb; 5] = [
    Verb::Create,
    Verb::Update,
    Verb::Patch,
    Verb::Delete,
    Verb::DeleteCollection,
];

/// Verbs a module gets over its own module configuration.
///
/// Same as [`EDIT_VERBS`] without `deletecollection`, so a module operator
/// can never bulk-delete module configurations.
pub const SELF_CONFIG_EDIT_VERBS: [Verb; 4] =
    [Verb::Create, Verb::Update, Verb::Patch, Verb::Delete];

/// Permission tier of a generated role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VerbClass {
    /// Read-only access.
    View,
    /// Mutating access.
    Edit,
}

impl VerbClass {
    /// Get the string representation (the last segment of a role name).
    pub fn as_str(&self) -> &'static str {
        match self {
            VerbClass::View => "view",
            VerbClass::Edit => "edit",
        }
    }

    /// Parse a verb class from its string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "view" => Some(VerbClass::View),
            "edit" => Some(VerbClass::Edit),
            _ => None,
        }
    }

    /// Verbs granted by a rule of this class.
    pub fn verbs(&self) -> &'static [Verb] {
        match self {
            VerbClass::View => &VIEW_VERBS,
            VerbClass::Edit => &EDIT_VERBS,
        }
    }

    /// Both classes, view first.
    pub fn all() -> [Self; 2] {
        [VerbClass::View, VerbClass::Edit]
    }
}
