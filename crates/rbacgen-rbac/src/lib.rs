//! # rbacgen RBAC model
//!
//! This crate holds the role vocabulary of the generator and the pure
//! synthesis step that turns a module's resource types into cluster roles.
//!
//! ## Overview
//!
//! - **Verbs**: `view` (`get`, `list`, `watch`) and `edit` (`create`,
//!   `update`, `patch`, `delete`, `deletecollection`)
//! - **Resources**: scope-tagged resource records and their aggregation
//! - **Rules**: verbs over the resources of one API group
//! - **Roles**: named, labelled cluster roles
//! - **Synthesis**: resources of a module to its `manage` and `use` roles
//!
//! ## Naming
//!
//! ```text
//! <prefix>:manage:permission:module:<module>:<view|edit>
//! <prefix>:use:capability:module:<module>:<view|edit>
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use rbacgen_rbac::{AggregatedResources, ResourceRecord, RoleScheme, RoleSubject, Scope};
//!
//! let resources = AggregatedResources::from_records(vec![
//!     ResourceRecord::new("alpha.io", "widgets", Scope::Cluster),
//!     ResourceRecord::new("alpha.io", "gadgets", Scope::Namespaced),
//! ]);
//!
//! let subject = RoleSubject { module: "alpha", subsystems: &[], namespace: Some("d8-alpha") };
//! let roles = RoleScheme::default().synthesize(&subject, &resources);
//!
//! assert_eq!(roles.manage.len(), 2);
//! assert_eq!(roles.use_roles.len(), 2);
//! assert_eq!(roles.manage[1].name(), "d8:manage:permission:module:alpha:edit");
//! ```

pub mod resources;
pub mod roles;
pub mod rules;
pub mod synth;
pub mod verbs;

// Re-export main types for convenience
pub use resources::{AggregatedResources, ResourceAggregator, ResourceRecord, Scope};
pub use roles::{Role, RoleKind, RoleMeta, RoleName, RoleTier};
pub use rules::Rule;
pub use synth::{ModuleRoles, RoleScheme, RoleSubject};
pub use verbs::{Verb, VerbClass};
