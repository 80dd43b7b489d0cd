//! # rbacgen module model
//!
//! Declarative inputs of the generator: what a module is, and which resource
//! types it may be granted roles for.
//!
//! ## Files
//!
//! ```text
//! <module>/module.yaml    name, subsystems, namespace
//! <module>/rbac.yaml      crds, allowedResources, forbiddenResources
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use rbacgen_module::{ModuleDescriptor, PolicySpec};
//!
//! let module = ModuleDescriptor::from_yaml("name: alpha\nsubsystems: [observability]\n").unwrap();
//! let spec = PolicySpec::from_yaml("allowedResources:\n  - group: alpha.io\n    resources: [all]\n").unwrap();
//!
//! assert_eq!(module.namespace(), Some("d8-alpha"));
//! assert!(spec.policy.allows("deckhouse.io", "alpha.io", "widgets"));
//! ```

pub mod descriptor;
pub mod error;
pub mod policy;

// Re-export main types for convenience
pub use descriptor::{resolve_namespace, ModuleDescriptor};
pub use error::{ModuleError, ModuleResult};
pub use policy::{Admission, AllowedResource, ModulePolicy, PolicySpec};
