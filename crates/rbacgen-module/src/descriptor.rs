//! Module descriptors
//!
//! A descriptor names a module, the subsystems it belongs to, and the
//! namespace it runs in.

use serde::{Deserialize, Serialize};

use crate::error::{ModuleError, ModuleResult};

/// Prefix of the namespace derived for modules that do not declare one.
pub const DEFAULT_NAMESPACE_PREFIX: &str = "d8-";

/// Namespace values meaning "no namespace association".
const NO_NAMESPACE: [&str; 2] = ["", "none"];

/// Descriptor file as written on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DescriptorFile {
    #[serde(default)]
    name: String,

    #[serde(default)]
    subsystems: Vec<String>,

    #[serde(default)]
    namespace: Option<String>,
}

/// A module with its resolved namespace.
///
/// # Examples
///
/// ```
/// use rbacgen_module::ModuleDescriptor;
///
/// let module = ModuleDescriptor::from_yaml("name: alpha\nsubsystems: [observability]\n").unwrap();
/// assert_eq!(module.namespace.as_deref(), Some("d8-alpha"));
///
/// let module = ModuleDescriptor::from_yaml("name: beta\nnamespace: none\n").unwrap();
/// assert_eq!(module.namespace, None);
/// assert!(!module.has_subsystems());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Unique module name
    pub name: String,

    /// Subsystems the module belongs to, in declaration order
    pub subsystems: Vec<String>,

    /// Namespace the module is associated with, if any
    pub namespace: Option<String>,
}

impl ModuleDescriptor {
    /// Create a descriptor, resolving the namespace.
    ///
    /// # Arguments
    ///
    /// * `name` - Module name
    /// * `subsystems` - Subsystems the module belongs to
    /// * `namespace` - Declared namespace; `None` derives `d8-<name>`,
    ///   `""` and `"none"` mean no namespace
    pub fn new(name: impl Into<String>, subsystems: Vec<String>, namespace: Option<&str>) -> Self {
        let name = name.into();
        let namespace = resolve_namespace(&name, namespace);
        Self {
            name,
            subsystems,
            namespace,
        }
    }

    /// Decode a descriptor from YAML.
    pub fn from_yaml(raw: &str) -> ModuleResult<Self> {
        let file: DescriptorFile = serde_yaml::from_str(raw).map_err(ModuleError::InvalidDescriptor)?;
        if file.name.trim().is_empty() {
            return Err(ModuleError::EmptyName);
        }
        Ok(Self::new(file.name, file.subsystems, file.namespace.as_deref()))
    }

    /// Check if the module belongs to at least one subsystem.
    ///
    /// Modules outside every subsystem get no generated roles.
    pub fn has_subsystems(&self) -> bool {
        !self.subsystems.is_empty()
    }

    /// The namespace as a string slice.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}

/// Resolve a declared namespace into an explicit optional value.
pub fn resolve_namespace(module: &str, declared: Option<&str>) -> Option<String> {
    match declared {
        None => Some(format!("{}{}", DEFAULT_NAMESPACE_PREFIX, module)),
        Some(ns) if NO_NAMESPACE.contains(&ns.trim()) => None,
        Some(ns) => Some(ns.trim().to_string()),
    }
}
