//! Capability documentation index
//!
//! Records, per module, the name and rules of every role written for it, and
//! per subsystem, its modules and their namespaces.
//!
//! Summaries are copied from the synthesized roles, never recomputed, so the
//! index always matches the role files.
//!
//! ```text
//! modules:
//!   <module>:
//!     capabilities: {manage: [{name, rules}], use: [{name, rules}]}
//!     namespace: <ns>
//!     subsystems: [...]
//! subsystems:
//!   <subsystem>:
//!     modules: [...]        processing order
//!     namespaces: [...]     sorted, deduplicated
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{info, warn};

use rbacgen_module::ModuleDescriptor;
use rbacgen_rbac::{ModuleRoles, Role, Rule};

use crate::error::{GenError, GenResult};

/// Name and rules of one emitted role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSummary {
    /// Role name
    pub name: String,
    /// Role rules, in emission order
    pub rules: Vec<Rule>,
}

impl From<&Role> for RoleSummary {
    fn from(role: &Role) -> Self {
        Self {
            name: role.name().to_string(),
            rules: role.rules.clone(),
        }
    }
}

/// Roles of a module grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Manage roles
    pub manage: Vec<RoleSummary>,
    /// Use roles
    #[serde(rename = "use")]
    pub use_roles: Vec<RoleSummary>,
}

/// Documentation of one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleCapabilityDoc {
    /// Emitted roles
    pub capabilities: Capabilities,
    /// Associated namespace, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Subsystems, in declaration order
    pub subsystems: Vec<String>,
}

/// Documentation of one subsystem.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsystemDoc {
    /// Member modules, in processing order
    pub modules: Vec<String>,
    /// Namespaces of member modules, sorted
    pub namespaces: Vec<String>,
}

#[derive(Debug, Clone, Default)]
struct SubsystemEntry {
    modules: Vec<String>,
    namespaces: BTreeSet<String>,
}

/// Accumulates documentation while modules are processed.
///
/// # Example
///
/// ```
/// use rbacgen_engine::docs::CapabilityIndex;
/// use rbacgen_module::ModuleDescriptor;
/// use rbacgen_rbac::{AggregatedResources, RoleScheme, RoleSubject};
///
/// let module = ModuleDescriptor::new("alpha", vec!["network".to_string()], None);
/// let subject = RoleSubject {
///     module: &module.name,
///     subsystems: &module.subsystems,
///     namespace: module.namespace(),
/// };
/// let roles = RoleScheme::default().synthesize(&subject, &AggregatedResources::default());
///
/// let mut index = CapabilityIndex::new();
/// index.record(&module, &roles);
/// let doc = index.finish();
///
/// assert_eq!(doc.subsystems["network"].modules, vec!["alpha".to_string()]);
/// assert_eq!(doc.subsystems["network"].namespaces, vec!["d8-alpha".to_string()]);
/// assert_eq!(doc.modules["alpha"].capabilities.manage.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CapabilityIndex {
    modules: BTreeMap<String, ModuleCapabilityDoc>,
    subsystems: BTreeMap<String, SubsystemEntry>,
}

impl CapabilityIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the roles emitted for `module`.
    pub fn record(&mut self, module: &ModuleDescriptor, roles: &ModuleRoles) {
        let doc = ModuleCapabilityDoc {
            capabilities: Capabilities {
                manage: roles.manage.iter().map(RoleSummary::from).collect(),
                use_roles: roles.use_roles.iter().map(RoleSummary::from).collect(),
            },
            namespace: module.namespace.clone(),
            subsystems: module.subsystems.clone(),
        };
        if self.modules.insert(module.name.clone(), doc).is_some() {
            warn!(module = module.name.as_str(), "module recorded twice, keeping the last one");
        }

        for subsystem in &module.subsystems {
            let entry = self.subsystems.entry(subsystem.clone()).or_default();
            entry.modules.push(module.name.clone());
            if let Some(namespace) = module.namespace() {
                entry.namespaces.insert(namespace.to_string());
            }
        }
    }

    /// Number of recorded modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Check if no module was recorded.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Finalize into the serializable document.
    pub fn finish(self) -> CapabilityDoc {
        CapabilityDoc {
            modules: self.modules,
            subsystems: self
                .subsystems
                .into_iter()
                .map(|(name, entry)| {
                    let doc = SubsystemDoc {
                        modules: entry.modules,
                        namespaces: entry.namespaces.into_iter().collect(),
                    };
                    (name, doc)
                })
                .collect(),
        }
    }
}

/// Output format of the documentation file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocFormat {
    /// YAML document
    Yaml,
    /// Pretty-printed JSON document
    Json,
}

impl DocFormat {
    /// Pick the format from the file extension; anything but `.json` is YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => DocFormat::Json,
            _ => DocFormat::Yaml,
        }
    }
}

/// The finished documentation index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityDoc {
    /// Modules by name
    pub modules: BTreeMap<String, ModuleCapabilityDoc>,
    /// Subsystems by name
    pub subsystems: BTreeMap<String, SubsystemDoc>,
}

impl CapabilityDoc {
    /// Encode the document.
    pub fn encode(&self, format: DocFormat) -> GenResult<String> {
        let encoded = match format {
            DocFormat::Yaml => serde_yaml::to_string(self).map_err(|e| e.to_string()),
            DocFormat::Json => serde_json::to_string_pretty(self)
                .map(|mut s| {
                    s.push('\n');
                    s
                })
                .map_err(|e| e.to_string()),
        };
        encoded.map_err(|message| GenError::Encode {
            what: "documentation".to_string(),
            message,
        })
    }

    /// Write the document to `path`, replacing any previous content.
    pub fn write_to(&self, path: &Path) -> GenResult<()> {
        let encoded = self.encode(DocFormat::from_path(path))?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| GenError::io(dir, e))?;
        }
        info!(path = %path.display(), "writing docs");
        std::fs::write(path, encoded).map_err(|e| GenError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rbacgen_rbac::{AggregatedResources, ResourceRecord, RoleScheme, RoleSubject, Scope};

    fn roles_for(module: &ModuleDescriptor, resources: &AggregatedResources) -> ModuleRoles {
        let subject = RoleSubject {
            module: &module.name,
            subsystems: &module.subsystems,
            namespace: module.namespace(),
        };
        RoleScheme::default().synthesize(&subject, resources)
    }

    fn module(name: &str, subsystems: &[&str], namespace: Option<&str>) -> ModuleDescriptor {
        ModuleDescriptor::new(name, subsystems.iter().map(|s| s.to_string()).collect(), namespace)
    }

    #[test]
    fn test_summaries_mirror_roles() {
        let alpha = module("alpha", &["network"], None);
        let resources = AggregatedResources::from_records(vec![
            ResourceRecord::new("alpha.io", "widgets", Scope::Cluster),
            ResourceRecord::new("alpha.io", "gadgets", Scope::Namespaced),
        ]);
        let roles = roles_for(&alpha, &resources);

        let mut index = CapabilityIndex::new();
        index.record(&alpha, &roles);
        let doc = index.finish();

        let caps = &doc.modules["alpha"].capabilities;
        assert_eq!(caps.manage.len(), 2);
        assert_eq!(caps.use_roles.len(), 2);
        for (summary, role) in caps.manage.iter().chain(&caps.use_roles).zip(roles.iter()) {
            assert_eq!(summary.name, role.name());
            assert_eq!(summary.rules, role.rules);
        }
    }

    #[test]
    fn test_subsystem_namespace_union() {
        let mut index = CapabilityIndex::new();
        for m in [
            module("zeta", &["network"], Some("d8-shared")),
            module("alpha", &["network", "security"], None),
            module("beta", &["network"], Some("none")),
            module("gamma", &["network"], Some("d8-shared")),
        ] {
            let roles = roles_for(&m, &AggregatedResources::default());
            index.record(&m, &roles);
        }
        let doc = index.finish();

        let network = &doc.subsystems["network"];
        assert_eq!(network.modules, vec!["zeta", "alpha", "beta", "gamma"]);
        assert_eq!(network.namespaces, vec!["d8-alpha", "d8-shared"]);

        let security = &doc.subsystems["security"];
        assert_eq!(security.modules, vec!["alpha"]);
        assert_eq!(security.namespaces, vec!["d8-alpha"]);
        assert_eq!(doc.modules["beta"].namespace, None);
    }

    #[test]
    fn test_yaml_omits_missing_namespace() {
        let beta = module("beta", &["network"], Some("none"));
        let mut index = CapabilityIndex::new();
        index.record(&beta, &roles_for(&beta, &AggregatedResources::default()));
        let yaml = index.finish().encode(DocFormat::Yaml).unwrap();

        assert!(!yaml.contains("namespace:"));
        assert!(yaml.contains("namespaces: []"));
        assert!(yaml.contains("use: []"));
        assert!(yaml.starts_with("modules:\n"));
    }

    #[test]
    fn test_doc_format_from_path() {
        assert_eq!(DocFormat::from_path(Path::new("docs.yaml")), DocFormat::Yaml);
        assert_eq!(DocFormat::from_path(Path::new("docs.JSON")), DocFormat::Json);
        assert_eq!(DocFormat::from_path(Path::new("docs")), DocFormat::Yaml);
    }

    #[test]
    fn test_write_to_json_round_trips() {
        let alpha = module("alpha", &["network"], None);
        let mut index = CapabilityIndex::new();
        index.record(&alpha, &roles_for(&alpha, &AggregatedResources::default()));
        let doc = index.finish();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/docs.json");
        doc.write_to(&path).unwrap();

        let parsed: CapabilityDoc = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, doc);
    }
}
