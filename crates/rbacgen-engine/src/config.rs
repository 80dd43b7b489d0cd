//! Generator configuration.
//!
//! Carries every platform constant the discovery, classification and naming
//! steps depend on. Defaults match the Deckhouse module layout; a few values
//! can be overridden from environment variables.

use serde::{Deserialize, Serialize};

use rbacgen_rbac::RoleScheme;

/// Configuration of a generator run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Naming and labelling scheme of generated roles.
    pub scheme: RoleScheme,

    /// Group whose resources every module may be granted.
    pub reserved_group: String,

    /// File name marking a module directory.
    pub descriptor_file: String,

    /// Policy file name next to the descriptor.
    pub policy_file: String,

    /// Directory names never descended into while locating modules.
    pub skipped_dirs: Vec<String>,

    /// Role output directory, relative to each module directory.
    pub templates_path: String,

    /// File name prefix of documentation example manifests, which are never classified.
    pub doc_manifest_prefix: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let scheme = RoleScheme::default();
        Self {
            reserved_group: scheme.config_group.clone(),
            scheme,
            descriptor_file: "module.yaml".to_string(),
            policy_file: "rbac.yaml".to_string(),
            skipped_dirs: ["internal", "crds", "testdata", "docs", ".github"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            templates_path: "templates/rbacv2".to_string(),
            doc_manifest_prefix: "doc-".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `RBACGEN_DESCRIPTOR_FILE`: module descriptor file name (default: module.yaml)
    /// - `RBACGEN_POLICY_FILE`: module policy file name (default: rbac.yaml)
    /// - `RBACGEN_TEMPLATES_PATH`: role output directory (default: templates/rbacv2)
    /// - `RBACGEN_SKIPPED_DIRS`: comma-separated directory names to skip
    /// - `RBACGEN_OWNER_MODULE`: module exempt from the moduleconfig rule (default: deckhouse)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();

        Self {
            descriptor_file: lookup("RBACGEN_DESCRIPTOR_FILE").unwrap_or(default.descriptor_file),
            policy_file: lookup("RBACGEN_POLICY_FILE").unwrap_or(default.policy_file),
            templates_path: lookup("RBACGEN_TEMPLATES_PATH").unwrap_or(default.templates_path),
            skipped_dirs: lookup("RBACGEN_SKIPPED_DIRS")
                .map(|s| {
                    s.split(',')
                        .map(str::trim)
                        .filter(|d| !d.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or(default.skipped_dirs),
            scheme: RoleScheme {
                owner_module: lookup("RBACGEN_OWNER_MODULE").unwrap_or(default.scheme.owner_module),
                ..default.scheme
            },
            reserved_group: default.reserved_group,
            doc_manifest_prefix: default.doc_manifest_prefix,
        }
    }

    /// Set the owner module.
    pub fn with_owner_module(mut self, module: impl Into<String>) -> Self {
        self.scheme.owner_module = module.into();
        self
    }

    /// Check if a directory name is skipped during discovery.
    pub fn is_skipped_dir(&self, name: &str) -> bool {
        self.skipped_dirs.iter().any(|d| d == name)
    }

    /// Check if a manifest file name is a documentation example.
    pub fn is_doc_manifest(&self, file_name: &str) -> bool {
        !self.doc_manifest_prefix.is_empty() && file_name.starts_with(&self.doc_manifest_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = GeneratorConfig::default();
        assert_eq!(config.reserved_group, "deckhouse.io");
        assert_eq!(config.scheme.owner_module, "deckhouse");
        assert_eq!(config.descriptor_file, "module.yaml");
        assert_eq!(config.policy_file, "rbac.yaml");
        assert_eq!(config.templates_path, "templates/rbacv2");
        assert!(config.is_skipped_dir("crds"));
        assert!(config.is_skipped_dir(".github"));
        assert!(!config.is_skipped_dir("modules"));
    }

    #[test]
    fn test_from_lookup_overrides() {
        let vars: HashMap<&str, &str> = [
            ("RBACGEN_POLICY_FILE", "policy.yaml"),
            ("RBACGEN_SKIPPED_DIRS", "vendor, ,hack"),
            ("RBACGEN_OWNER_MODULE", "core"),
        ]
        .into_iter()
        .collect();

        let config = GeneratorConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.policy_file, "policy.yaml");
        assert_eq!(config.descriptor_file, "module.yaml");
        assert_eq!(config.skipped_dirs, vec!["vendor", "hack"]);
        assert_eq!(config.scheme.owner_module, "core");
        assert_eq!(config.scheme.prefix, "d8");
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = GeneratorConfig::from_lookup(|_| None);
        assert_eq!(config, GeneratorConfig::default());
    }

    #[test]
    fn test_doc_manifest_detection() {
        let config = GeneratorConfig::default();
        assert!(config.is_doc_manifest("doc-ru-widgets.yaml"));
        assert!(!config.is_doc_manifest("widgets.yaml"));
        assert!(!config.is_doc_manifest("widgets-doc-.yaml"));
    }
}
