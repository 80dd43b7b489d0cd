//! Resource classification
//!
//! Decodes custom resource definition manifests and keeps the resource types
//! a module's policy accepts.
//!
//! # Document handling
//!
//! - Empty documents (separators, comment-only documents) are skipped.
//! - Any other document must be a `CustomResourceDefinition`; anything else
//!   fails the run.
//! - Files named like documentation examples are never read.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use rbacgen_module::{Admission, ModulePolicy};
use rbacgen_rbac::{ResourceRecord, Scope};

use crate::config::GeneratorConfig;
use crate::error::{GenError, GenResult};

/// Kind of accepted manifest documents.
pub const CRD_KIND: &str = "CustomResourceDefinition";

/// API versions of accepted manifest documents.
pub const CRD_API_VERSIONS: [&str; 2] = ["apiextensions.k8s.io/v1", "apiextensions.k8s.io/v1beta1"];

#[derive(Debug, Deserialize)]
struct CrdManifest {
    spec: CrdSpec,
}

#[derive(Debug, Deserialize)]
struct CrdSpec {
    group: String,
    scope: Scope,
    names: CrdNames,
}

#[derive(Debug, Deserialize)]
struct CrdNames {
    plural: String,
}

/// Decode every resource definition in a manifest stream.
///
/// # Arguments
///
/// * `path` - Source of the stream, used in errors
/// * `content` - Multi-document YAML
pub fn decode_manifests(path: &Path, content: &str) -> GenResult<Vec<ResourceRecord>> {
    let mut records = Vec::new();

    for document in serde_yaml::Deserializer::from_str(content) {
        let value = serde_yaml::Value::deserialize(document).map_err(|source| GenError::Manifest {
            path: path.to_path_buf(),
            source,
        })?;

        if is_empty_document(&value) {
            continue;
        }

        let api_version = string_field(&value, "apiVersion");
        let kind = string_field(&value, "kind");
        if kind != CRD_KIND || !CRD_API_VERSIONS.contains(&api_version) {
            return Err(GenError::NotACrd {
                path: path.to_path_buf(),
                api_version: api_version.to_string(),
                kind: kind.to_string(),
            });
        }

        let manifest: CrdManifest = serde_yaml::from_value(value).map_err(|source| GenError::Manifest {
            path: path.to_path_buf(),
            source,
        })?;
        records.push(ResourceRecord::new(
            manifest.spec.group,
            manifest.spec.names.plural,
            manifest.spec.scope,
        ));
    }

    Ok(records)
}

fn is_empty_document(value: &serde_yaml::Value) -> bool {
    match value {
        serde_yaml::Value::Null => true,
        serde_yaml::Value::Mapping(map) => map.is_empty(),
        _ => false,
    }
}

fn string_field<'a>(value: &'a serde_yaml::Value, key: &str) -> &'a str {
    value.get(key).and_then(serde_yaml::Value::as_str).unwrap_or_default()
}

/// Expand manifest glob patterns into a sorted, deduplicated file list.
pub fn expand_patterns(patterns: &[String]) -> GenResult<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let entries = glob::glob(pattern).map_err(|source| GenError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;
        for entry in entries {
            paths.push(entry?);
        }
    }
    paths.sort();
    paths.dedup();
    Ok(paths)
}

/// Classifies the resource definitions of one module.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    config: &'a GeneratorConfig,
    module: &'a str,
    policy: &'a ModulePolicy,
}

impl<'a> Classifier<'a> {
    /// Create a classifier for `module`.
    pub fn new(config: &'a GeneratorConfig, module: &'a str, policy: &'a ModulePolicy) -> Self {
        Self {
            config,
            module,
            policy,
        }
    }

    /// Check if the policy accepts `resource` of `group`, logging the decision.
    pub fn admit(&self, group: &str, resource: &str) -> bool {
        let admission = self.policy.evaluate(&self.config.reserved_group, group, resource);
        match admission {
            Admission::Forbidden => {
                debug!(module = self.module, "ignoring forbidden resource '{}/{}'", group, resource);
            }
            Admission::NotAllowed => {
                debug!(module = self.module, "ignoring the '{}/{}' resource", group, resource);
            }
            Admission::Reserved | Admission::Allowed => {
                debug!(module = self.module, "found the '{}/{}' resource", group, resource);
            }
        }
        admission.is_accepted()
    }

    /// Classify the documents of one manifest stream.
    pub fn classify_str(&self, path: &Path, content: &str) -> GenResult<Vec<ResourceRecord>> {
        Ok(decode_manifests(path, content)?
            .into_iter()
            .filter(|record| self.admit(&record.group, &record.plural))
            .collect())
    }

    /// Classify one manifest file. Documentation examples yield nothing.
    pub fn classify_file(&self, path: &Path) -> GenResult<Vec<ResourceRecord>> {
        let is_doc = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| self.config.is_doc_manifest(n))
            .unwrap_or(false);
        if is_doc {
            debug!(module = self.module, path = %path.display(), "skipping documentation manifest");
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
        self.classify_str(path, &content)
    }

    /// Classify every file matched by `patterns`.
    pub fn classify_patterns(&self, patterns: &[String]) -> GenResult<Vec<ResourceRecord>> {
        let mut records = Vec::new();
        for path in expand_patterns(patterns)? {
            records.extend(self.classify_file(&path)?);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rbacgen_module::AllowedResource;

    const WIDGETS: &str = r#"
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: widgets.alpha.io
spec:
  group: alpha.io
  scope: Cluster
  names:
    kind: Widget
    plural: widgets
    singular: widget
"#;

    const GADGETS: &str = r#"
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: gadgets.alpha.io
spec:
  group: alpha.io
  scope: Namespaced
  names:
    kind: Gadget
    plural: gadgets
"#;

    fn path() -> PathBuf {
        PathBuf::from("crds/alpha.yaml")
    }

    #[test]
    fn test_decode_multi_document_stream() {
        let stream = format!("# leading comment\n---\n{}\n---\n---\n{}", WIDGETS, GADGETS);
        let records = decode_manifests(&path(), &stream).unwrap();
        assert_eq!(
            records,
            vec![
                ResourceRecord::new("alpha.io", "widgets", Scope::Cluster),
                ResourceRecord::new("alpha.io", "gadgets", Scope::Namespaced),
            ]
        );
    }

    #[test]
    fn test_decode_rejects_foreign_kind() {
        let stream = format!("{}\n---\napiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: x\n", WIDGETS);
        let err = decode_manifests(&path(), &stream).unwrap_err();
        match err {
            GenError::NotACrd { api_version, kind, .. } => {
                assert_eq!(api_version, "v1");
                assert_eq!(kind, "ConfigMap");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_decode_accepts_v1beta1() {
        let stream = WIDGETS.replace("apiextensions.k8s.io/v1", "apiextensions.k8s.io/v1beta1");
        assert_eq!(decode_manifests(&path(), &stream).unwrap().len(), 1);
    }

    #[test]
    fn test_decode_rejects_malformed_yaml() {
        let err = decode_manifests(&path(), "apiVersion: [broken\n").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_MANIFEST");
    }

    #[test]
    fn test_decode_rejects_unknown_scope() {
        let stream = WIDGETS.replace("scope: Cluster", "scope: Global");
        let err = decode_manifests(&path(), &stream).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_MANIFEST");
    }

    #[test]
    fn test_decode_empty_stream() {
        assert!(decode_manifests(&path(), "").unwrap().is_empty());
        assert!(decode_manifests(&path(), "---\n# nothing here\n---\n").unwrap().is_empty());
    }

    #[test]
    fn test_classifier_applies_policy() {
        let config = GeneratorConfig::default();
        let policy = ModulePolicy::new(vec![AllowedResource::all("alpha.io")], vec!["gadgets".to_string()]);
        let classifier = Classifier::new(&config, "alpha", &policy);

        let stream = format!("{}\n---\n{}", WIDGETS, GADGETS);
        let records = classifier.classify_str(&path(), &stream).unwrap();
        assert_eq!(records, vec![ResourceRecord::new("alpha.io", "widgets", Scope::Cluster)]);
    }

    #[test]
    fn test_classifier_rejects_unlisted_group() {
        let config = GeneratorConfig::default();
        let policy = ModulePolicy::default();
        let classifier = Classifier::new(&config, "alpha", &policy);

        assert!(classifier.classify_str(&path(), WIDGETS).unwrap().is_empty());
        assert!(classifier.admit("deckhouse.io", "moduleconfigs"));
    }

    #[test]
    fn test_classify_file_skips_doc_manifests() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("doc-ru-widgets.yaml");
        std::fs::write(&doc, "not: [valid yaml\n").unwrap();

        let config = GeneratorConfig::default();
        let policy = ModulePolicy::new(vec![AllowedResource::all("alpha.io")], Vec::new());
        let classifier = Classifier::new(&config, "alpha", &policy);
        assert!(classifier.classify_file(&doc).unwrap().is_empty());
    }

    #[test]
    fn test_classify_file_missing() {
        let config = GeneratorConfig::default();
        let policy = ModulePolicy::default();
        let classifier = Classifier::new(&config, "alpha", &policy);
        let err = classifier.classify_file(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }

    #[test]
    fn test_expand_patterns_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.yaml"), GADGETS).unwrap();
        std::fs::write(dir.path().join("a.yaml"), WIDGETS).unwrap();
        let pattern = dir.path().join("*.yaml").display().to_string();

        let paths = expand_patterns(&[pattern.clone(), pattern]).unwrap();
        let names: Vec<_> = paths.iter().filter_map(|p| p.file_name()?.to_str()).collect();
        assert_eq!(names, vec!["a.yaml", "b.yaml"]);
    }

    #[test]
    fn test_expand_patterns_invalid() {
        let err = expand_patterns(&["crds/[".to_string()]).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_GLOB");
    }
}
