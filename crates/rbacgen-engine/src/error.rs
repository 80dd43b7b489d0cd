//! Error types for a generator run
//!
//! Every error is fatal for the run. Inputs are local and deterministic, so
//! nothing is retried; the caller fixes the input and runs again.

use std::path::PathBuf;
use thiserror::Error;

use rbacgen_module::ModuleError;

/// Generator error types.
#[derive(Debug, Error)]
pub enum GenError {
    /// Reading or writing a file failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A manifest is not valid YAML or lacks required fields
    #[error("invalid manifest {}: {source}", .path.display())]
    Manifest {
        /// Manifest file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_yaml::Error,
    },

    /// A manifest document is not a custom resource definition
    #[error("invalid CRD document in {}: apiVersion/kind '{api_version}/{kind}'", .path.display())]
    NotACrd {
        /// Manifest file
        path: PathBuf,
        /// Declared apiVersion
        api_version: String,
        /// Declared kind
        kind: String,
    },

    /// A descriptor or policy file is malformed
    #[error("invalid module file {}: {source}", .path.display())]
    ModuleFile {
        /// Descriptor or policy file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: ModuleError,
    },

    /// A CRD glob pattern is malformed
    #[error("invalid CRD glob '{pattern}': {source}")]
    Pattern {
        /// Offending pattern
        pattern: String,
        /// Underlying error
        #[source]
        source: glob::PatternError,
    },

    /// A path matched by a CRD glob could not be read
    #[error("failed to expand CRD glob: {0}")]
    Glob(#[from] glob::GlobError),

    /// Walking the module tree failed
    #[error("failed to walk module tree: {0}")]
    Walk(#[from] walkdir::Error),

    /// Encoding an artifact failed
    #[error("failed to encode {what}: {message}")]
    Encode {
        /// Artifact being encoded
        what: String,
        /// Encoder message
        message: String,
    },

    /// A role name does not follow the naming convention
    #[error("role name '{0}' does not follow the naming convention")]
    RoleName(String),

    /// A module failed; carries the module name
    #[error("module '{module}': {source}")]
    Module {
        /// Module name
        module: String,
        /// Underlying error
        #[source]
        source: Box<GenError>,
    },
}

/// Result type for generator operations.
pub type GenResult<T> = Result<T, GenError>;

impl GenError {
    /// Build an I/O error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenError::Io {
            path: path.into(),
            source,
        }
    }

    /// Attach a module name to this error.
    pub fn in_module(self, module: impl Into<String>) -> Self {
        match self {
            GenError::Module { .. } => self,
            other => GenError::Module {
                module: module.into(),
                source: Box::new(other),
            },
        }
    }

    /// Name of the module the error belongs to, if known.
    pub fn module(&self) -> Option<&str> {
        match self {
            GenError::Module { module, .. } => Some(module.as_str()),
            _ => None,
        }
    }

    /// Check if the error comes from malformed input rather than the filesystem.
    pub fn is_input_error(&self) -> bool {
        match self {
            GenError::Manifest { .. }
            | GenError::NotACrd { .. }
            | GenError::ModuleFile { .. }
            | GenError::Pattern { .. }
            | GenError::RoleName(_) => true,
            GenError::Module { source, .. } => source.is_input_error(),
            GenError::Io { .. } | GenError::Glob(_) | GenError::Walk(_) | GenError::Encode { .. } => false,
        }
    }

    /// Get error code for diagnostics.
    pub fn error_code(&self) -> &'static str {
        match self {
            GenError::Io { .. } => "IO_ERROR",
            GenError::Manifest { .. } => "INVALID_MANIFEST",
            GenError::NotACrd { .. } => "NOT_A_CRD",
            GenError::ModuleFile { source, .. } => source.error_code(),
            GenError::Pattern { .. } => "INVALID_GLOB",
            GenError::Glob(_) => "GLOB_ERROR",
            GenError::Walk(_) => "WALK_ERROR",
            GenError::Encode { .. } => "ENCODE_ERROR",
            GenError::RoleName(_) => "INVALID_ROLE_NAME",
            GenError::Module { source, .. } => source.error_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_module_wraps_once() {
        let err = GenError::RoleName("cluster-admin".to_string())
            .in_module("alpha")
            .in_module("beta");
        assert_eq!(err.module(), Some("alpha"));
        assert_eq!(err.error_code(), "INVALID_ROLE_NAME");
        assert!(err.is_input_error());
    }

    #[test]
    fn test_message_names_module_and_path() {
        let err = GenError::NotACrd {
            path: PathBuf::from("modules/alpha/crds/widget.yaml"),
            api_version: "v1".to_string(),
            kind: "ConfigMap".to_string(),
        }
        .in_module("alpha");
        let message = err.to_string();
        assert!(message.contains("module 'alpha'"));
        assert!(message.contains("modules/alpha/crds/widget.yaml"));
        assert!(message.contains("v1/ConfigMap"));
    }

    #[test]
    fn test_io_is_not_input_error() {
        let err = GenError::io("/nope", std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(!err.is_input_error());
        assert_eq!(err.error_code(), "IO_ERROR");
    }
}
