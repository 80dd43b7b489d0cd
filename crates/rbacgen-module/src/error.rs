//! Error types for module descriptor and policy decoding.

use thiserror::Error;

/// Errors raised while decoding declarative module files.
#[derive(Debug, Error)]
pub enum ModuleError {
    /// The descriptor file is not valid YAML or has the wrong shape.
    #[error("invalid module descriptor: {0}")]
    InvalidDescriptor(#[source] serde_yaml::Error),

    /// The policy file is not valid YAML or has the wrong shape.
    #[error("invalid module policy: {0}")]
    InvalidPolicy(#[source] serde_yaml::Error),

    /// The descriptor has no module name.
    #[error("module descriptor has an empty name")]
    EmptyName,
}

impl ModuleError {
    /// Get error code for diagnostics.
    pub fn error_code(&self) -> &'static str {
        match self {
            ModuleError::InvalidDescriptor(_) => "INVALID_DESCRIPTOR",
            ModuleError::InvalidPolicy(_) => "INVALID_POLICY",
            ModuleError::EmptyName => "EMPTY_MODULE_NAME",
        }
    }
}

/// Result type for module decoding.
pub type ModuleResult<T> = Result<T, ModuleError>;
