//! Role artifact writers
//!
//! A role is written to `<module>/<templates>/<kind>/<class>.yaml`, where kind
//! and class come from the role name. Each write replaces the previous file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

use rbacgen_rbac::Role;

use crate::error::{GenError, GenResult};

/// Destination of generated roles.
pub trait RoleWriter {
    /// Write `role` below `module_dir`, returning the file it was written to.
    fn write_role(&mut self, module_dir: &Path, role: &Role) -> GenResult<PathBuf>;
}

/// Path of the file `role` is written to.
pub fn role_path(module_dir: &Path, templates_path: &Path, role: &Role) -> GenResult<PathBuf> {
    let name = role
        .role_name()
        .ok_or_else(|| GenError::RoleName(role.name().to_string()))?;
    Ok(module_dir
        .join(templates_path)
        .join(name.kind.as_str())
        .join(format!("{}.yaml", name.class.as_str())))
}

/// Encode a role as YAML.
pub fn encode_role(role: &Role) -> GenResult<String> {
    serde_yaml::to_string(role).map_err(|e| GenError::Encode {
        what: format!("role {}", role.name()),
        message: e.to_string(),
    })
}

/// Writes roles to the filesystem.
#[derive(Debug, Clone)]
pub struct FsRoleWriter {
    templates_path: PathBuf,
}

impl FsRoleWriter {
    /// Create a writer placing roles under `templates_path` of each module.
    pub fn new(templates_path: impl Into<PathBuf>) -> Self {
        Self {
            templates_path: templates_path.into(),
        }
    }
}

impl RoleWriter for FsRoleWriter {
    fn write_role(&mut self, module_dir: &Path, role: &Role) -> GenResult<PathBuf> {
        let path = role_path(module_dir, &self.templates_path, role)?;
        let encoded = encode_role(role)?;

        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| GenError::io(dir, e))?;
        }

        info!(role = role.name(), path = %path.display(), "writing role");
        std::fs::write(&path, encoded).map_err(|e| GenError::io(&path, e))?;
        Ok(path)
    }
}

/// Keeps written roles in memory.
///
/// Useful for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryRoleWriter {
    templates_path: PathBuf,
    files: BTreeMap<PathBuf, String>,
}

impl MemoryRoleWriter {
    /// Create an empty in-memory writer.
    pub fn new(templates_path: impl Into<PathBuf>) -> Self {
        Self {
            templates_path: templates_path.into(),
            files: BTreeMap::new(),
        }
    }

    /// Written files, by path.
    pub fn files(&self) -> &BTreeMap<PathBuf, String> {
        &self.files
    }

    /// Content written to `path`, if any.
    pub fn get(&self, path: &Path) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }
}

impl RoleWriter for MemoryRoleWriter {
    fn write_role(&mut self, module_dir: &Path, role: &Role) -> GenResult<PathBuf> {
        let path = role_path(module_dir, &self.templates_path, role)?;
        self.files.insert(path.clone(), encode_role(role)?);
        Ok(path)
    }
}
