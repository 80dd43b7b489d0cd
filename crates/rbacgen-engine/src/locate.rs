//! Module discovery
//!
//! Walks a source tree in lexical order and loads every module directory,
//! i.e. every directory holding a descriptor file.
//!
//! ```text
//! <root>/
//!   modules/alpha/module.yaml     ← descriptor
//!   modules/alpha/rbac.yaml       ← optional policy
//!   modules/alpha/crds/*.yaml     ← manifests, referenced by the policy's globs
//! ```

use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use rbacgen_module::{ModuleDescriptor, ModulePolicy, PolicySpec};

use crate::config::GeneratorConfig;
use crate::error::{GenError, GenResult};

/// A module found in the source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedModule {
    /// Directory holding the descriptor; roles are written below it.
    pub path: PathBuf,

    /// Module descriptor
    pub descriptor: ModuleDescriptor,

    /// Module policy; empty when the module has no policy file
    pub policy: ModulePolicy,

    /// Manifest glob patterns, resolved against the scanned root
    pub crds: Vec<String>,
}

impl LocatedModule {
    /// Module name.
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }
}

/// Find every module below `root` that belongs to at least one subsystem.
///
/// Modules are returned in lexical path order, which makes every output that
/// depends on processing order reproducible.
pub fn locate_modules(root: &Path, config: &GeneratorConfig) -> GenResult<Vec<LocatedModule>> {
    info!(root = %root.display(), "walking dir");

    let mut modules = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_skipped(entry, config));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() || entry.file_name() != config.descriptor_file.as_str() {
            continue;
        }

        let dir = match entry.path().parent() {
            Some(dir) => dir,
            None => continue,
        };
        let module = load_module(root, dir, config)?;
        if !module.descriptor.has_subsystems() {
            debug!(module = module.name(), "skipping module without subsystems");
            continue;
        }

        info!(module = module.name(), path = %dir.display(), "found module");
        modules.push(module);
    }

    info!("found {} modules", modules.len());
    Ok(modules)
}

fn is_skipped(entry: &DirEntry, config: &GeneratorConfig) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| config.is_skipped_dir(name))
            .unwrap_or(false)
}

/// Load the module whose descriptor lives in `dir`.
pub fn load_module(root: &Path, dir: &Path, config: &GeneratorConfig) -> GenResult<LocatedModule> {
    let descriptor_path = dir.join(&config.descriptor_file);
    let raw = read(&descriptor_path)?;
    let descriptor = ModuleDescriptor::from_yaml(&raw).map_err(|source| GenError::ModuleFile {
        path: descriptor_path.clone(),
        source,
    })?;

    let policy_path = dir.join(&config.policy_file);
    let spec = if policy_path.is_file() {
        debug!(module = descriptor.name.as_str(), path = %policy_path.display(), "parsing policy");
        let raw = read(&policy_path)?;
        PolicySpec::from_yaml(&raw)
            .map_err(|source| GenError::ModuleFile {
                path: policy_path.clone(),
                source,
            })
            .map_err(|e| e.in_module(descriptor.name.as_str()))?
    } else {
        PolicySpec::default()
    };

    let crds = spec
        .crds
        .iter()
        .map(|pattern| root.join(pattern).display().to_string())
        .collect();

    Ok(LocatedModule {
        path: dir.to_path_buf(),
        descriptor,
        policy: spec.policy,
        crds,
    })
}

fn read(path: &Path) -> GenResult<String> {
    std::fs::read_to_string(path).map_err(|e| GenError::io(path, e))
}
