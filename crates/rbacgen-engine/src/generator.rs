//! Generation pipeline
//!
//! Drives one run over a source tree:
//!
//! ```text
//! locate ─→ for each module (discovery order):
//!             classify ─→ aggregate ─→ synthesize ─→ write roles ─→ record docs
//!        ─→ write docs (only when every module succeeded)
//! ```
//!
//! The first error stops the run. Role files already written for earlier
//! modules stay on disk; rerunning after fixing the input overwrites them.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use rbacgen_rbac::{AggregatedResources, ModuleRoles, RoleSubject};

use crate::classify::Classifier;
use crate::config::GeneratorConfig;
use crate::docs::{CapabilityDoc, CapabilityIndex};
use crate::error::GenResult;
use crate::locate::{locate_modules, LocatedModule};
use crate::writer::{FsRoleWriter, RoleWriter};

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of modules processed
    pub modules: usize,
    /// Number of role files written
    pub roles: usize,
    /// Where the documentation index was written
    pub docs_path: PathBuf,
}

/// Role and documentation generator.
///
/// # Example
///
/// ```no_run
/// use rbacgen_engine::{Generator, GeneratorConfig};
/// use std::path::Path;
///
/// let generator = Generator::new(GeneratorConfig::default());
/// let summary = generator.run(Path::new("."), Path::new("docs/capabilities.yaml"))?;
/// println!("{} roles for {} modules", summary.roles, summary.modules);
/// # Ok::<(), rbacgen_engine::GenError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    /// Create a generator.
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate roles below `root` and write the documentation index to `docs_path`.
    ///
    /// # Arguments
    ///
    /// * `root` - Source tree to scan for modules
    /// * `docs_path` - Documentation index destination; `.json` selects JSON
    ///
    /// # Returns
    ///
    /// Counts of processed modules and written roles.
    pub fn run(&self, root: &Path, docs_path: &Path) -> GenResult<RunSummary> {
        let mut writer = FsRoleWriter::new(&self.config.templates_path);
        let (doc, roles) = self.generate(root, &mut writer)?;

        doc.write_to(docs_path)?;

        let summary = RunSummary {
            modules: doc.modules.len(),
            roles,
            docs_path: docs_path.to_path_buf(),
        };
        info!(
            modules = summary.modules,
            roles = summary.roles,
            docs = %summary.docs_path.display(),
            "generation finished"
        );
        Ok(summary)
    }

    /// Generate roles below `root` through `writer` and return the
    /// documentation index without writing it.
    ///
    /// Also returns the number of roles written.
    pub fn generate(&self, root: &Path, writer: &mut dyn RoleWriter) -> GenResult<(CapabilityDoc, usize)> {
        let modules = locate_modules(root, &self.config)?;

        let mut index = CapabilityIndex::new();
        let mut written = 0;
        for module in &modules {
            let roles = self
                .process_module(module, writer)
                .map_err(|e| e.in_module(module.name()))?;
            written += roles.len();
            index.record(&module.descriptor, &roles);
        }

        Ok((index.finish(), written))
    }

    /// Classify, synthesize and write the roles of one module.
    pub fn process_module(&self, module: &LocatedModule, writer: &mut dyn RoleWriter) -> GenResult<ModuleRoles> {
        let roles = self.synthesize(module)?;
        for role in roles.iter() {
            writer.write_role(&module.path, role)?;
        }
        Ok(roles)
    }

    /// Classify and synthesize the roles of one module without writing them.
    pub fn synthesize(&self, module: &LocatedModule) -> GenResult<ModuleRoles> {
        info!(module = module.name(), "processing module");

        let classifier = Classifier::new(&self.config, module.name(), &module.policy);
        let records = classifier.classify_patterns(&module.crds)?;
        let resources = AggregatedResources::from_records(records);
        debug!(
            module = module.name(),
            cluster_groups = resources.cluster.len(),
            namespaced_groups = resources.namespaced.len(),
            "aggregated resources"
        );

        let subject = RoleSubject {
            module: module.name(),
            subsystems: &module.descriptor.subsystems,
            namespace: module.descriptor.namespace(),
        };
        Ok(self.config.scheme.synthesize(&subject, &resources))
    }
}

/// Run a generator with `config` once.
pub fn generate(config: GeneratorConfig, root: &Path, docs_path: &Path) -> GenResult<RunSummary> {
    Generator::new(config).run(root, docs_path)
}
