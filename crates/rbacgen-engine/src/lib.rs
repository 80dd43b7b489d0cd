//! # rbacgen engine
//!
//! Filesystem side of the generator: finds modules, classifies their custom
//! resource definitions, writes the synthesized cluster roles and the
//! capability documentation index.
//!
//! ## Components
//!
//! - **Locate**: lexical walk of the source tree for module descriptors
//! - **Classify**: CRD decoding and policy admission
//! - **Writer**: role files under `<module>/templates/rbacv2/<kind>/<class>.yaml`
//! - **Docs**: per-module and per-subsystem capability index
//! - **Generator**: the run loop tying the steps together
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rbacgen_engine::{Generator, GeneratorConfig};
//! use std::path::Path;
//!
//! let config = GeneratorConfig::from_env();
//! let summary = Generator::new(config).run(Path::new("."), Path::new("docs.yaml"))?;
//! assert!(summary.roles >= 2 * summary.modules);
//! # Ok::<(), rbacgen_engine::GenError>(())
//! ```

pub mod classify;
pub mod config;
pub mod docs;
pub mod error;
pub mod generator;
pub mod locate;
pub mod writer;

// Re-export main types for convenience
pub use classify::{decode_manifests, expand_patterns, Classifier};
pub use config::GeneratorConfig;
pub use docs::{CapabilityDoc, CapabilityIndex, DocFormat, ModuleCapabilityDoc, RoleSummary, SubsystemDoc};
pub use error::{GenError, GenResult};
pub use generator::{generate, Generator, RunSummary};
pub use locate::{load_module, locate_modules, LocatedModule};
pub use writer::{FsRoleWriter, MemoryRoleWriter, RoleWriter};
