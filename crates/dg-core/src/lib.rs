//! dg-core - Core library for dbtgraph
//!
//! This crate provides target addresses, the dbt project target model,
//! `dbt_project.yml` loading with package-manifest version checks, target
//! generation, and the description of how dbt is invoked for a project.

pub mod address;
pub mod checksum;
pub mod env_vars;
pub mod error;
pub mod generate;
pub mod invocation;
pub mod package;
pub mod paths;
pub mod project;
pub mod settings;
pub mod specifier;
pub mod tailor;
pub mod target;
pub mod universe;
pub mod workspace;

pub use address::Address;
pub use checksum::compute_checksum;
pub use env_vars::{hydrate_env_vars, DbtEnvVars, EnvVarsField};
pub use error::{CoreError, CoreResult};
pub use generate::generate_targets;
pub use invocation::{runner_script, DbtCli, DbtCommand, SystemBinaries, RUNNER_SCRIPT_NAME};
pub use package::{PackageSpec, PackagesFileKind};
pub use project::{load_project_spec, ProjectSpec, ProjectTarget, ProjectTargetDecl};
pub use settings::Settings;
pub use specifier::{SpecifierRange, SpecifierSet, Version, VersionSpecifier};
pub use tailor::{find_unowned_projects, PutativeTarget};
pub use target::{PythonRequirement, Target, TargetKind};
pub use universe::{OwnersLookup, TargetUniverse};
pub use workspace::{LoadedProject, Workspace};
