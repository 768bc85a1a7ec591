//! Shared utilities for CLI commands

use anyhow::{bail, Context, Result};
use dg_core::{hydrate_env_vars, Address, DbtCli, LoadedProject, ProjectTarget, Workspace};
use dg_manifest::IndexedProject;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that destructors run before the process ends.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; main exits without printing it.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Load the workspace under `--build-root`
pub(crate) fn load_workspace(global: &GlobalArgs) -> Result<Workspace> {
    Workspace::load(Path::new(&global.build_root)).with_context(|| {
        format!("Failed to load workspace at {}", global.build_root)
    })
}

/// Projects named by `--project`, or all of them
pub(crate) fn select_projects<'w>(
    workspace: &'w Workspace,
    project: Option<&str>,
) -> Result<Vec<&'w ProjectTarget>> {
    let Some(spec) = project else {
        return Ok(workspace.projects().iter().collect());
    };
    let address = Address::parse(spec, "").context("Invalid project address")?;
    if let Some(target) = workspace.project(&address) {
        return Ok(vec![target]);
    }
    // `dir` alone names the project declared in that directory
    let in_dir: Vec<&ProjectTarget> = workspace
        .projects()
        .iter()
        .filter(|p| p.address().spec_path() == address.spec_path())
        .collect();
    match in_dir.len() {
        1 => Ok(in_dir),
        0 => bail!("No dbt_project target at {}", address),
        _ => bail!("Several dbt_project targets in {}; name one", address.spec_path()),
    }
}

/// Load every selected project with its generated targets
pub(crate) fn load_projects(
    workspace: &Workspace,
    project: Option<&str>,
) -> Result<Vec<LoadedProject>> {
    select_projects(workspace, project)?
        .into_iter()
        .map(|target| {
            workspace
                .load_project(target)
                .with_context(|| format!("Failed to load dbt project {}", target.address()))
        })
        .collect()
}

/// Configure dbt for a loaded project, resolving its environment
pub(crate) fn compose_cli(workspace: &Workspace, project: &LoadedProject) -> Result<DbtCli> {
    let env = hydrate_env_vars(
        workspace.root(),
        project.target.address(),
        project.target.env_vars(),
    )
    .with_context(|| format!("Failed to resolve env_vars for {}", project.target.address()))?;
    DbtCli::compose(&project.target, &project.spec, env)
        .with_context(|| format!("Failed to configure dbt for {}", project.target.address()))
}

/// Resolve `--dbt` to an executable
pub(crate) fn dbt_executable(global: &GlobalArgs) -> Result<PathBuf> {
    which::which(&global.dbt)
        .with_context(|| format!("Could not find dbt executable '{}' - is dbt installed?", global.dbt))
}

/// Index each loaded project against its manifest.
///
/// `manifest` overrides the manifest location and requires a single project.
pub(crate) fn index_projects<'w>(
    workspace: &Workspace,
    loaded: &'w [LoadedProject],
    manifest: Option<&str>,
) -> Result<Vec<IndexedProject<'w>>> {
    if manifest.is_some() && loaded.len() > 1 {
        bail!("--manifest needs a single project; pass --project or a target address");
    }
    loaded
        .iter()
        .map(|project| {
            IndexedProject::load(workspace.root(), project, manifest.map(Path::new))
                .with_context(|| {
                    format!(
                        "Failed to read the dbt manifest for {} - run `dg parse` first",
                        project.target.address()
                    )
                })
        })
        .collect()
}

/// Parse target addresses given on the command line
pub(crate) fn parse_addresses(specs: &[String]) -> Result<Vec<Address>> {
    specs
        .iter()
        .map(|spec| {
            Address::parse(spec, "").with_context(|| format!("Invalid address '{}'", spec))
        })
        .collect()
}
