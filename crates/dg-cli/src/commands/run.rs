//! Running dbt (`deps`, `parse`, `compile`) for projects

use anyhow::{Context, Result};
use dg_core::{DbtCommand, LoadedProject, Workspace};
use dg_manifest::{default_manifest_path, BuildManifest};
use std::path::Path;
use std::time::Instant;

use crate::cli::{GlobalArgs, ProjectArgs};
use crate::commands::common::{compose_cli, dbt_executable, load_projects, load_workspace, ExitCode};

/// Execute a dbt command for each selected project, installing packages
/// first when the command needs them
pub async fn execute(command: DbtCommand, args: &ProjectArgs, global: &GlobalArgs) -> Result<()> {
    let workspace = load_workspace(global)?;
    let loaded = load_projects(&workspace, args.project.as_deref())?;
    if loaded.is_empty() {
        println!("No dbt_project targets found under {}", workspace.root().display());
        return Ok(());
    }
    let dbt = dbt_executable(global)?;

    for project in &loaded {
        for step in command.prerequisites().iter().chain([&command]) {
            run_dbt(&workspace, project, *step, &dbt).await?;
        }
        if command == DbtCommand::Parse {
            report_manifest(&workspace, project)?;
        }
    }
    Ok(())
}

async fn run_dbt(
    workspace: &Workspace,
    project: &LoadedProject,
    command: DbtCommand,
    dbt: &Path,
) -> Result<()> {
    let cli = compose_cli(workspace, project)?;
    let argv = command.argv(&cli);
    println!("{} {}...", command.description(), project.target.address());
    log::debug!("Running {} {}", dbt.display(), argv.join(" "));

    let start = Instant::now();
    let status = tokio::process::Command::new(dbt)
        .args(&argv)
        .envs(cli.env())
        .current_dir(workspace.root())
        .status()
        .await
        .with_context(|| format!("Failed to execute {}", dbt.display()))?;

    if !status.success() {
        let code = status.code().unwrap_or(1);
        eprintln!(
            "dbt {} failed for {} with exit code {}",
            command,
            project.target.address(),
            code
        );
        return Err(ExitCode(code).into());
    }
    println!(
        "  dbt {} finished in {}ms",
        command,
        start.elapsed().as_millis()
    );
    Ok(())
}

fn report_manifest(workspace: &Workspace, project: &LoadedProject) -> Result<()> {
    let path = default_manifest_path(workspace.root(), project);
    let manifest = BuildManifest::load(project.target.address().clone(), &path)
        .with_context(|| format!("dbt parse did not produce {}", path.display()))?;
    println!(
        "  {} nodes in {} (dbt {})",
        manifest.nodes().len(),
        path.display(),
        manifest.dbt_version().unwrap_or("unknown")
    );
    Ok(())
}
