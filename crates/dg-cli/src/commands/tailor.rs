//! Tailor command implementation

use anyhow::{Context, Result};
use dg_core::tailor::owned_project_files;
use dg_core::workspace::BUILD_FILE;
use dg_core::{find_unowned_projects, PutativeTarget};
use std::path::Path;

use crate::cli::{GlobalArgs, TailorArgs};
use crate::commands::common::load_workspace;

/// Execute the tailor command
pub async fn execute(args: &TailorArgs, global: &GlobalArgs) -> Result<()> {
    let workspace = load_workspace(global)?;
    let owned = owned_project_files(workspace.projects());
    let putative = find_unowned_projects(workspace.root(), workspace.settings(), &owned)
        .context("Failed to search for dbt projects")?;

    if putative.is_empty() {
        println!("Every dbt project has a dbt_project target.");
        return Ok(());
    }

    for target in &putative {
        let build_file = Path::new(&target.path).join(BUILD_FILE);
        if args.write {
            write_target(workspace.root(), target)?;
            println!("Created {} for {}", build_file.display(), target.triggering_sources.join(", "));
        } else {
            println!("# {}", build_file.display());
            print!("{}", target.render());
            println!();
        }
    }
    Ok(())
}

/// Append the target to the directory's `BUILD.yml`, creating it if needed
fn write_target(root: &Path, target: &PutativeTarget) -> Result<()> {
    let path = root.join(&target.path).join(BUILD_FILE);
    let mut contents = std::fs::read_to_string(&path).unwrap_or_default();
    if !contents.is_empty() && !contents.ends_with('\n') {
        contents.push('\n');
    }
    contents.push_str(&target.render());
    std::fs::write(&path, contents)
        .with_context(|| format!("Failed to write {}", path.display()))
}
