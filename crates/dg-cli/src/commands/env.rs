//! Env command implementation

use anyhow::Result;

use crate::cli::{GlobalArgs, ProjectArgs};
use crate::commands::common::{compose_cli, load_projects, load_workspace};

/// Execute the env command
pub async fn execute(args: &ProjectArgs, global: &GlobalArgs) -> Result<()> {
    let workspace = load_workspace(global)?;
    let loaded = load_projects(&workspace, args.project.as_deref())?;

    for project in &loaded {
        let cli = compose_cli(&workspace, project)?;
        println!("# {}", project.target.address());
        for (name, value) in cli.env() {
            println!("{}={}", name, value);
        }
        for (name, dir) in cli.append_only_caches() {
            println!("# append-only cache {} -> {}", name, dir);
        }
        println!("# requirements ({}): {}", cli.resolve(), cli.requirements().join(", "));
    }
    Ok(())
}
