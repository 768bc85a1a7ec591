//! Compiled command implementation

use anyhow::{bail, Context, Result};
use dg_core::Address;
use dg_manifest::{compiled_sql_paths, ensure_generated_address};

use crate::cli::{CompiledArgs, GlobalArgs};
use crate::commands::common::{index_projects, load_workspace};

/// Execute the compiled command
pub async fn execute(args: &CompiledArgs, global: &GlobalArgs) -> Result<()> {
    let workspace = load_workspace(global)?;
    let address = Address::parse(&args.address, "")
        .with_context(|| format!("Invalid address '{}'", args.address))?;

    let loaded = workspace
        .load_all()
        .context("Failed to load dbt projects")?;
    let universe = workspace.universe(&loaded);
    let Some(target) = universe.get(&address) else {
        bail!("No target at {}", address);
    };

    let generator = address.maybe_convert_to_target_generator();
    let owning: Vec<_> = loaded
        .iter()
        .filter(|p| *p.target.address() == generator)
        .cloned()
        .collect();
    let indexed = index_projects(&workspace, &owning, args.manifest.as_deref())?;
    let Some(project) = indexed.first() else {
        ensure_generated_address(&address, "generate compiled SQL", false)?;
        bail!("No dbt_project target generates {}", address);
    };

    let paths = compiled_sql_paths(
        target,
        &project.project.target,
        &project.project.spec,
        &project.manifest,
        &project.index,
    )?;
    if paths.is_empty() {
        println!("{} has no compiled SQL in the manifest", address);
        return Ok(());
    }

    for path in &paths {
        if args.show {
            let full = workspace.root().join(path);
            let sql = std::fs::read_to_string(&full).with_context(|| {
                format!("Failed to read {} - run `dg compile` first", full.display())
            })?;
            println!("-- {}", path);
            println!("{}", sql.trim_end());
        } else {
            println!("{}", path);
        }
    }
    Ok(())
}
