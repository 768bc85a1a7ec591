//! List command implementation

use anyhow::{bail, Context, Result};
use dg_core::{Target, TargetKind};
use serde::Deserialize;

use crate::cli::{GlobalArgs, LsArgs, Output};
use crate::commands::common::load_workspace;

/// Execute the ls command
pub async fn execute(args: &LsArgs, global: &GlobalArgs) -> Result<()> {
    let workspace = load_workspace(global)?;
    let loaded = workspace
        .load_all()
        .context("Failed to load dbt projects")?;
    let universe = workspace.universe(&loaded);

    let kind = args.kind.as_deref().map(parse_kind).transpose()?;
    let targets: Vec<&Target> = universe
        .iter()
        .filter(|t| kind.map_or(true, |k| t.kind == k))
        .collect();

    match args.output {
        Output::Text => print_table(&targets),
        Output::Json => {
            let json =
                serde_json::to_string_pretty(&targets).context("Failed to serialize targets")?;
            println!("{}", json);
        }
    }
    Ok(())
}

fn parse_kind(alias: &str) -> Result<TargetKind> {
    match TargetKind::deserialize(serde_json::Value::String(alias.to_string())) {
        Ok(kind) => Ok(kind),
        Err(_) => bail!("Unknown target kind '{}'", alias),
    }
}

/// Print targets in table format
fn print_table(targets: &[&Target]) {
    let addresses: Vec<String> = targets.iter().map(|t| t.address.to_string()).collect();
    let address_width = addresses.iter().map(String::len).max().unwrap_or(7).max(7);
    let kind_width = targets
        .iter()
        .map(|t| t.kind.alias().len())
        .max()
        .unwrap_or(4)
        .max(4);

    println!(
        "{:<address_width$}  {:<kind_width$}  SOURCE",
        "ADDRESS",
        "KIND",
        address_width = address_width,
        kind_width = kind_width
    );
    println!(
        "{:-<address_width$}  {:-<kind_width$}  {}",
        "",
        "",
        "-".repeat(40),
        address_width = address_width,
        kind_width = kind_width
    );

    for (target, address) in targets.iter().zip(&addresses) {
        println!(
            "{:<address_width$}  {:<kind_width$}  {}",
            address,
            target.kind.alias(),
            target.file_path().unwrap_or("-"),
            address_width = address_width,
            kind_width = kind_width
        );
    }

    println!();
    println!("{} targets", targets.len());
}
