//! Deps command implementation

use anyhow::{bail, Context, Result};
use dg_core::{Address, LoadedProject};
use dg_manifest::{build_dependency_graph, DependencyGraph};
use std::collections::{BTreeMap, BTreeSet};

use crate::cli::{DepsArgs, GlobalArgs, Output};
use crate::commands::common::{index_projects, load_workspace, parse_addresses};

/// Execute the deps command
pub async fn execute(args: &DepsArgs, global: &GlobalArgs) -> Result<()> {
    let workspace = load_workspace(global)?;
    let loaded = workspace
        .load_all()
        .context("Failed to load dbt projects")?;
    let universe = workspace.universe(&loaded);
    let addresses = parse_addresses(&args.addresses)?;

    let relevant = relevant_projects(&loaded, &addresses);
    let indexed = index_projects(&workspace, &relevant, args.manifest.as_deref())?;
    let graph = build_dependency_graph(&indexed, &universe);

    let queried: Vec<Address> = if addresses.is_empty() {
        graph.addresses().cloned().collect()
    } else {
        for address in &addresses {
            if !universe.contains(address) {
                bail!("No target at {}", address);
            }
        }
        addresses
    };

    let mut results: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for address in &queried {
        let found = query(&graph, address, args)?;
        results.insert(
            address.to_string(),
            found.iter().map(Address::to_string).collect(),
        );
    }

    match args.output {
        Output::Json => {
            let json = serde_json::to_string_pretty(&results)
                .context("Failed to serialize dependencies")?;
            println!("{}", json);
        }
        Output::Text => {
            for (address, found) in &results {
                println!("{}", address);
                for dep in found {
                    println!("  {}", dep);
                }
            }
        }
    }
    Ok(())
}

/// Projects generating any of `addresses`, or all projects when none are given
fn relevant_projects(loaded: &[LoadedProject], addresses: &[Address]) -> Vec<LoadedProject> {
    if addresses.is_empty() {
        return loaded.to_vec();
    }
    let generators: BTreeSet<Address> = addresses
        .iter()
        .map(Address::maybe_convert_to_target_generator)
        .collect();
    loaded
        .iter()
        .filter(|p| generators.contains(p.target.address()))
        .cloned()
        .collect()
}

fn query(graph: &DependencyGraph, address: &Address, args: &DepsArgs) -> Result<BTreeSet<Address>> {
    if !graph.contains(address) {
        log::warn!("{} has no inferred dependencies", address);
        return Ok(BTreeSet::new());
    }
    let found = match (args.dependents, args.transitive) {
        (false, false) => graph.dependencies(address)?,
        (false, true) => graph.ancestors(address)?,
        (true, false) => graph.dependents(address)?,
        (true, true) => graph.descendants(address)?,
    };
    Ok(found)
}
