//! Locating the SQL dbt compiles for a target

use crate::error::ManifestResult;
use crate::index::AddressIndex;
use crate::inference::ensure_generated_address;
use crate::manifest::{BuildManifest, ManifestNode};
use dg_core::{paths, ProjectSpec, ProjectTarget, Target};

/// Node resource types dbt writes compiled SQL for
pub const COMPILED_RESOURCE_TYPES: [&str; 4] = ["model", "test", "snapshot", "analysis"];

/// Build-root-relative paths of the compiled SQL for `target`'s nodes.
///
/// The node's own `compiled_path` is used when dbt recorded one, otherwise
/// `<target-path>/compiled/<package>/<original_file_path>` under the
/// project directory. Fails for targets not generated by a project.
pub fn compiled_sql_paths(
    target: &Target,
    project: &ProjectTarget,
    spec: &ProjectSpec,
    manifest: &BuildManifest,
    index: &AddressIndex,
) -> ManifestResult<Vec<String>> {
    ensure_generated_address(&target.address, "generate compiled SQL", false)?;

    let project_dir = project.project_dir();
    let mut compiled: Vec<String> = index
        .nodes_for_address(manifest, &target.address)
        .into_iter()
        .filter(|node| {
            node.resource_type()
                .is_some_and(|kind| COMPILED_RESOURCE_TYPES.contains(&kind))
        })
        .filter_map(|node| compiled_path(node, &project_dir, spec))
        .collect();
    compiled.sort();
    compiled.dedup();
    log::debug!(
        "{} compiled SQL file(s) for {}",
        compiled.len(),
        target.address
    );
    Ok(compiled)
}

fn compiled_path(node: &ManifestNode, project_dir: &str, spec: &ProjectSpec) -> Option<String> {
    if let Some(path) = node.compiled_path() {
        return Some(paths::join(project_dir, path));
    }
    let package = node.package_name().or_else(|| spec.name())?;
    let original = node.original_file_path()?;
    let relative = format!(
        "{}/compiled/{}/{}",
        spec.target_path(),
        package,
        original
    );
    Some(paths::join(project_dir, &relative))
}

#[cfg(test)]
#[path = "codegen_test.rs"]
mod tests;
