//! Reading `dbt_project.yml` and the package manifest for a project target

use super::{ProjectSpec, ProjectTarget};
use crate::checksum::compute_checksum;
use crate::error::{CoreError, CoreResult};
use crate::package::PackageSpec;
use serde_yaml::{Mapping, Value};
use std::path::Path;

/// Load and validate the dbt project declared by `target`.
///
/// Fails with [`CoreError::InvalidProject`] when `dbt_project.yml` is
/// missing, when the package manifest format is newer than the dbt versions
/// the project allows, or when the package manifest has no `packages` header.
/// A missing package manifest yields no packages.
pub fn load_project_spec(build_root: &Path, target: &ProjectTarget) -> CoreResult<ProjectSpec> {
    let project_file = target.project_file_path();
    let project_path = build_root.join(&project_file);
    if !project_path.is_file() {
        return Err(CoreError::invalid_project(
            format!(
                "No `dbt_project.yml` found for `{}` target at address {}",
                ProjectTarget::ALIAS,
                target.address()
            ),
            None,
        ));
    }

    let raw = read_bytes(&project_path)?;
    let digest = compute_checksum(&raw);
    let contents = parse_mapping(&raw, &project_file)?
        .ok_or_else(|| {
            CoreError::invalid_project(format!("`{}` must contain a mapping", project_file), None)
        })?;

    let mut spec = ProjectSpec::new(contents, digest, Vec::new());
    let kind = target.packages_file_kind();
    if let Some(range) = kind.required_version_range() {
        let requested = spec.requires_dbt_version()?;
        if !range.is_subset(&requested) {
            return Err(CoreError::invalid_project(
                format!("{} is only valid for dbt versions {}", kind, range),
                spec.name(),
            ));
        }
    }

    let packages_file = target.packages_file_path();
    let packages_path = build_root.join(&packages_file);
    if packages_path.is_file() {
        let raw = read_bytes(&packages_path)?;
        let manifest = parse_mapping(&raw, &packages_file)?;
        let packages = manifest
            .as_ref()
            .and_then(|m| m.get("packages"))
            .ok_or_else(|| {
                CoreError::invalid_project(
                    "Invalid packages file without `packages` header.",
                    spec.name(),
                )
            })?;
        spec.packages = match packages {
            Value::Null => Vec::new(),
            Value::Sequence(entries) => entries
                .iter()
                .map(|entry| PackageSpec::from_value(entry, target.address()))
                .collect::<CoreResult<Vec<_>>>()?,
            _ => {
                return Err(CoreError::invalid_project(
                    "`packages` must be a list of package entries",
                    spec.name(),
                ))
            }
        };
    } else {
        log::debug!(
            "No package manifest at {} for {}",
            packages_file,
            target.address()
        );
    }

    log::debug!(
        "Loaded dbt project {} ({} packages) for {}",
        spec.name().unwrap_or("<unnamed>"),
        spec.packages.len(),
        target.address()
    );
    Ok(spec)
}

fn read_bytes(path: &Path) -> CoreResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| CoreError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    })
}

/// Parse YAML, returning `None` when the document is not a mapping
fn parse_mapping(raw: &[u8], display_path: &str) -> CoreResult<Option<Mapping>> {
    let value: Value = serde_yaml::from_slice(raw).map_err(|e| CoreError::ParseError {
        path: display_path.to_string(),
        message: e.to_string(),
    })?;
    Ok(match value {
        Value::Mapping(mapping) => Some(mapping),
        _ => None,
    })
}
