//! Proposing `dbt_project` targets for projects nobody declared yet

use crate::error::{CoreError, CoreResult};
use crate::paths;
use crate::project::ProjectTarget;
use crate::settings::Settings;
use crate::target::TargetKind;
use glob::Pattern;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

/// Directories never searched for projects; `dbt_packages` holds installed
/// packages, each with its own `dbt_project.yml`.
const SKIPPED_DIRS: [&str; 2] = ["dbt_packages", "node_modules"];

/// A target `tailor` would add to a `BUILD.yml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PutativeTarget {
    /// Directory the target would be declared in
    pub path: String,
    pub name: String,
    pub kind: TargetKind,
    /// Files that caused this target to be proposed
    pub triggering_sources: Vec<String>,
    /// Files the new target would own
    pub owned_sources: Vec<String>,
}

impl PutativeTarget {
    /// `BUILD.yml` snippet declaring this target
    pub fn render(&self) -> String {
        format!(
            "{}:\n  name: {}\n  required_adapters: []\n",
            self.kind.alias(),
            self.name
        )
    }
}

/// Find every `dbt_project.yml` under the build root not in `owned_sources`.
///
/// Returns nothing when `tailor_project_targets` is disabled.
pub fn find_unowned_projects(
    build_root: &Path,
    settings: &Settings,
    owned_sources: &BTreeSet<String>,
) -> CoreResult<Vec<PutativeTarget>> {
    if !settings.tailor_project_targets {
        log::debug!("Tailoring of dbt projects is disabled");
        return Ok(Vec::new());
    }

    let pattern = format!(
        "{}/**/dbt_project.yml",
        Pattern::escape(&build_root.display().to_string())
    );
    let entries = glob::glob(&pattern).map_err(|e| CoreError::GlobPattern {
        pattern: pattern.clone(),
        message: e.to_string(),
    })?;

    let mut putative = Vec::new();
    for entry in entries {
        let path = entry?;
        let Some(file) = paths::to_relative_string(&path, build_root) else {
            continue;
        };
        if is_skipped(&file) || owned_sources.contains(&file) {
            continue;
        }
        putative.push(PutativeTarget {
            path: paths::dirname(&file).to_string(),
            name: "project".to_string(),
            kind: TargetKind::Project,
            triggering_sources: vec![file.clone()],
            owned_sources: vec![file],
        });
    }
    log::debug!("Found {} unowned dbt projects", putative.len());
    Ok(putative)
}

/// Project files already claimed by declared targets
pub fn owned_project_files<'a>(
    projects: impl IntoIterator<Item = &'a ProjectTarget>,
) -> BTreeSet<String> {
    projects
        .into_iter()
        .map(ProjectTarget::project_file_path)
        .collect()
}

fn is_skipped(file: &str) -> bool {
    let dir = paths::dirname(file);
    dir.split('/')
        .any(|segment| segment.starts_with('.') || SKIPPED_DIRS.contains(&segment))
}

#[cfg(test)]
#[path = "tailor_test.rs"]
mod tests;
