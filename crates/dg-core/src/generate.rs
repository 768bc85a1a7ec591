//! Target generation for a `dbt_project` generator.
//!
//! Every file under the project's model, macro, test and seed directories
//! becomes a generated target addressed by its path relative to the
//! generator's directory:
//!
//! | directory key | primary kind | also generated         |
//! |---------------|--------------|------------------------|
//! | `model-paths` | `dbt_model`  | `dbt_config`, `dbt_doc` |
//! | `macro-paths` | `dbt_macro`  | `dbt_config`, `dbt_doc` |
//! | `test-paths`  | `dbt_test`   | `dbt_config`, `dbt_doc` |
//! | `seed-paths`  | `file`       | `dbt_config`, `dbt_doc` |
//!
//! The project, package and profiles files get helper targets, and each
//! third-party package entry gets a `dbt_third_party_package` target.

use crate::address::Address;
use crate::error::{CoreError, CoreResult};
use crate::paths;
use crate::project::{
    ProjectSpec, ProjectTarget, MACRO_PATHS, MODEL_PATHS, SEED_PATHS, TEST_PATHS,
};
use crate::target::{Target, TargetKind};
use glob::Pattern;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Directory keys of `dbt_project.yml` and the kind generated for each
const SOURCE_DIRECTORIES: [(TargetKind, (&str, &str)); 4] = [
    (TargetKind::Model, MODEL_PATHS),
    (TargetKind::Macro, MACRO_PATHS),
    (TargetKind::Test, TEST_PATHS),
    (TargetKind::File, SEED_PATHS),
];

/// Generate every target owned by `project`, sorted by address.
pub fn generate_targets(
    build_root: &Path,
    project: &ProjectTarget,
    spec: &ProjectSpec,
) -> CoreResult<Vec<Target>> {
    let generator = project.address();
    let mut generated: BTreeMap<Address, Target> = BTreeMap::new();
    let mut insert = |target: Target| {
        if generated.contains_key(&target.address) {
            log::debug!("{} already generated, skipping", target.address);
        } else {
            generated.insert(target.address.clone(), target);
        }
    };

    for (kind, key) in SOURCE_DIRECTORIES {
        let dirpaths = spec.path_list(key);
        let kinds = [kind, TargetKind::Config, TargetKind::Doc];
        for target in construct_targets_in_path(build_root, project, &dirpaths, &kinds)? {
            insert(target);
        }
    }

    for rel in [
        project.project_file(),
        project.packages_file(),
        project.profiles_file(),
    ] {
        let file = paths::join(generator.spec_path(), rel);
        if build_root.join(&file).is_file() {
            insert(
                Target::new(generator.create_file(rel), TargetKind::GeneratorSourcesHelper)
                    .with_source(file),
            );
        }
    }

    for package in spec.third_party_packages() {
        let name = package.target_name(generator)?;
        let mut target = Target::new(
            generator.create_generated(&name),
            TargetKind::ThirdPartyPackage,
        );
        target.package = Some(package.clone());
        insert(target);
    }

    let used: BTreeSet<&str> = generated
        .values()
        .filter_map(|t| t.address.generated_name())
        .collect();
    for key in project.overrides().keys() {
        if !used.contains(paths::normalize(key).as_str()) {
            log::warn!(
                "Override for `{}` on {} matches no generated target",
                key,
                generator
            );
        }
    }

    log::debug!("Generated {} targets for {}", generated.len(), generator);
    Ok(generated.into_values().collect())
}

/// Generate targets of each kind in `kinds` for files under `dirpaths`
/// (relative to the project directory).
pub fn construct_targets_in_path(
    build_root: &Path,
    project: &ProjectTarget,
    dirpaths: &[String],
    kinds: &[TargetKind],
) -> CoreResult<Vec<Target>> {
    let generator = project.address();
    log::debug!(
        "Checking path(s) {} for {} targets",
        dirpaths.join(", "),
        kinds
            .iter()
            .map(|k| k.alias())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let mut targets = Vec::new();
    for &kind in kinds {
        for dirpath in dirpaths {
            let dir = paths::join(&project.project_dir(), dirpath);
            for ext in kind.expected_file_extensions() {
                for path in glob_files(build_root, &dir, ext)? {
                    let Some(file) = paths::to_relative_string(&path, build_root) else {
                        continue;
                    };
                    let relative = paths::relpath(&file, generator.spec_path());
                    let mut target = Target::new(generator.create_generated(&relative), kind)
                        .with_source(file);
                    target.dependencies = project.dependencies().to_vec();
                    target.tags = project.tags().to_vec();
                    if let Some(overrides) = project.overrides().get(&relative) {
                        target.apply_overrides(overrides, generator)?;
                    }
                    targets.push(target);
                }
            }
        }
    }
    Ok(targets)
}

/// Files matching `<dir>/**/*<ext>` beneath the build root
fn glob_files(build_root: &Path, dir: &str, ext: &str) -> CoreResult<Vec<PathBuf>> {
    let base = if dir.is_empty() {
        build_root.to_path_buf()
    } else {
        build_root.join(dir)
    };
    if !base.is_dir() {
        return Ok(Vec::new());
    }
    let pattern = format!(
        "{}/**/*{}",
        Pattern::escape(&base.display().to_string()),
        ext
    );
    let entries = glob::glob(&pattern).map_err(|e| CoreError::GlobPattern {
        pattern: pattern.clone(),
        message: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?;
        if path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}

#[cfg(test)]
#[path = "generate_test.rs"]
mod tests;
