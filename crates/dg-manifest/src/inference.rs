//! Dependency inference from the edges dbt records in its manifest

use crate::index::AddressIndex;
use crate::manifest::BuildManifest;
use dg_core::target::requirement_project_name;
use dg_core::{
    paths, Address, CoreError, CoreResult, OwnersLookup, ProjectSpec, ProjectTarget, Target,
    TargetKind, TargetUniverse,
};
use std::collections::{BTreeMap, BTreeSet};

/// Check that `address` was generated by a `dbt_project` target.
///
/// Returns `Ok(false)` after logging a warning when `warn_only` is set,
/// and [`CoreError::UnownedComponent`] otherwise.
pub fn ensure_generated_address(
    address: &Address,
    activity: &str,
    warn_only: bool,
) -> CoreResult<bool> {
    if address.is_generated_target() {
        return Ok(true);
    }
    let err = CoreError::UnownedComponent {
        address: address.to_string(),
        activity: activity.to_string(),
    };
    if warn_only {
        log::warn!("{}", err);
        Ok(false)
    } else {
        Err(err)
    }
}

/// Everything needed to infer dependencies for the targets of one project
pub struct InferenceContext<'a> {
    pub project: &'a ProjectTarget,
    pub spec: &'a ProjectSpec,
    pub manifest: &'a BuildManifest,
    pub index: &'a AddressIndex,
    /// Build-root file ownership, used to resolve `patch_path`
    pub owners: &'a dyn OwnersLookup,
}

impl<'a> InferenceContext<'a> {
    /// Addresses `target` depends on according to the manifest.
    ///
    /// Macros follow `depends_on.macros`; everything else follows
    /// `parent_map`. Models also pick up their non-model children and the
    /// owners of the YAML file named by `patch_path`. The target itself is
    /// never part of the result.
    pub fn infer_component_dependencies(&self, target: &Target) -> BTreeSet<Address> {
        let address = &target.address;
        match ensure_generated_address(address, "infer dependencies", true) {
            Ok(true) => {}
            _ => return BTreeSet::new(),
        }
        let Some(unique_ids) = self.index.unique_ids(address) else {
            log::debug!("{} owns no manifest nodes", address);
            return BTreeSet::new();
        };

        let mut dependencies = BTreeSet::new();
        for unique_id in unique_ids {
            if target.kind == TargetKind::Macro {
                if let Some(node) = self.manifest.node(unique_id) {
                    self.reverse_map(node.depends_on_macros(), &mut dependencies);
                }
                continue;
            }

            self.reverse_map(self.manifest.parents(unique_id), &mut dependencies);
            if target.kind == TargetKind::Model {
                let children = self
                    .manifest
                    .children(unique_id)
                    .into_iter()
                    .filter(|child| {
                        self.manifest
                            .node(child)
                            .map_or(true, |node| node.resource_type() != Some("model"))
                    });
                self.reverse_map(children, &mut dependencies);
                if let Some(file) = self.patch_file(unique_id) {
                    dependencies.extend(self.owners.owners(&file));
                }
            }
        }

        dependencies.remove(address);
        log::debug!("Inferred {} dependencies for {}", dependencies.len(), address);
        dependencies
    }

    /// Inferred dependencies for every target in `targets`
    pub fn infer_all<'t>(
        &self,
        targets: impl IntoIterator<Item = &'t Target>,
    ) -> BTreeMap<Address, BTreeSet<Address>> {
        targets
            .into_iter()
            .filter(|target| target.kind.is_dbt_source() || target.kind == TargetKind::File)
            .map(|target| {
                (
                    target.address.clone(),
                    self.infer_component_dependencies(target),
                )
            })
            .collect()
    }

    fn reverse_map<'u>(
        &self,
        unique_ids: impl IntoIterator<Item = &'u str>,
        into: &mut BTreeSet<Address>,
    ) {
        into.extend(
            unique_ids
                .into_iter()
                .filter_map(|id| self.index.address_for(id))
                .cloned(),
        );
    }

    /// `patch_path` of a node rewritten from `<project>://` to the project directory
    fn patch_file(&self, unique_id: &str) -> Option<String> {
        let patch_path = self.manifest.node(unique_id)?.patch_path()?;
        let prefix = format!("{}://", self.spec.name()?);
        let relative = patch_path.strip_prefix(&prefix)?;
        Some(paths::join(&self.project.project_dir(), relative))
    }
}

/// `python_requirement` targets a project needs at dbt runtime.
///
/// These are the requirements in the project's resolve whose distribution
/// is `dbt-core` or one of the project's `required_adapters`.
pub fn infer_project_dependencies(
    project: &ProjectTarget,
    universe: &TargetUniverse,
) -> BTreeSet<Address> {
    let wanted: BTreeSet<String> = std::iter::once("dbt-core")
        .chain(project.required_adapters().iter().map(String::as_str))
        .map(requirement_project_name)
        .collect();

    universe
        .of_kind(TargetKind::PythonRequirement)
        .filter(|target| {
            target.requirement.as_ref().is_some_and(|req| {
                req.resolve == project.resolve()
                    && req.project_name().is_some_and(|name| wanted.contains(&name))
            })
        })
        .map(|target| target.address.clone())
        .collect()
}

#[cfg(test)]
#[path = "inference_test.rs"]
mod tests;
