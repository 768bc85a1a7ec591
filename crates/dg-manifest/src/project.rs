//! A loaded project paired with its manifest and address index

use crate::error::ManifestResult;
use crate::graph::DependencyGraph;
use crate::index::AddressIndex;
use crate::inference::{infer_project_dependencies, InferenceContext};
use crate::manifest::BuildManifest;
use dg_core::{paths, Address, LoadedProject, TargetUniverse};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// File dbt writes its manifest to inside the target path
pub const MANIFEST_FILE: &str = "manifest.json";

/// Where `dbt parse` leaves the manifest for `project`
pub fn default_manifest_path(build_root: &Path, project: &LoadedProject) -> PathBuf {
    let target_path = paths::join(&project.target.project_dir(), project.spec.target_path());
    build_root.join(paths::join(&target_path, MANIFEST_FILE))
}

/// A project whose manifest has been mapped onto the target universe
#[derive(Debug)]
pub struct IndexedProject<'w> {
    pub project: &'w LoadedProject,
    pub manifest: BuildManifest,
    pub index: AddressIndex,
}

impl<'w> IndexedProject<'w> {
    /// Index `manifest` against the targets `project` generated.
    ///
    /// Other projects' targets are left out so that a package both projects
    /// install maps onto each project's own package target.
    pub fn new(project: &'w LoadedProject, manifest: BuildManifest) -> Self {
        let index = AddressIndex::build(&manifest, &project.target.project_dir(), &project.targets);
        Self {
            project,
            manifest,
            index,
        }
    }

    /// Read the manifest from `manifest_path`, or from the project's target path
    pub fn load(
        build_root: &Path,
        project: &'w LoadedProject,
        manifest_path: Option<&Path>,
    ) -> ManifestResult<Self> {
        let path = match manifest_path {
            Some(path) => path.to_path_buf(),
            None => default_manifest_path(build_root, project),
        };
        let manifest = BuildManifest::load(project.target.address().clone(), &path)?;
        Ok(Self::new(project, manifest))
    }

    pub fn context<'a>(&'a self, universe: &'a TargetUniverse) -> InferenceContext<'a> {
        InferenceContext {
            project: &self.project.target,
            spec: &self.project.spec,
            manifest: &self.manifest,
            index: &self.index,
            owners: universe,
        }
    }

    /// Inferred dependencies of the project and each of its generated targets
    pub fn dependencies(&self, universe: &TargetUniverse) -> BTreeMap<Address, BTreeSet<Address>> {
        let mut dependencies = self.context(universe).infer_all(&self.project.targets);
        dependencies.insert(
            self.project.target.address().clone(),
            infer_project_dependencies(&self.project.target, universe),
        );
        dependencies
    }
}

/// Dependency graph across every indexed project
pub fn build_dependency_graph(
    projects: &[IndexedProject<'_>],
    universe: &TargetUniverse,
) -> DependencyGraph {
    let mut dependencies = BTreeMap::new();
    for project in projects {
        dependencies.extend(project.dependencies(universe));
    }
    DependencyGraph::build(&dependencies)
}

#[cfg(test)]
#[path = "project_test.rs"]
mod tests;
