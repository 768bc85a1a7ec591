//! Workspace discovery: `BUILD.yml` declarations under a build root

use crate::address::Address;
use crate::error::{CoreError, CoreResult};
use crate::generate::generate_targets;
use crate::paths;
use crate::project::{load_project_spec, ProjectSpec, ProjectTarget, ProjectTargetDecl};
use crate::settings::Settings;
use crate::target::{PythonRequirement, Target, TargetKind};
use crate::universe::TargetUniverse;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Target declaration file name
pub const BUILD_FILE: &str = "BUILD.yml";

/// Contents of one `BUILD.yml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildFile {
    #[serde(default)]
    pub dbt_project: Option<ProjectTargetDecl>,

    #[serde(default)]
    pub python_requirements: Vec<PythonRequirementDecl>,
}

/// A `python_requirements` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PythonRequirementDecl {
    pub name: String,
    pub requirements: Vec<String>,
    #[serde(default)]
    pub resolve: Option<String>,
}

/// A project target together with its loaded spec and generated targets
#[derive(Debug, Clone)]
pub struct LoadedProject {
    pub target: ProjectTarget,
    pub spec: ProjectSpec,
    pub targets: Vec<Target>,
}

impl LoadedProject {
    /// The `dbt_project` target itself, as a member of the universe
    pub fn generator_target(&self) -> Target {
        let mut target = Target::new(self.target.address().clone(), TargetKind::Project);
        target.dependencies = self.target.dependencies().to_vec();
        target.tags = self.target.tags().to_vec();
        target.description = self.target.description().map(String::from);
        target
    }
}

/// Every declaration found under a build root
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    settings: Settings,
    projects: Vec<ProjectTarget>,
    requirements: Vec<Target>,
}

impl Workspace {
    /// Discover `BUILD.yml` files under `root`, skipping hidden directories.
    pub fn load(root: &Path) -> CoreResult<Self> {
        let root = if root.is_absolute() {
            root.to_path_buf()
        } else {
            std::env::current_dir()?.join(root)
        };
        let settings = Settings::load_from_dir(&root)?;

        let build_files = discover_build_files(&root)?;

        let mut projects = Vec::new();
        let mut requirements = Vec::new();
        for (spec_path, build_file) in build_files {
            if let Some(decl) = build_file.dbt_project {
                projects.push(ProjectTarget::from_decl(
                    &spec_path,
                    decl,
                    &settings.default_resolve,
                )?);
            }
            for decl in build_file.python_requirements {
                let mut target = Target::new(
                    Address::new(&spec_path, Some(&decl.name)),
                    TargetKind::PythonRequirement,
                );
                target.requirement = Some(PythonRequirement {
                    requirements: decl.requirements,
                    resolve: decl
                        .resolve
                        .unwrap_or_else(|| settings.default_resolve.clone()),
                });
                requirements.push(target);
            }
        }
        projects.sort_by(|a, b| a.address().cmp(b.address()));
        log::debug!(
            "Discovered {} dbt projects and {} python requirements under {}",
            projects.len(),
            requirements.len(),
            root.display()
        );

        Ok(Self {
            root,
            settings,
            projects,
            requirements,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn projects(&self) -> &[ProjectTarget] {
        &self.projects
    }

    pub fn requirements(&self) -> &[Target] {
        &self.requirements
    }

    pub fn project(&self, address: &Address) -> Option<&ProjectTarget> {
        let generator = address.maybe_convert_to_target_generator();
        self.projects.iter().find(|p| *p.address() == generator)
    }

    /// Load the spec of one project and generate its targets
    pub fn load_project(&self, target: &ProjectTarget) -> CoreResult<LoadedProject> {
        let spec = load_project_spec(&self.root, target)?;
        let targets = generate_targets(&self.root, target, &spec)?;
        Ok(LoadedProject {
            target: target.clone(),
            spec,
            targets,
        })
    }

    pub fn load_all(&self) -> CoreResult<Vec<LoadedProject>> {
        self.projects.iter().map(|p| self.load_project(p)).collect()
    }

    /// Every target: project generators, their generated targets and
    /// python requirements
    pub fn universe(&self, loaded: &[LoadedProject]) -> TargetUniverse {
        let generated = loaded.iter().flat_map(|project| {
            std::iter::once(project.generator_target()).chain(project.targets.iter().cloned())
        });
        TargetUniverse::new(generated.chain(self.requirements.iter().cloned()))
    }
}

/// Collect `(spec_path, BuildFile)` for every `BUILD.yml` below `root`, in
/// sorted pre-order. Hidden and symlinked directories are not entered.
fn discover_build_files(root: &Path) -> CoreResult<Vec<(String, BuildFile)>> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

    let mut found = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| CoreError::IoWithPath {
            path: e.path().unwrap_or(root).display().to_string(),
            source: e.into(),
        })?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let build_path = entry.path().join(BUILD_FILE);
        if !build_path.is_file() {
            continue;
        }
        let spec_path = paths::to_relative_string(entry.path(), root).unwrap_or_default();
        found.push((spec_path.clone(), read_build_file(&build_path, &spec_path)?));
    }
    Ok(found)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn read_build_file(build_path: &Path, spec_path: &str) -> CoreResult<BuildFile> {
    let content = std::fs::read_to_string(build_path).map_err(|e| CoreError::IoWithPath {
        path: build_path.display().to_string(),
        source: e,
    })?;
    if content.trim().is_empty() {
        return Ok(BuildFile::default());
    }
    serde_yaml::from_str(&content).map_err(|e| CoreError::ParseError {
        path: paths::join(spec_path, BUILD_FILE),
        message: e.to_string(),
    })
}

#[cfg(test)]
#[path = "workspace_test.rs"]
mod tests;
