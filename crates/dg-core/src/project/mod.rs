//! dbt project targets and their loaded `dbt_project.yml`

mod loading;

pub use loading::load_project_spec;

use crate::address::Address;
use crate::env_vars::EnvVarsField;
use crate::error::{CoreError, CoreResult};
use crate::package::{PackageSpec, PackagesFileKind};
use crate::paths;
use crate::specifier::SpecifierSet;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

/// Per-file field overrides, keyed by path relative to the declaring directory
pub type Overrides = BTreeMap<String, Mapping>;

/// A `dbt_project` entry as written in a `BUILD.yml`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectTargetDecl {
    /// Target name within the declaring directory
    #[serde(default = "default_target_name")]
    pub name: String,

    /// Path to `dbt_project.yml`
    #[serde(default = "default_project_file")]
    pub project_file: String,

    /// Path to `profiles.yml`
    #[serde(default = "default_profiles_file")]
    pub profiles_file: String,

    /// Path to the package manifest
    #[serde(default = "default_packages_file")]
    pub packages_file: String,

    /// dbt adapters this project may run with, e.g. `dbt-duckdb`
    pub required_adapters: Vec<String>,

    /// Environment passed to every dbt invocation
    #[serde(default)]
    pub env_vars: EnvVarsField,

    /// Profile target passed as `--target`
    #[serde(default)]
    pub profile_target: Option<String>,

    /// Python resolve supplying dbt and its adapters
    #[serde(default)]
    pub resolve: Option<String>,

    /// Explicit dependencies, copied onto every generated target
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Field overrides for individual generated files
    #[serde(default)]
    pub overrides: Overrides,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub description: Option<String>,
}

fn default_target_name() -> String {
    "project".to_string()
}

fn default_project_file() -> String {
    "dbt_project.yml".to_string()
}

fn default_profiles_file() -> String {
    "profiles.yml".to_string()
}

fn default_packages_file() -> String {
    "packages.yml".to_string()
}

/// A validated `dbt_project` target: the generator for every dbt component
/// target of one project.
#[derive(Debug, Clone)]
pub struct ProjectTarget {
    address: Address,
    project_file: String,
    profiles_file: String,
    packages_file: String,
    packages_file_kind: PackagesFileKind,
    required_adapters: Vec<String>,
    env_vars: EnvVarsField,
    profile_target: Option<String>,
    resolve: String,
    dependencies: Vec<Address>,
    overrides: Overrides,
    tags: Vec<String>,
    description: Option<String>,
}

impl ProjectTarget {
    /// Target alias used in `BUILD.yml`
    pub const ALIAS: &'static str = "dbt_project";

    /// Validate a declaration found in directory `spec_path`
    pub fn from_decl(
        spec_path: &str,
        decl: ProjectTargetDecl,
        default_resolve: &str,
    ) -> CoreResult<Self> {
        let address = Address::new(spec_path, Some(&decl.name));

        validate_hardcoded(&address, "project_file", &decl.project_file, &["dbt_project.yml"])?;
        validate_hardcoded(&address, "profiles_file", &decl.profiles_file, &["profiles.yml"])?;
        validate_hardcoded(
            &address,
            "packages_file",
            &decl.packages_file,
            &PackagesFileKind::VALID_BASENAMES,
        )?;
        let packages_file_kind = PackagesFileKind::from_path(&decl.packages_file).ok_or_else(|| {
            CoreError::InvalidField {
                address: address.to_string(),
                field: "packages_file".to_string(),
                message: format!("unrecognized package manifest `{}`", decl.packages_file),
            }
        })?;

        let dependencies = decl
            .dependencies
            .iter()
            .map(|dep| Address::parse(dep, spec_path))
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(Self {
            project_file: paths::normalize(&decl.project_file),
            profiles_file: paths::normalize(&decl.profiles_file),
            packages_file: paths::normalize(&decl.packages_file),
            packages_file_kind,
            required_adapters: decl.required_adapters,
            env_vars: decl.env_vars,
            profile_target: decl.profile_target.filter(|t| !t.is_empty()),
            resolve: decl
                .resolve
                .unwrap_or_else(|| default_resolve.to_string()),
            dependencies,
            overrides: decl.overrides,
            tags: decl.tags,
            description: decl.description,
            address,
        })
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// `project_file` relative to the declaring directory
    pub fn project_file(&self) -> &str {
        &self.project_file
    }

    pub fn profiles_file(&self) -> &str {
        &self.profiles_file
    }

    pub fn packages_file(&self) -> &str {
        &self.packages_file
    }

    pub fn packages_file_kind(&self) -> PackagesFileKind {
        self.packages_file_kind
    }

    /// Build-root-relative path of `dbt_project.yml`
    pub fn project_file_path(&self) -> String {
        paths::join(self.address.spec_path(), &self.project_file)
    }

    pub fn profiles_file_path(&self) -> String {
        paths::join(self.address.spec_path(), &self.profiles_file)
    }

    pub fn packages_file_path(&self) -> String {
        paths::join(self.address.spec_path(), &self.packages_file)
    }

    /// Directory holding `dbt_project.yml`, relative to the build root
    pub fn project_dir(&self) -> String {
        paths::join(self.address.spec_path(), paths::dirname(&self.project_file))
    }

    /// Directory holding `profiles.yml`, relative to the build root
    pub fn profiles_dir(&self) -> String {
        paths::join(self.address.spec_path(), paths::dirname(&self.profiles_file))
    }

    pub fn required_adapters(&self) -> &[String] {
        &self.required_adapters
    }

    pub fn env_vars(&self) -> &EnvVarsField {
        &self.env_vars
    }

    pub fn profile_target(&self) -> Option<&str> {
        self.profile_target.as_deref()
    }

    pub fn resolve(&self) -> &str {
        &self.resolve
    }

    pub fn dependencies(&self) -> &[Address] {
        &self.dependencies
    }

    pub fn overrides(&self) -> &Overrides {
        &self.overrides
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

fn validate_hardcoded(
    address: &Address,
    field: &str,
    value: &str,
    choices: &[&str],
) -> CoreResult<()> {
    if choices.contains(&paths::basename(value)) {
        return Ok(());
    }
    let quoted: Vec<String> = choices.iter().map(|c| format!("'{}'", c)).collect();
    let expected = match quoted.split_last() {
        Some((last, rest)) if !rest.is_empty() => {
            format!("one of {} or {}", rest.join(", "), last)
        }
        _ => quoted.join(""),
    };
    Err(CoreError::InvalidField {
        address: address.to_string(),
        field: field.to_string(),
        message: format!("must equal {}", expected),
    })
}

/// Source directory keys of `dbt_project.yml` with dbt's defaults
pub const MODEL_PATHS: (&str, &str) = ("model-paths", "models");
pub const MACRO_PATHS: (&str, &str) = ("macro-paths", "macros");
pub const TEST_PATHS: (&str, &str) = ("test-paths", "tests");
pub const SEED_PATHS: (&str, &str) = ("seed-paths", "seeds");

/// Loaded contents of a project's `dbt_project.yml` and package manifest
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSpec {
    project_spec: Mapping,
    digest: String,
    packages: Vec<PackageSpec>,
}

impl ProjectSpec {
    pub fn new(project_spec: Mapping, digest: String, packages: Vec<PackageSpec>) -> Self {
        Self {
            project_spec,
            digest,
            packages,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.project_spec.get(key)
    }

    pub fn contents(&self) -> &Mapping {
        &self.project_spec
    }

    /// SHA-256 fingerprint of `dbt_project.yml`
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Every entry of the package manifest, in declaration order
    pub fn packages(&self) -> &[PackageSpec] {
        &self.packages
    }

    pub fn third_party_packages(&self) -> impl Iterator<Item = &PackageSpec> {
        self.packages.iter().filter(|p| p.is_third_party())
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }

    pub fn profile(&self) -> Option<&str> {
        self.get("profile").and_then(Value::as_str)
    }

    /// dbt's output directory, relative to the project directory
    pub fn target_path(&self) -> &str {
        self.get("target-path")
            .and_then(Value::as_str)
            .unwrap_or("target")
    }

    /// `requires-dbt-version` as one specifier set. A list of clauses is
    /// joined with commas; a missing key yields an empty set.
    pub fn requires_dbt_version(&self) -> CoreResult<SpecifierSet> {
        let joined = match self.get("requires-dbt-version") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Sequence(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().map(String::from).ok_or_else(|| {
                        CoreError::invalid_project(
                            "`requires-dbt-version` entries must be strings",
                            self.name(),
                        )
                    })
                })
                .collect::<CoreResult<Vec<_>>>()?
                .join(","),
            Some(_) => {
                return Err(CoreError::invalid_project(
                    "`requires-dbt-version` must be a string or a list of strings",
                    self.name(),
                ))
            }
        };
        joined.parse()
    }

    /// A list of directories such as `model-paths`, falling back to dbt's default
    pub fn path_list(&self, (key, default): (&str, &str)) -> Vec<String> {
        match self.get(key) {
            Some(Value::String(s)) => vec![s.clone()],
            Some(Value::Sequence(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect(),
            _ => vec![default.to_string()],
        }
    }
}

#[cfg(test)]
#[path = "project_test.rs"]
mod tests;
