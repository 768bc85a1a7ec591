//! Build-graph targets produced for a dbt project

use crate::address::Address;
use crate::error::{CoreError, CoreResult};
use crate::package::PackageSpec;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::fmt;

/// Kind of a target, named by its `BUILD.yml` alias
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TargetKind {
    #[serde(rename = "dbt_project")]
    Project,
    #[serde(rename = "dbt_model")]
    Model,
    #[serde(rename = "dbt_macro")]
    Macro,
    #[serde(rename = "dbt_test")]
    Test,
    #[serde(rename = "dbt_doc")]
    Doc,
    #[serde(rename = "dbt_config")]
    Config,
    #[serde(rename = "dbt_third_party_package")]
    ThirdPartyPackage,
    /// Seed files and other plain files
    #[serde(rename = "file")]
    File,
    /// Carries the project, packages and profiles files of a generator
    #[serde(rename = "_generator_sources_helper")]
    GeneratorSourcesHelper,
    #[serde(rename = "python_requirement")]
    PythonRequirement,
}

impl TargetKind {
    pub fn alias(self) -> &'static str {
        match self {
            TargetKind::Project => "dbt_project",
            TargetKind::Model => "dbt_model",
            TargetKind::Macro => "dbt_macro",
            TargetKind::Test => "dbt_test",
            TargetKind::Doc => "dbt_doc",
            TargetKind::Config => "dbt_config",
            TargetKind::ThirdPartyPackage => "dbt_third_party_package",
            TargetKind::File => "file",
            TargetKind::GeneratorSourcesHelper => "_generator_sources_helper",
            TargetKind::PythonRequirement => "python_requirement",
        }
    }

    /// File extensions a generated target of this kind is created for
    pub fn expected_file_extensions(self) -> &'static [&'static str] {
        match self {
            TargetKind::Model => &[".sql", ".py"],
            TargetKind::Macro | TargetKind::Test => &[".sql"],
            TargetKind::Doc => &[".md"],
            TargetKind::Config => &[".yml", ".yaml"],
            TargetKind::File => &[".csv"],
            _ => &[],
        }
    }

    /// dbt source files, whose dependencies are inferred from the manifest
    pub fn is_dbt_source(self) -> bool {
        matches!(
            self,
            TargetKind::Model
                | TargetKind::Macro
                | TargetKind::Test
                | TargetKind::Doc
                | TargetKind::Config
        )
    }

    /// Targets matched against a node's `original_file_path`
    pub fn is_indexable_file(self) -> bool {
        self.is_dbt_source() || self == TargetKind::File
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.alias())
    }
}

/// A Python requirement available to dbt projects in a resolve
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PythonRequirement {
    pub requirements: Vec<String>,
    pub resolve: String,
}

impl PythonRequirement {
    /// Normalized project name of the first requirement string
    pub fn project_name(&self) -> Option<String> {
        self.requirements
            .first()
            .map(|r| requirement_project_name(r))
    }
}

/// Normalized distribution name of a requirement such as `dbt-core~=1.7.0`.
///
/// Runs of `-`, `_` and `.` collapse to `-` and the name is lowercased.
pub fn requirement_project_name(requirement: &str) -> String {
    let name: String = requirement
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    let mut normalized = String::with_capacity(name.len());
    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !normalized.ends_with('-') {
                normalized.push('-');
            }
        } else {
            normalized.push(c.to_ascii_lowercase());
        }
    }
    normalized
}

/// A single build-graph target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Target {
    pub address: Address,
    pub kind: TargetKind,

    /// Build-root-relative path of the single source file, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Explicit dependencies
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Address>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Package entry for `dbt_third_party_package` targets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<PackageSpec>,

    /// Requirement for `python_requirement` targets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirement: Option<PythonRequirement>,
}

impl Target {
    pub fn new(address: Address, kind: TargetKind) -> Self {
        Self {
            address,
            kind,
            source: None,
            dependencies: Vec::new(),
            tags: Vec::new(),
            description: None,
            package: None,
            requirement: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn file_path(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// `package_name` dbt reports for nodes of this third-party package
    pub fn package_name(&self) -> Option<String> {
        let package = self.package.as_ref()?;
        let target_name = self
            .address
            .generated_name()
            .unwrap_or_else(|| self.address.target_name());
        Some(package.package_name(target_name))
    }

    /// Apply per-file overrides from a generator's `overrides` field.
    ///
    /// Only `dependencies`, `tags` and `description` may be overridden.
    pub fn apply_overrides(&mut self, overrides: &Mapping, generator: &Address) -> CoreResult<()> {
        for (key, value) in overrides {
            let field = key.as_str().unwrap_or_default();
            let invalid = |message: &str| CoreError::InvalidField {
                address: generator.to_string(),
                field: format!("overrides.{}", field),
                message: message.to_string(),
            };
            match field {
                "source" | "sources" => {
                    return Err(CoreError::InvalidOverride {
                        address: generator.to_string(),
                        field: field.to_string(),
                    })
                }
                "dependencies" => {
                    self.dependencies = string_list(value)
                        .ok_or_else(|| invalid("expected a list of addresses"))?
                        .iter()
                        .map(|dep| Address::parse(dep, generator.spec_path()))
                        .collect::<CoreResult<Vec<_>>>()?;
                }
                "tags" => {
                    self.tags =
                        string_list(value).ok_or_else(|| invalid("expected a list of strings"))?;
                }
                "description" => {
                    self.description = Some(
                        value
                            .as_str()
                            .ok_or_else(|| invalid("expected a string"))?
                            .to_string(),
                    );
                }
                _ => return Err(invalid("field cannot be overridden")),
            }
        }
        Ok(())
    }
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_sequence()?
        .iter()
        .map(|v| v.as_str().map(String::from))
        .collect()
}

#[cfg(test)]
#[path = "target_test.rs"]
mod tests;
