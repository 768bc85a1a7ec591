//! dbt package manifests and third-party package entries

use crate::address::Address;
use crate::error::{CoreError, CoreResult};
use crate::paths;
use crate::specifier::{SpecifierRange, Version};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::fmt;

/// Keys that mark a package entry as coming from outside the project
pub const THIRD_PARTY_KEYS: [&str; 3] = ["package", "git", "tarball"];

/// Recognized package manifest formats, keyed by file basename
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackagesFileKind {
    /// Legacy `packages.yml`, accepted by every dbt version
    Packages,
    /// `dependencies.yml`, introduced in dbt 1.6
    Dependencies,
    /// `package-lock.yml`, introduced in dbt 1.7
    PackageLock,
}

impl PackagesFileKind {
    pub const VALID_BASENAMES: [&'static str; 3] =
        ["packages.yml", "dependencies.yml", "package-lock.yml"];

    pub fn from_basename(basename: &str) -> Option<Self> {
        match basename {
            "packages.yml" => Some(Self::Packages),
            "dependencies.yml" => Some(Self::Dependencies),
            "package-lock.yml" => Some(Self::PackageLock),
            _ => None,
        }
    }

    /// Classify a path by its basename
    pub fn from_path(path: &str) -> Option<Self> {
        Self::from_basename(paths::basename(path))
    }

    pub fn basename(self) -> &'static str {
        match self {
            Self::Packages => "packages.yml",
            Self::Dependencies => "dependencies.yml",
            Self::PackageLock => "package-lock.yml",
        }
    }

    /// dbt versions a project must be restricted to before it may use this
    /// format. `None` for the legacy format, which needs no check.
    pub fn required_version_range(self) -> Option<SpecifierRange> {
        match self {
            Self::Packages => None,
            Self::Dependencies => Some(SpecifierRange::at_least(Version::new([1u64, 6]))),
            Self::PackageLock => Some(SpecifierRange::at_least(Version::new([1u64, 7]))),
        }
    }
}

impl fmt::Display for PackagesFileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.basename())
    }
}

/// One entry under the `packages` header of a package manifest.
///
/// Entries are kept as raw mappings; only the keys that identify a package
/// are interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageSpec(Mapping);

impl PackageSpec {
    pub fn new(mapping: Mapping) -> Self {
        Self(mapping)
    }

    /// Validate that a raw YAML value is a mapping
    pub fn from_value(value: &Value, address: &Address) -> CoreResult<Self> {
        match value {
            Value::Mapping(mapping) => Ok(Self(mapping.clone())),
            other => Err(CoreError::InvalidField {
                address: address.to_string(),
                field: "specification".to_string(),
                message: format!("expected a mapping, got {}", describe_value(other)),
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn contents(&self) -> &Mapping {
        &self.0
    }

    /// Whether this entry names a hub package, git repository or tarball
    /// rather than a local directory
    pub fn is_third_party(&self) -> bool {
        THIRD_PARTY_KEYS.iter().any(|key| self.0.contains_key(*key))
    }

    /// Name of the generated target representing this package.
    ///
    /// * `package: org/name` gives `name`
    /// * `tarball` entries must carry an explicit `name`
    /// * `git` URLs give their path without scheme, host or `.git` suffix
    pub fn target_name(&self, address: &Address) -> CoreResult<String> {
        let invalid = |message: String| CoreError::InvalidField {
            address: address.to_string(),
            field: "specification".to_string(),
            message,
        };

        if let Some(package) = self.get("package") {
            let package = package
                .as_str()
                .ok_or_else(|| invalid("`package` must be a string".to_string()))?;
            return Ok(paths::basename(package.trim_end_matches('/')).to_string());
        }
        if self.0.contains_key("tarball") {
            return self
                .get_str("name")
                .map(String::from)
                .ok_or_else(|| invalid("`tarball` packages must declare a `name`".to_string()));
        }
        if let Some(git) = self.get("git") {
            let git = git
                .as_str()
                .ok_or_else(|| invalid("`git` must be a string".to_string()))?;
            return Ok(git_package_name(git));
        }
        Err(invalid(format!(
            "local packages have no target name; expected one of {}",
            THIRD_PARTY_KEYS.join(", ")
        )))
    }

    /// Package name dbt reports as `package_name` for nodes from this entry.
    ///
    /// An explicit `name` wins; otherwise the last segment of the target name.
    pub fn package_name(&self, target_name: &str) -> String {
        match self.get_str("name") {
            Some(name) => name.to_string(),
            None => paths::basename(target_name).to_string(),
        }
    }
}

/// Reduce a git remote to its repository path.
///
/// `https://github.com/org/repo.git` and `git@github.com:org/repo.git` both
/// become `org/repo`.
pub fn git_package_name(url: &str) -> String {
    let url = url.trim();
    let without_host = if let Some((_, rest)) = url.split_once("://") {
        rest.find('/').map_or("", |idx| &rest[idx..])
    } else if let Some((_, rest)) = url.split_once(':') {
        rest
    } else {
        url
    };
    let path = without_host.trim_matches('/');
    path.strip_suffix(".git").unwrap_or(path).to_string()
}

fn describe_value(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
#[path = "package_test.rs"]
mod tests;
