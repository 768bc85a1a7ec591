//! Target addresses within a build root.
//!
//! An address names a target by the directory holding its `BUILD.yml`
//! (`spec_path`) and a target name. Targets produced by a generator (the
//! `dbt_project` target) carry either a generated name or a file path
//! relative to the generator's directory:
//!
//! | form                   | example                          |
//! |------------------------|----------------------------------|
//! | plain target           | `analytics:project`              |
//! | generated target       | `analytics:project#models/a.sql` |
//! | file target            | `analytics/dbt_project.yml`      |
//! | target at build root   | `//:project`                     |

use crate::error::{CoreError, CoreResult};
use crate::paths;
use serde::{Serialize, Serializer};
use std::fmt;

/// A target address
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    spec_path: String,
    target_name: Option<String>,
    generated_name: Option<String>,
    relative_file_path: Option<String>,
}

impl Address {
    /// Create the address of a declared (non-generated) target.
    ///
    /// A `target_name` equal to the directory name is stored as implicit.
    pub fn new(spec_path: &str, target_name: Option<&str>) -> Self {
        let spec_path = paths::normalize(spec_path);
        let target_name = target_name
            .filter(|name| !name.is_empty() && *name != paths::basename(&spec_path))
            .map(String::from);
        Self {
            spec_path,
            target_name,
            generated_name: None,
            relative_file_path: None,
        }
    }

    /// Parse an address spec, resolving `:name` shorthand against `relative_to`.
    pub fn parse(spec: &str, relative_to: &str) -> CoreResult<Self> {
        let invalid = |reason: &str| CoreError::InvalidAddress {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = spec.trim();
        if trimmed.is_empty() {
            return Err(invalid("address is empty"));
        }

        let (body, generated) = match trimmed.split_once('#') {
            Some((_, "")) => return Err(invalid("generated name after `#` is empty")),
            Some((body, generated)) => (body, Some(generated)),
            None => (trimmed, None),
        };

        let (path_part, name_part) = match body.rsplit_once(':') {
            Some((_, "")) => return Err(invalid("target name after `:` is empty")),
            Some((path, name)) => (path, Some(name)),
            None => (body, None),
        };

        let path_part = if let Some(rooted) = path_part.strip_prefix("//") {
            rooted.to_string()
        } else if path_part.is_empty() {
            relative_to.to_string()
        } else {
            path_part.to_string()
        };
        let path_part = paths::normalize(&path_part);

        if path_part.starts_with("..") {
            return Err(invalid("address escapes the build root"));
        }

        if let Some(generated) = generated {
            let base = Self::new(&path_part, name_part);
            return Ok(base.create_generated(generated));
        }

        let file_name = paths::basename(&path_part);
        if file_name.contains('.') {
            let base = Self::new(paths::dirname(&path_part), name_part);
            return Ok(base.create_file(file_name));
        }

        Ok(Self::new(&path_part, name_part))
    }

    /// Directory of the BUILD file declaring this target
    pub fn spec_path(&self) -> &str {
        &self.spec_path
    }

    /// Target name, falling back to the directory name when implicit
    pub fn target_name(&self) -> &str {
        match &self.target_name {
            Some(name) => name,
            None => paths::basename(&self.spec_path),
        }
    }

    /// Name of a target produced by a generator
    pub fn generated_name(&self) -> Option<&str> {
        self.generated_name.as_deref()
    }

    /// File path (relative to `spec_path`) of a file-addressed target
    pub fn relative_file_path(&self) -> Option<&str> {
        self.relative_file_path.as_deref()
    }

    /// Whether this address was produced by a target generator
    pub fn is_generated_target(&self) -> bool {
        self.generated_name.is_some() || self.relative_file_path.is_some()
    }

    /// Address of a generated target owned by this generator
    pub fn create_generated(&self, generated_name: &str) -> Self {
        Self {
            spec_path: self.spec_path.clone(),
            target_name: self.target_name.clone(),
            generated_name: Some(generated_name.to_string()),
            relative_file_path: None,
        }
    }

    /// Address of a file target owned by this generator
    pub fn create_file(&self, relative_file_path: &str) -> Self {
        Self {
            spec_path: self.spec_path.clone(),
            target_name: self.target_name.clone(),
            generated_name: None,
            relative_file_path: Some(paths::normalize(relative_file_path)),
        }
    }

    /// Strip the generated part, yielding the generator's own address
    pub fn maybe_convert_to_target_generator(&self) -> Self {
        Self {
            spec_path: self.spec_path.clone(),
            target_name: self.target_name.clone(),
            generated_name: None,
            relative_file_path: None,
        }
    }

    /// Build-root-relative file path for file-addressed targets
    pub fn filename(&self) -> Option<String> {
        self.relative_file_path
            .as_deref()
            .map(|rel| paths::join(&self.spec_path, rel))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(file) = self.filename() {
            f.write_str(&file)?;
            if let Some(name) = &self.target_name {
                write!(f, ":{}", name)?;
            }
            return Ok(());
        }

        if self.spec_path.is_empty() {
            write!(f, "//:{}", self.target_name())?;
        } else {
            f.write_str(&self.spec_path)?;
            if let Some(name) = &self.target_name {
                write!(f, ":{}", name)?;
            }
        }
        if let Some(generated) = &self.generated_name {
            write!(f, "#{}", generated)?;
        }
        Ok(())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
#[path = "address_test.rs"]
mod tests;
