//! Version specifiers and the bounded ranges used to gate package-manifest
//! formats on a project's `requires-dbt-version`.
//!
//! Versions and single clauses are full PEP 440 (`1.6`, `1.8.0rc1`,
//! `1.7.0.post1`, `1!1.8.0`) and come from `pep440_rs`. This module adds the
//! range check dbt package formats need on top of them.

use crate::error::{CoreError, CoreResult};
use pep440_rs::Operator;
use std::fmt;
use std::str::FromStr;

pub use pep440_rs::{Version, VersionSpecifier};

/// Parse a single version, mapping failures into [`CoreError::InvalidVersion`]
pub fn parse_version(version: &str) -> CoreResult<Version> {
    Version::from_str(version.trim()).map_err(|e| CoreError::InvalidVersion {
        version: version.to_string(),
        reason: e.to_string(),
    })
}

/// Whether a clause with this operator bounds versions from below
fn is_lower_bound(operator: Operator) -> bool {
    matches!(
        operator,
        Operator::Equal
            | Operator::EqualStar
            | Operator::GreaterThan
            | Operator::GreaterThanEqual
            | Operator::TildeEqual
    )
}

/// Whether a clause with this operator bounds versions from above
fn is_upper_bound(operator: Operator) -> bool {
    matches!(
        operator,
        Operator::Equal
            | Operator::EqualStar
            | Operator::LessThan
            | Operator::LessThanEqual
            | Operator::TildeEqual
    )
}

/// Exclusive upper bound implied by a compatible-release (`~=`) version.
///
/// `~=1.4.2` admits everything below `1.5`: the last release segment is
/// dropped and the new last one bumped. `None` below two segments.
pub fn compatible_upper_bound(version: &Version) -> Option<Version> {
    let release = version.release();
    if release.len() < 2 {
        return None;
    }
    let mut bumped = release[..release.len() - 1].to_vec();
    if let Some(last) = bumped.last_mut() {
        *last += 1;
    }
    Some(Version::new(bumped))
}

/// Version a clause is compared with when testing a range maximum
fn upper_bound(spec: &VersionSpecifier) -> Version {
    match spec.operator() {
        Operator::TildeEqual => {
            compatible_upper_bound(spec.version()).unwrap_or_else(|| spec.version().clone())
        }
        _ => spec.version().clone(),
    }
}

/// A comma-separated conjunction of specifiers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecifierSet(Vec<VersionSpecifier>);

impl SpecifierSet {
    pub fn new(specifiers: Vec<VersionSpecifier>) -> Self {
        Self(specifiers)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VersionSpecifier> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<'a> IntoIterator for &'a SpecifierSet {
    type Item = &'a VersionSpecifier;
    type IntoIter = std::slice::Iter<'a, VersionSpecifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromStr for SpecifierSet {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        s.split(',')
            .map(str::trim)
            .filter(|clause| !clause.is_empty())
            .map(|clause| {
                VersionSpecifier::from_str(clause).map_err(|e| CoreError::InvalidSpecifier {
                    specifier: clause.to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<CoreResult<Vec<_>>>()
            .map(Self)
    }
}

impl fmt::Display for SpecifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|s| s.to_string()).collect();
        f.write_str(&parts.join(","))
    }
}

/// A version interval with optional, independently inclusive bounds.
///
/// `None` on either side means unbounded on that side. When both are set,
/// `min <= max` is assumed and not checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecifierRange {
    pub min_version: Option<Version>,
    pub min_inclusive: bool,
    pub max_version: Option<Version>,
    pub max_inclusive: bool,
}

impl SpecifierRange {
    /// Build a range from version strings
    pub fn new(
        min_version: Option<&str>,
        min_inclusive: bool,
        max_version: Option<&str>,
        max_inclusive: bool,
    ) -> CoreResult<Self> {
        Ok(Self {
            min_version: min_version.map(parse_version).transpose()?,
            min_inclusive,
            max_version: max_version.map(parse_version).transpose()?,
            max_inclusive,
        })
    }

    /// `>=min` with no upper bound
    pub fn at_least(min_version: Version) -> Self {
        Self {
            min_version: Some(min_version),
            min_inclusive: true,
            max_version: None,
            max_inclusive: false,
        }
    }

    /// True when every lower-bound clause starts at or above this range's minimum.
    ///
    /// A `>` clause excludes its own version, so it may sit exactly on an
    /// exclusive minimum.
    pub fn test_mins<'a>(&self, specs: impl IntoIterator<Item = &'a VersionSpecifier>) -> bool {
        let Some(base) = &self.min_version else {
            return true;
        };
        specs.into_iter().all(|spec| {
            if self.min_inclusive || *spec.operator() == Operator::GreaterThan {
                base <= spec.version()
            } else {
                base < spec.version()
            }
        })
    }

    /// True when every upper-bound clause stops at or below this range's maximum.
    pub fn test_maxs<'a>(&self, specs: impl IntoIterator<Item = &'a VersionSpecifier>) -> bool {
        let Some(base) = &self.max_version else {
            return true;
        };
        specs.into_iter().all(|spec| {
            let version = upper_bound(spec);
            if self.max_inclusive || *spec.operator() == Operator::LessThan {
                *base >= version
            } else {
                *base > version
            }
        })
    }

    /// Whether every version admitted by `specs` lies inside this range.
    ///
    /// A bounded side needs at least one clause bounding that side; without
    /// one the set is open-ended there and cannot be a subset.
    pub fn is_subset(&self, specs: &SpecifierSet) -> bool {
        let mins: Vec<&VersionSpecifier> = specs
            .iter()
            .filter(|s| is_lower_bound(*s.operator()))
            .collect();
        let maxs: Vec<&VersionSpecifier> = specs
            .iter()
            .filter(|s| is_upper_bound(*s.operator()))
            .collect();

        let min_ok = self.min_version.is_none() || (!mins.is_empty() && self.test_mins(mins));
        let max_ok = self.max_version.is_none() || (!maxs.is_empty() && self.test_maxs(maxs));

        log::debug!(
            "Range '{}' against '{}': lower bound ok = {}, upper bound ok = {}",
            self,
            specs,
            min_ok,
            max_ok
        );
        min_ok && max_ok
    }
}

impl fmt::Display for SpecifierRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(min) = &self.min_version {
            let op = if self.min_inclusive { ">=" } else { ">" };
            parts.push(format!("{}{}", op, min));
        }
        if let Some(max) = &self.max_version {
            let op = if self.max_inclusive { "<=" } else { "<" };
            parts.push(format!("{}{}", op, max));
        }
        f.write_str(&parts.join(","))
    }
}

#[cfg(test)]
#[path = "specifier_test.rs"]
mod tests;
