//! Environment variables passed to dbt for a project

use crate::address::Address;
use crate::error::{CoreError, CoreResult};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Resolved environment for a dbt invocation
pub type DbtEnvVars = BTreeMap<String, String>;

/// The `env_vars` field of a `dbt_project` declaration.
///
/// Accepts a mapping, a list of `NAME=VALUE` strings, or the path of a file
/// (relative to the declaring directory) holding one assignment per line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvVarsField {
    File(String),
    Mapping(BTreeMap<String, String>),
    List(Vec<String>),
}

impl Default for EnvVarsField {
    fn default() -> Self {
        EnvVarsField::Mapping(BTreeMap::new())
    }
}

/// Split a `NAME=VALUE` assignment, stripping one layer of matching quotes
/// from the value. Returns `None` when there is no `=`.
pub fn parse_env_assignment(entry: &str) -> Option<(String, String)> {
    let (name, value) = entry.split_once('=')?;
    Some((name.trim().to_string(), strip_matching_quotes(value).to_string()))
}

fn strip_matching_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(&first), Some(&last))
            if value.len() >= 2 && first == last && (first == b'"' || first == b'\'') =>
        {
            &value[1..value.len() - 1]
        }
        _ => value,
    }
}

/// Resolve an `env_vars` field into concrete variables.
pub fn hydrate_env_vars(
    build_root: &Path,
    address: &Address,
    field: &EnvVarsField,
) -> CoreResult<DbtEnvVars> {
    match field {
        EnvVarsField::Mapping(mapping) => Ok(mapping.clone()),
        EnvVarsField::List(entries) => entries
            .iter()
            .map(|entry| parse_entry(address, entry))
            .collect(),
        EnvVarsField::File(file) if file.trim().is_empty() => Ok(DbtEnvVars::new()),
        EnvVarsField::File(file) => {
            let rel_path = paths::join(address.spec_path(), file);
            let full_path = build_root.join(&rel_path);
            if !full_path.is_file() {
                return Err(CoreError::EnvFileNotFound { path: rel_path });
            }
            let content =
                std::fs::read_to_string(&full_path).map_err(|e| CoreError::IoWithPath {
                    path: full_path.display().to_string(),
                    source: e,
                })?;
            log::debug!("Loading environment for {} from {}", address, rel_path);
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(|line| parse_entry(address, line))
                .collect()
        }
    }
}

fn parse_entry(address: &Address, entry: &str) -> CoreResult<(String, String)> {
    parse_env_assignment(entry).ok_or_else(|| CoreError::InvalidField {
        address: address.to_string(),
        field: "env_vars".to_string(),
        message: format!("expected `NAME=VALUE`, got `{}`", entry),
    })
}

#[cfg(test)]
#[path = "env_vars_test.rs"]
mod tests;
