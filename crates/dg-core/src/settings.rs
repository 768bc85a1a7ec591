//! Workspace settings from dbtgraph.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings file name, looked up at the build root
pub const SETTINGS_FILE: &str = "dbtgraph.yml";

/// Workspace-wide settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Whether `tailor` proposes `dbt_project` targets for unowned projects
    #[serde(default = "default_true")]
    pub tailor_project_targets: bool,

    /// Resolve used by targets that do not name one
    #[serde(default = "default_resolve")]
    pub default_resolve: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tailor_project_targets: true,
            default_resolve: default_resolve(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_resolve() -> String {
    "python-default".to_string()
}

impl Settings {
    /// Load settings from a file
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|e| CoreError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Load `dbtgraph.yml` from the build root, using defaults when it is absent
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let path = dir.join(SETTINGS_FILE);
        if path.is_file() {
            Self::load(&path)
        } else {
            log::debug!("No {} in {}, using defaults", SETTINGS_FILE, dir.display());
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
