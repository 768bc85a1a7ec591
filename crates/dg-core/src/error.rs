//! Error types for dg-core

use thiserror::Error;

/// Core error type for dbtgraph
#[derive(Error, Debug)]
pub enum CoreError {
    /// P001: The dbt project declaration or its package manifest is invalid
    #[error("[P001] {}", describe_invalid_project(.message, .project_name))]
    InvalidProject {
        message: String,
        project_name: Option<String>,
    },

    /// P002: A target field holds a value it cannot accept
    #[error("[P002] Invalid field `{field}` at address {address}: {message}")]
    InvalidField {
        address: String,
        field: String,
        message: String,
    },

    /// P003: A per-file override touches a field that cannot be overridden
    #[error("[P003] Cannot override field `{field}` for target at address {address}")]
    InvalidOverride { address: String, field: String },

    /// P004: Unparseable version specifier
    #[error("[P004] Invalid version specifier '{specifier}': {reason}")]
    InvalidSpecifier { specifier: String, reason: String },

    /// P005: Unparseable version
    #[error("[P005] Invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// P006: Unparseable target address
    #[error("[P006] Invalid address '{spec}': {reason}")]
    InvalidAddress { spec: String, reason: String },

    /// P007: Environment variable file referenced by a project is missing
    #[error("[P007] Cannot locate environment file at path `{path}`")]
    EnvFileNotFound { path: String },

    /// P008: A dbt component target was declared outside of any dbt project
    #[error("[P008] Unable to {activity} for dbt target at address `{address}`, which exists independent of any dbt project")]
    UnownedComponent { address: String, activity: String },

    /// P009: Invalid glob pattern while enumerating project files
    #[error("[P009] Invalid glob pattern '{pattern}': {message}")]
    GlobPattern { pattern: String, message: String },

    /// P010: Workspace or BUILD file could not be parsed
    #[error("[P010] Failed to parse {path}: {message}")]
    ParseError { path: String, message: String },

    /// IO error
    #[error("[P011] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// IO error with file path context
    #[error("[P012] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// YAML parse error
    #[error("[P013] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

impl CoreError {
    /// Build an [`CoreError::InvalidProject`], attaching the project name when known.
    pub fn invalid_project(message: impl Into<String>, project_name: Option<&str>) -> Self {
        CoreError::InvalidProject {
            message: message.into(),
            project_name: project_name.map(String::from),
        }
    }

    /// Name of the project an error refers to, if it carries one.
    pub fn project_name(&self) -> Option<&str> {
        match self {
            CoreError::InvalidProject { project_name, .. } => project_name.as_deref(),
            _ => None,
        }
    }
}

impl From<glob::GlobError> for CoreError {
    fn from(e: glob::GlobError) -> Self {
        CoreError::IoWithPath {
            path: e.path().display().to_string(),
            source: e.into(),
        }
    }
}

fn describe_invalid_project(message: &str, project_name: &Option<String>) -> String {
    match project_name {
        Some(name) => format!("Project {} is invalid due to: {}", name, message),
        None => message.to_string(),
    }
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
