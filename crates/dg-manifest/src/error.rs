//! Error types for dg-manifest

use dg_core::CoreError;
use thiserror::Error;

/// Errors raised while loading and querying a dbt manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    /// M001: No manifest at the expected location
    #[error("[M001] dbt manifest not found: {path}")]
    ManifestNotFound { path: String },

    /// M002: Manifest is not a JSON object
    #[error("[M002] Invalid dbt manifest {path}: {message}")]
    InvalidManifest { path: String, message: String },

    /// M003: Inferred dependencies form a cycle
    #[error("[M003] Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// M004: Address is not part of the dependency graph
    #[error("[M004] Target not found: {address}")]
    TargetNotFound { address: String },

    /// IO error with file path context
    #[error("[M005] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// Error from project loading
    #[error(transparent)]
    Core(#[from] CoreError),

    /// JSON parse error
    #[error("[M006] JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for ManifestError
pub type ManifestResult<T> = Result<T, ManifestError>;
