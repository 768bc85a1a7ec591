//! dg-manifest - dbt manifest indexing for dbtgraph
//!
//! This crate reads the `manifest.json` dbt produces for a project, maps its
//! nodes onto target addresses, and infers the dependencies between targets
//! from the edges dbt recorded.

pub mod codegen;
pub mod error;
pub mod graph;
pub mod index;
pub mod inference;
pub mod manifest;
pub mod project;

pub use codegen::compiled_sql_paths;
pub use error::{ManifestError, ManifestResult};
pub use graph::DependencyGraph;
pub use index::AddressIndex;
pub use inference::{ensure_generated_address, infer_project_dependencies, InferenceContext};
pub use manifest::{index_nodes, BuildManifest, ManifestNode, NodeIndex};
pub use project::{build_dependency_graph, default_manifest_path, IndexedProject};
