//! dbt's `manifest.json` and the index of every node it describes

use crate::error::{ManifestError, ManifestResult};
use dg_core::{compute_checksum, Address};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

/// Keys whose joint presence marks an object as a node
pub const NODE_KEYS: [&str; 2] = ["original_file_path", "unique_id"];

/// Top-level manifest sections holding node objects
const NODE_SECTIONS: [&str; 11] = [
    "nodes",
    "sources",
    "macros",
    "docs",
    "exposures",
    "metrics",
    "groups",
    "semantic_models",
    "saved_queries",
    "unit_tests",
    "disabled",
];

/// Top-level sections mapping unique ids to lists of unique ids
const GRAPH_SECTIONS: [&str; 3] = ["parent_map", "child_map", "group_map"];

/// How a top-level manifest section is walked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestSection {
    /// Keyed by unique id, values are node objects
    Nodes,
    /// Adjacency lists; never contain nodes
    Graph,
    /// Anything else, searched recursively
    Other,
}

impl ManifestSection {
    pub fn classify(key: &str) -> Self {
        if NODE_SECTIONS.contains(&key) {
            ManifestSection::Nodes
        } else if GRAPH_SECTIONS.contains(&key) {
            ManifestSection::Graph
        } else {
            ManifestSection::Other
        }
    }
}

/// One node of the manifest: a model, macro, test, seed, source or doc
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestNode(Map<String, Value>);

impl ManifestNode {
    /// Wrap an object carrying both [`NODE_KEYS`] with a string `unique_id`
    pub fn from_object(object: &Map<String, Value>) -> Option<Self> {
        if !NODE_KEYS.iter().all(|key| object.contains_key(*key)) {
            return None;
        }
        object.get("unique_id")?.as_str()?;
        Some(Self(object.clone()))
    }

    pub fn unique_id(&self) -> &str {
        self.get_str("unique_id").unwrap_or_default()
    }

    pub fn original_file_path(&self) -> Option<&str> {
        self.get_str("original_file_path")
    }

    pub fn package_name(&self) -> Option<&str> {
        self.get_str("package_name")
    }

    pub fn resource_type(&self) -> Option<&str> {
        self.get_str("resource_type")
    }

    /// `<package>://<path>` of the YAML file documenting this node
    pub fn patch_path(&self) -> Option<&str> {
        self.get_str("patch_path")
    }

    /// Where dbt writes the compiled SQL, when it recorded one
    pub fn compiled_path(&self) -> Option<&str> {
        self.get_str("compiled_path")
    }

    /// Unique ids under `depends_on.macros`
    pub fn depends_on_macros(&self) -> Vec<&str> {
        self.0
            .get("depends_on")
            .and_then(|d| d.get("macros"))
            .and_then(Value::as_array)
            .map(|ids| ids.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

/// Every node of a manifest, keyed by unique id
pub type NodeIndex = BTreeMap<String, ManifestNode>;

/// Collect every node in a manifest document.
///
/// Known node sections are walked entry by entry, graph sections are
/// skipped, and unknown sections are searched recursively. An object that
/// is a node is never searched further; arrays and scalars are ignored.
pub fn index_nodes(content: &Value) -> NodeIndex {
    let mut index = NodeIndex::new();
    let Value::Object(root) = content else {
        return index;
    };
    for (key, section) in root {
        match ManifestSection::classify(key) {
            ManifestSection::Graph => {}
            ManifestSection::Nodes => match section {
                Value::Object(entries) => {
                    for entry in entries.values() {
                        collect_nodes(entry, &mut index);
                    }
                }
                other => collect_nodes(other, &mut index),
            },
            ManifestSection::Other => collect_nodes(section, &mut index),
        }
    }
    index
}

fn collect_nodes(value: &Value, index: &mut NodeIndex) {
    let Value::Object(object) = value else {
        return;
    };
    match ManifestNode::from_object(object) {
        Some(node) => {
            index.insert(node.unique_id().to_string(), node);
        }
        None => {
            for child in object.values() {
                collect_nodes(child, index);
            }
        }
    }
}

/// A parsed `manifest.json` for one project
#[derive(Debug)]
pub struct BuildManifest {
    project: Address,
    content: Value,
    digest: String,
    nodes: OnceLock<NodeIndex>,
}

impl BuildManifest {
    pub fn new(project: Address, content: Value, digest: String) -> Self {
        Self {
            project,
            content,
            digest,
            nodes: OnceLock::new(),
        }
    }

    /// Parse manifest bytes produced for the `project` target
    pub fn from_slice(project: Address, bytes: &[u8]) -> ManifestResult<Self> {
        Self::parse(project, bytes, "manifest.json")
    }

    /// Read and parse a manifest file
    pub fn load(project: Address, path: &Path) -> ManifestResult<Self> {
        if !path.is_file() {
            return Err(ManifestError::ManifestNotFound {
                path: path.display().to_string(),
            });
        }
        let bytes = std::fs::read(path).map_err(|e| ManifestError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        log::debug!("Loading dbt manifest for {} from {}", project, path.display());
        Self::parse(project, &bytes, &path.display().to_string())
    }

    fn parse(project: Address, bytes: &[u8], label: &str) -> ManifestResult<Self> {
        let content: Value =
            serde_json::from_slice(bytes).map_err(|e| ManifestError::InvalidManifest {
                path: label.to_string(),
                message: e.to_string(),
            })?;
        if !content.is_object() {
            return Err(ManifestError::InvalidManifest {
                path: label.to_string(),
                message: "expected a JSON object at the top level".to_string(),
            });
        }
        Ok(Self::new(project, content, compute_checksum(bytes)))
    }

    /// Address of the `dbt_project` target this manifest was produced for
    pub fn project(&self) -> &Address {
        &self.project
    }

    pub fn content(&self) -> &Value {
        &self.content
    }

    /// SHA-256 fingerprint of the manifest bytes
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Node index, computed on first use
    pub fn nodes(&self) -> &NodeIndex {
        self.nodes.get_or_init(|| {
            let index = index_nodes(&self.content);
            log::debug!("Indexed {} manifest nodes for {}", index.len(), self.project);
            index
        })
    }

    pub fn node(&self, unique_id: &str) -> Option<&ManifestNode> {
        self.nodes().get(unique_id)
    }

    /// `parent_map[unique_id]`, empty when absent
    pub fn parents(&self, unique_id: &str) -> Vec<&str> {
        self.adjacent("parent_map", unique_id)
    }

    /// `child_map[unique_id]`, empty when absent
    pub fn children(&self, unique_id: &str) -> Vec<&str> {
        self.adjacent("child_map", unique_id)
    }

    /// dbt version recorded in the manifest metadata
    pub fn dbt_version(&self) -> Option<&str> {
        self.content
            .get("metadata")
            .and_then(|m| m.get("dbt_version"))
            .and_then(Value::as_str)
    }

    fn adjacent(&self, section: &str, unique_id: &str) -> Vec<&str> {
        self.content
            .get(section)
            .and_then(|map| map.get(unique_id))
            .and_then(Value::as_array)
            .map(|ids| ids.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "manifest_test.rs"]
mod tests;
