//! Mapping between target addresses and the manifest nodes they own

use crate::manifest::{BuildManifest, ManifestNode};
use dg_core::{paths, Address, Target, TargetKind};
use std::collections::{BTreeMap, BTreeSet};

/// Which addresses own which manifest nodes, in both directions.
///
/// Both maps are built together and never change afterwards. A unique id
/// belongs to at most one address: when two addresses claim the same node
/// the one that sorts first keeps it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressIndex {
    unique_ids_per_address: BTreeMap<Address, BTreeSet<String>>,
    address_by_unique_id: BTreeMap<String, Address>,
}

impl AddressIndex {
    /// Resolve every node of `manifest` to an owning target.
    ///
    /// File targets match a node's `original_file_path` by their path
    /// relative to `project_dir`; third-party package targets match its
    /// `package_name`. File matches win. Nodes matching neither are dropped.
    pub fn build<'a>(
        manifest: &BuildManifest,
        project_dir: &str,
        targets: impl IntoIterator<Item = &'a Target>,
    ) -> Self {
        let mut targets: Vec<&Target> = targets.into_iter().collect();
        targets.sort_by(|a, b| a.address.cmp(&b.address));

        let mut by_file: BTreeMap<String, &Address> = BTreeMap::new();
        let mut by_package: BTreeMap<String, &Address> = BTreeMap::new();
        for target in targets {
            if target.kind.is_indexable_file() {
                if let Some(file) = target.file_path() {
                    let key = paths::relpath(file, project_dir);
                    claim(&mut by_file, key, &target.address, "file");
                }
            } else if target.kind == TargetKind::ThirdPartyPackage {
                if let Some(package) = target.package_name() {
                    claim(&mut by_package, package, &target.address, "package");
                }
            }
        }

        let mut grouping: BTreeMap<Address, BTreeSet<String>> = BTreeMap::new();
        let mut dropped = 0usize;
        for (unique_id, node) in manifest.nodes() {
            let owner = node
                .original_file_path()
                .and_then(|path| by_file.get(path))
                .or_else(|| node.package_name().and_then(|name| by_package.get(name)));
            match owner {
                Some(address) => {
                    grouping
                        .entry((*address).clone())
                        .or_default()
                        .insert(unique_id.clone());
                }
                None => dropped += 1,
            }
        }
        log::debug!(
            "Mapped {} manifest nodes onto {} addresses for {} ({} unowned)",
            manifest.nodes().len() - dropped,
            grouping.len(),
            manifest.project(),
            dropped
        );

        Self::from_grouping(grouping)
    }

    /// Build the index from unique ids grouped by address
    pub fn from_grouping(grouping: BTreeMap<Address, BTreeSet<String>>) -> Self {
        let mut address_by_unique_id: BTreeMap<String, Address> = BTreeMap::new();
        let mut unique_ids_per_address = BTreeMap::new();
        for (address, unique_ids) in grouping {
            let mut kept = BTreeSet::new();
            for unique_id in unique_ids {
                if let Some(owner) = address_by_unique_id.get(&unique_id) {
                    log::warn!(
                        "Manifest node {} is claimed by both {} and {}, keeping {}",
                        unique_id,
                        owner,
                        address,
                        owner
                    );
                    continue;
                }
                address_by_unique_id.insert(unique_id.clone(), address.clone());
                kept.insert(unique_id);
            }
            if !kept.is_empty() {
                unique_ids_per_address.insert(address, kept);
            }
        }
        Self {
            unique_ids_per_address,
            address_by_unique_id,
        }
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.unique_ids_per_address.contains_key(address)
    }

    /// Unique ids owned by `address`
    pub fn unique_ids(&self, address: &Address) -> Option<&BTreeSet<String>> {
        self.unique_ids_per_address.get(address)
    }

    /// Owner of a manifest node
    pub fn address_for(&self, unique_id: &str) -> Option<&Address> {
        self.address_by_unique_id.get(unique_id)
    }

    /// Nodes owned by `address`
    pub fn nodes_for_address<'m>(
        &self,
        manifest: &'m BuildManifest,
        address: &Address,
    ) -> Vec<&'m ManifestNode> {
        self.unique_ids(address)
            .map(|ids| ids.iter().filter_map(|id| manifest.node(id)).collect())
            .unwrap_or_default()
    }

    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.unique_ids_per_address.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &BTreeSet<String>)> {
        self.unique_ids_per_address.iter()
    }

    pub fn len(&self) -> usize {
        self.unique_ids_per_address.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unique_ids_per_address.is_empty()
    }
}

fn claim<'a>(
    table: &mut BTreeMap<String, &'a Address>,
    key: String,
    address: &'a Address,
    what: &str,
) {
    match table.get(&key) {
        Some(existing) => log::warn!(
            "{} `{}` is claimed by both {} and {}, keeping {}",
            what,
            key,
            existing,
            address,
            existing
        ),
        None => {
            table.insert(key, address);
        }
    }
}

#[cfg(test)]
#[path = "index_test.rs"]
mod tests;
