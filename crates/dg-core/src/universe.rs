//! The set of all known targets and file ownership queries

use crate::address::Address;
use crate::target::{Target, TargetKind};
use std::collections::{BTreeMap, BTreeSet};

/// Answers which targets own a build-root-relative file
pub trait OwnersLookup {
    fn owners(&self, file_path: &str) -> BTreeSet<Address>;
}

/// Every target in the workspace, ordered by address
#[derive(Debug, Clone, Default)]
pub struct TargetUniverse {
    targets: Vec<Target>,
    by_address: BTreeMap<Address, usize>,
    by_file: BTreeMap<String, BTreeSet<Address>>,
}

impl TargetUniverse {
    /// Build the universe; a later target with an already-seen address is dropped.
    pub fn new(targets: impl IntoIterator<Item = Target>) -> Self {
        let mut unique: BTreeMap<Address, Target> = BTreeMap::new();
        for target in targets {
            if unique.contains_key(&target.address) {
                log::warn!("Duplicate target address {}, keeping the first", target.address);
                continue;
            }
            unique.insert(target.address.clone(), target);
        }

        let targets: Vec<Target> = unique.into_values().collect();
        let mut by_address = BTreeMap::new();
        let mut by_file: BTreeMap<String, BTreeSet<Address>> = BTreeMap::new();
        for (idx, target) in targets.iter().enumerate() {
            by_address.insert(target.address.clone(), idx);
            if let Some(file) = target.file_path() {
                by_file
                    .entry(file.to_string())
                    .or_default()
                    .insert(target.address.clone());
            }
        }

        Self {
            targets,
            by_address,
            by_file,
        }
    }

    pub fn get(&self, address: &Address) -> Option<&Target> {
        self.by_address.get(address).map(|&idx| &self.targets[idx])
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.by_address.contains_key(address)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Target> {
        self.targets.iter()
    }

    pub fn of_kind(&self, kind: TargetKind) -> impl Iterator<Item = &Target> {
        self.targets.iter().filter(move |t| t.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl OwnersLookup for TargetUniverse {
    fn owners(&self, file_path: &str) -> BTreeSet<Address> {
        self.by_file
            .get(&crate::paths::normalize(file_path))
            .cloned()
            .unwrap_or_default()
    }
}

impl<'a> IntoIterator for &'a TargetUniverse {
    type Item = &'a Target;
    type IntoIter = std::slice::Iter<'a, Target>;

    fn into_iter(self) -> Self::IntoIter {
        self.targets.iter()
    }
}

#[cfg(test)]
#[path = "universe_test.rs"]
mod tests;
