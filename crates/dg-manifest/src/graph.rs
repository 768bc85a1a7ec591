//! Graph of inferred dependencies between targets

use crate::error::{ManifestError, ManifestResult};
use dg_core::Address;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex as GraphIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Directed graph of target dependencies.
///
/// Edges run from a dependency to its dependent, so a topological order
/// lists dependencies first. Cycles are allowed while building and only
/// reported when an order is requested.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: DiGraph<Address, ()>,
    node_map: BTreeMap<Address, GraphIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a target, returning its existing node if already present
    pub fn add_target(&mut self, address: &Address) -> GraphIndex {
        if let Some(&idx) = self.node_map.get(address) {
            return idx;
        }
        let idx = self.graph.add_node(address.clone());
        self.node_map.insert(address.clone(), idx);
        idx
    }

    /// Record that `dependent` depends on `dependency`
    pub fn add_dependency(&mut self, dependent: &Address, dependency: &Address) {
        let from = self.add_target(dependency);
        let to = self.add_target(dependent);
        if self.graph.find_edge(from, to).is_none() {
            self.graph.add_edge(from, to, ());
        }
    }

    /// Build from a map of address -> addresses it depends on
    pub fn build(dependencies: &BTreeMap<Address, BTreeSet<Address>>) -> Self {
        let mut graph = Self::new();
        for (address, deps) in dependencies {
            graph.add_target(address);
            for dep in deps {
                graph.add_dependency(address, dep);
            }
        }
        log::debug!(
            "Built dependency graph with {} targets and {} edges",
            graph.graph.node_count(),
            graph.graph.edge_count()
        );
        graph
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.node_map.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }

    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.node_map.keys()
    }

    /// Direct dependencies of `address`
    pub fn dependencies(&self, address: &Address) -> ManifestResult<BTreeSet<Address>> {
        self.neighbors(address, Direction::Incoming)
    }

    /// Direct dependents of `address`
    pub fn dependents(&self, address: &Address) -> ManifestResult<BTreeSet<Address>> {
        self.neighbors(address, Direction::Outgoing)
    }

    /// Transitive dependencies of `address`
    pub fn ancestors(&self, address: &Address) -> ManifestResult<BTreeSet<Address>> {
        let idx = self.index_of(address)?;
        Ok(self.collect_reachable(idx, Direction::Incoming))
    }

    /// Transitive dependents of `address`
    pub fn descendants(&self, address: &Address) -> ManifestResult<BTreeSet<Address>> {
        let idx = self.index_of(address)?;
        Ok(self.collect_reachable(idx, Direction::Outgoing))
    }

    /// Every target with dependencies before dependents
    pub fn topological_order(&self) -> ManifestResult<Vec<Address>> {
        match toposort(&self.graph, None) {
            Ok(indices) => Ok(indices
                .into_iter()
                .map(|idx| self.graph[idx].clone())
                .collect()),
            Err(cycle) => Err(ManifestError::CircularDependency {
                cycle: self.find_cycle_path(cycle.node_id()),
            }),
        }
    }

    fn index_of(&self, address: &Address) -> ManifestResult<GraphIndex> {
        self.node_map
            .get(address)
            .copied()
            .ok_or_else(|| ManifestError::TargetNotFound {
                address: address.to_string(),
            })
    }

    fn neighbors(
        &self,
        address: &Address,
        direction: Direction,
    ) -> ManifestResult<BTreeSet<Address>> {
        let idx = self.index_of(address)?;
        Ok(self
            .graph
            .neighbors_directed(idx, direction)
            .map(|n| self.graph[n].clone())
            .collect())
    }

    fn collect_reachable(&self, start: GraphIndex, direction: Direction) -> BTreeSet<Address> {
        let mut result = BTreeSet::new();
        let mut visited = HashSet::from([start]);
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            for edge in self.graph.edges_directed(idx, direction) {
                let neighbor = match direction {
                    Direction::Incoming => edge.source(),
                    Direction::Outgoing => edge.target(),
                };
                if visited.insert(neighbor) {
                    result.insert(self.graph[neighbor].clone());
                    stack.push(neighbor);
                }
            }
        }
        result
    }

    /// Follow outgoing edges from a node known to sit on a cycle
    fn find_cycle_path(&self, start: GraphIndex) -> String {
        let mut path = vec![self.graph[start].to_string()];
        let mut visited = HashSet::from([start]);
        let mut current = start;

        while let Some(edge) = self.graph.edges(current).next() {
            let target = edge.target();
            path.push(self.graph[target].to_string());
            if target == start || !visited.insert(target) {
                break;
            }
            current = target;
        }

        path.join(" -> ")
    }
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
