use crate::compute::ledger::KeyId;
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use std::collections::{HashSet, VecDeque};

/// Dependencies observed while evaluating rules.
///
/// Edges point from a dependency to the key that read it, so walking
/// outgoing edges finds everything computed from a given key.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraphMap<KeyId, ()>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that computing `dependent` read `dependency`.
    pub fn record(&mut self, dependency: KeyId, dependent: KeyId) {
        self.graph.add_edge(dependency, dependent, ());
    }

    /// The keys `key` read when it was computed.
    pub fn dependencies_of(&self, key: KeyId) -> Vec<KeyId> {
        let mut deps: Vec<KeyId> = self.graph.neighbors_directed(key, Direction::Incoming).collect();
        deps.sort();
        deps
    }

    /// The keys that read `key` directly.
    pub fn dependents_of(&self, key: KeyId) -> Vec<KeyId> {
        let mut deps: Vec<KeyId> = self.graph.neighbors_directed(key, Direction::Outgoing).collect();
        deps.sort();
        deps
    }

    /// Identifies all keys downstream from the given start keys, the start
    /// keys included. Used for incremental invalidation.
    pub fn downstream_from(&self, start: &[KeyId]) -> HashSet<KeyId> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from(start.to_vec());

        while let Some(key) = queue.pop_front() {
            if visited.insert(key) && self.graph.contains_node(key) {
                queue.extend(self.graph.neighbors_directed(key, Direction::Outgoing));
            }
        }
        visited
    }

    /// Drops the edges into `key`, before it is recomputed.
    pub fn forget_dependencies(&mut self, key: KeyId) {
        for dep in self.dependencies_of(key) {
            self.graph.remove_edge(dep, key);
        }
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn clear(&mut self) {
        self.graph.clear();
    }
}
