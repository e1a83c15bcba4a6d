//! Scope graph assembly.

use super::Repositories;
use crate::cancel::CancelToken;
use crate::domain::{DependencyEdge, DependencyType, NodeId, ScopeId};
use crate::error::{Error, Result};
use std::collections::HashMap;

/// One adjacency entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbor {
    /// Node at the other end of the edge
    pub node: NodeId,

    /// Type of the edge
    pub dependency_type: DependencyType,

    /// Strength of the edge
    pub strength: u8,
}

/// Adjacency view of a scope's edges.
///
/// `forward` maps a dependent to its dependencies, `reverse` a dependency to
/// its dependents. Nodes and neighbours iterate in the order their edges were
/// returned by storage.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    order: Vec<NodeId>,
    forward: HashMap<NodeId, Vec<Neighbor>>,
    reverse: HashMap<NodeId, Vec<Neighbor>>,
    edge_count: usize,
}

impl DependencyGraph {
    /// Build a graph from edges, skipping self-loops.
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = DependencyEdge>,
    {
        let mut graph = Self::default();
        for edge in edges {
            if edge.is_self_loop() {
                tracing::warn!(
                    node = %edge.dependent_node_id,
                    "Skipping self-loop edge found in storage"
                );
                continue;
            }
            graph.add(&edge);
        }
        graph
    }

    fn add(&mut self, edge: &DependencyEdge) {
        let from = edge.dependent_node_id;
        let to = edge.dependency_node_id;
        self.touch(from);
        self.touch(to);

        let strength = edge.strength();
        if let Some(list) = self.forward.get_mut(&from) {
            list.push(Neighbor {
                node: to,
                dependency_type: edge.dependency_type,
                strength,
            });
        }
        if let Some(list) = self.reverse.get_mut(&to) {
            list.push(Neighbor {
                node: from,
                dependency_type: edge.dependency_type,
                strength,
            });
        }
        self.edge_count += 1;
    }

    fn touch(&mut self, id: NodeId) {
        if !self.forward.contains_key(&id) {
            self.order.push(id);
            self.forward.insert(id, Vec::new());
            self.reverse.insert(id, Vec::new());
        }
    }

    /// Nodes in first-seen order.
    #[must_use]
    pub fn nodes(&self) -> &[NodeId] {
        &self.order
    }

    /// What `id` depends on.
    #[must_use]
    pub fn dependencies_of(&self, id: NodeId) -> &[Neighbor] {
        self.forward.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// What depends on `id`.
    #[must_use]
    pub fn dependents_of(&self, id: NodeId) -> &[Neighbor] {
        self.reverse.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `id` appears on any edge.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.forward.contains_key(&id)
    }

    /// Number of distinct nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    /// Number of edges kept.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Whether the graph holds no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edge_count == 0
    }
}

/// Loads scope graphs from the dependency storage.
#[derive(Clone)]
pub struct GraphBuilder {
    repos: Repositories,
}

impl GraphBuilder {
    /// Create a builder over the given collaborators.
    #[must_use]
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Build the graph of every edge whose dependent belongs to `scope`.
    ///
    /// # Errors
    ///
    /// - `Error::RepositoryUnavailable` if no dependency storage is wired
    /// - `Error::Cancelled` if `cancel` has tripped
    /// - `Error::GraphBuildFailure` wrapping any storage error
    pub async fn build_graph(&self, scope: ScopeId, cancel: &CancelToken) -> Result<DependencyGraph> {
        let storage = self.repos.dependencies()?;
        cancel.check()?;

        let edges = storage
            .list_scope_edges(scope)
            .await
            .map_err(Error::graph_build)?;
        cancel.check()?;

        let graph = DependencyGraph::from_edges(edges);
        tracing::debug!(
            scope = %scope,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Built scope graph"
        );
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(from: i64, to: i64, dependency_type: DependencyType) -> DependencyEdge {
        DependencyEdge::new(NodeId(from), NodeId(to), dependency_type)
    }

    #[test]
    fn test_adjacency_in_both_directions() {
        let graph = DependencyGraph::from_edges([
            edge(1, 2, DependencyType::Hard),
            edge(1, 3, DependencyType::Soft),
            edge(4, 3, DependencyType::Reference),
        ]);

        assert_eq!(
            graph.nodes(),
            &[NodeId(1), NodeId(2), NodeId(3), NodeId(4)]
        );
        let forward: Vec<NodeId> = graph.dependencies_of(NodeId(1)).iter().map(|n| n.node).collect();
        assert_eq!(forward, vec![NodeId(2), NodeId(3)]);

        let reverse = graph.dependents_of(NodeId(3));
        assert_eq!(reverse.len(), 2);
        assert_eq!(reverse[0].node, NodeId(1));
        assert_eq!(reverse[0].strength, 50);
        assert_eq!(reverse[1].node, NodeId(4));
        assert_eq!(reverse[1].strength, 30);

        assert_eq!(graph.edge_count(), 3);
        assert!(graph.dependencies_of(NodeId(99)).is_empty());
    }

    #[test]
    fn test_self_loops_are_skipped() {
        let graph = DependencyGraph::from_edges([
            edge(7, 7, DependencyType::Hard),
            edge(7, 8, DependencyType::Hard),
        ]);

        assert_eq!(graph.edge_count(), 1);
        assert!(graph.dependents_of(NodeId(7)).is_empty());
    }

    #[test]
    fn test_empty_graph() {
        let graph = DependencyGraph::from_edges(Vec::new());
        assert!(graph.is_empty());
        assert_eq!(graph.node_count(), 0);
        assert!(!graph.contains(NodeId(1)));
    }
}
