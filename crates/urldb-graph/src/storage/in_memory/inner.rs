//! Core in-memory storage data structures.
//!
//! This module contains the inner storage structure that holds all data and
//! is wrapped in a `RwLock` for thread safety.

use crate::domain::{DependencyEdge, Node, NodeId};
use crate::error::{Error, Result};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Edge weight stored in the graph.
///
/// `seq` records insertion order; petgraph reorders edges on removal, so
/// every listing sorts on it.
#[derive(Debug, Clone)]
pub(super) struct StoredEdge {
    pub(super) seq: u64,
    pub(super) edge: DependencyEdge,
}

/// Inner storage structure (not thread-safe).
///
/// # Graph Representation
///
/// Edges are directed from **dependent to dependency**. Every node in
/// `nodes` has a matching entry in `node_map`.
#[derive(Default)]
pub(crate) struct InMemoryStorageInner {
    /// Nodes indexed by id for O(1) lookups
    pub(super) nodes: HashMap<NodeId, Node>,

    /// Dependency graph; nodes hold `NodeId`, edges hold the stored edge
    pub(super) graph: DiGraph<NodeId, StoredEdge>,

    /// Mapping from NodeId to graph NodeIndex
    pub(super) node_map: HashMap<NodeId, NodeIndex>,

    /// Next edge sequence number
    next_seq: u64,
}

impl InMemoryStorageInner {
    /// Insert or replace a node, creating its graph vertex on first sight.
    pub(super) fn insert_node(&mut self, node: Node) {
        let id = node.id;
        self.nodes.insert(id, node);
        if !self.node_map.contains_key(&id) {
            let index = self.graph.add_node(id);
            self.node_map.insert(id, index);
        }
    }

    /// Look up the graph index for a node.
    pub(super) fn index_of(&self, id: NodeId) -> Result<NodeIndex> {
        self.node_map
            .get(&id)
            .copied()
            .ok_or(Error::NodeNotFound(id))
    }

    /// Validate everything about an edge except acyclicity.
    pub(super) fn check_endpoints(&self, edge: &DependencyEdge) -> Result<(NodeIndex, NodeIndex)> {
        if edge.is_self_loop() {
            return Err(Error::SelfDependency(edge.dependent_node_id));
        }

        let from = self.index_of(edge.dependent_node_id)?;
        let to = self.index_of(edge.dependency_node_id)?;

        if self.graph.find_edge(from, to).is_some() {
            return Err(Error::DuplicateDependency {
                dependent: edge.dependent_node_id,
                dependency: edge.dependency_node_id,
            });
        }

        Ok((from, to))
    }

    /// Add an edge whose endpoints have been checked.
    ///
    /// Endpoints missing from `node_map` are skipped; callers validate first.
    pub(super) fn add_edge(&mut self, edge: DependencyEdge) {
        let (Some(&from), Some(&to)) = (
            self.node_map.get(&edge.dependent_node_id),
            self.node_map.get(&edge.dependency_node_id),
        ) else {
            return;
        };

        let seq = self.next_seq;
        self.next_seq += 1;
        self.graph.add_edge(from, to, StoredEdge { seq, edge });
    }
}
