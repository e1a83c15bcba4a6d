//! Graph queries over the in-memory petgraph representation.
//!
//! - Edge listings in insertion order
//! - Reachability for cycle checks

use super::inner::StoredEdge;
use crate::domain::{DependencyEdge, NodeId};
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;

/// Collect the edges touching `id` in one direction, oldest first.
///
/// `Direction::Outgoing` yields the node's dependencies,
/// `Direction::Incoming` its dependents. Unknown nodes have no edges.
pub(super) fn edges_of(
    graph: &DiGraph<NodeId, StoredEdge>,
    node_map: &HashMap<NodeId, NodeIndex>,
    id: NodeId,
    direction: Direction,
) -> Vec<DependencyEdge> {
    let Some(&node) = node_map.get(&id) else {
        return Vec::new();
    };

    let mut stored: Vec<&StoredEdge> = graph
        .edges_directed(node, direction)
        .map(|edge| edge.weight())
        .collect();
    stored.sort_by_key(|stored| stored.seq);
    stored.into_iter().map(|stored| stored.edge.clone()).collect()
}

/// All edges in the graph, oldest first.
pub(super) fn all_edges(graph: &DiGraph<NodeId, StoredEdge>) -> Vec<&StoredEdge> {
    let mut stored: Vec<&StoredEdge> = graph.edge_weights().collect();
    stored.sort_by_key(|stored| stored.seq);
    stored
}

/// Check whether adding `dependent -> dependency` would close a cycle.
///
/// Uses petgraph's `has_path_connecting`: if `dependency` already reaches
/// `dependent`, the new edge completes a loop. Unknown nodes cannot be on a
/// path.
pub(super) fn would_close_cycle(
    graph: &DiGraph<NodeId, StoredEdge>,
    node_map: &HashMap<NodeId, NodeIndex>,
    dependent: NodeId,
    dependency: NodeId,
) -> bool {
    let (Some(&from), Some(&to)) = (node_map.get(&dependent), node_map.get(&dependency)) else {
        return false;
    };

    algo::has_path_connecting(graph, to, from, None)
}
