//! In-memory storage backend using HashMap and petgraph.
//!
//! This module provides a fast, **ephemeral** implementation of both storage
//! collaborators. All data is held in RAM and lost when the process exits. It
//! is suitable for:
//!
//! - Tests of code that depends on [`DependencyStorage`] / [`NodeStorage`]
//! - The `urldb-graph` CLI, which loads a snapshot file and analyzes it
//!
//! # Architecture
//!
//! - `HashMap<NodeId, Node>` for O(1) node lookups
//! - `petgraph::DiGraph` holding the edges, with reachability via
//!   `has_path_connecting`
//! - `HashMap<NodeId, NodeIndex>` mapping nodes to graph indices
//! - a monotonically increasing sequence number per edge, so every edge list
//!   comes back in insertion order regardless of petgraph's internal layout
//!
//! ## Edge Direction Convention
//!
//! - **Edge source**: the dependent node
//! - **Edge target**: the dependency node
//! - **Edge weight**: the full [`DependencyEdge`]
//!
//! # Writes
//!
//! [`DependencyStorage::create`] enforces the graph invariants (no self-loops,
//! no cycles, no duplicates). [`InMemoryStorage::import_edge`] skips the cycle
//! check so that snapshots of stale or concurrently edited data, which may
//! already contain cycles, can be loaded and analyzed as-is.
//!
//! # Thread Safety
//!
//! State sits behind a `tokio::sync::RwLock`; reads run concurrently and
//! writes take the lock exclusively.
//!
//! [`DependencyStorage`]: crate::storage::DependencyStorage
//! [`DependencyStorage::create`]: crate::storage::DependencyStorage::create
//! [`NodeStorage`]: crate::storage::NodeStorage
//! [`DependencyEdge`]: crate::domain::DependencyEdge

mod graph;
mod inner;
mod snapshot;
mod trait_impl;

use crate::domain::{DependencyEdge, Node};
use crate::error::Result;
use inner::InMemoryStorageInner;
use tokio::sync::RwLock;

// Re-export public API
pub use snapshot::{load_snapshot, GraphSnapshot, LoadWarning};

/// Thread-safe in-memory node and edge storage.
#[derive(Default)]
pub struct InMemoryStorage {
    inner: RwLock<InMemoryStorageInner>,
}

impl InMemoryStorage {
    /// Create an empty storage instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a node.
    pub async fn insert_node(&self, node: Node) {
        self.inner.write().await.insert_node(node);
    }

    /// Store an edge without the cycle check.
    ///
    /// Self-loops, unknown endpoints and duplicates are still rejected.
    ///
    /// # Errors
    ///
    /// - `Error::SelfDependency` if both ends are the same node
    /// - `Error::NodeNotFound` if either end is unknown
    /// - `Error::DuplicateDependency` if the edge exists
    pub async fn import_edge(&self, edge: DependencyEdge) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.check_endpoints(&edge)?;
        inner.add_edge(edge);
        Ok(())
    }

    /// Number of stored nodes.
    pub async fn node_count(&self) -> usize {
        self.inner.read().await.nodes.len()
    }

    /// Number of stored edges.
    pub async fn edge_count(&self) -> usize {
        self.inner.read().await.graph.edge_count()
    }
}
