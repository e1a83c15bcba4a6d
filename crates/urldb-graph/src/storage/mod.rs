//! Storage collaborators consumed by the graph engine.
//!
//! The engine never owns edge or node persistence. It talks to two traits:
//!
//! - [`DependencyStorage`]: edge lookups in both directions, reachability and
//!   edge writes
//! - [`NodeStorage`]: node resolution for titles and composite ids
//!
//! Both are async and object-safe so handlers can hand the engine
//! `Arc<dyn DependencyStorage>` built over SQLite, an HTTP client or the
//! bundled [`in_memory`] backend.
//!
//! # Edge Direction
//!
//! Edges point from **dependent -> dependency**. "Dependents of X" are the
//! sources of edges whose target is X (reverse edges); "dependencies of X"
//! are the targets of edges leaving X.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use urldb_graph::domain::{DependencyEdge, DependencyType, Node, NodeId, ScopeId};
//! use urldb_graph::storage::in_memory::InMemoryStorage;
//! use urldb_graph::storage::DependencyStorage;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let storage = Arc::new(InMemoryStorage::new());
//!     for id in [1, 2] {
//!         storage
//!             .insert_node(Node {
//!                 id: NodeId(id),
//!                 scope_id: ScopeId(1),
//!                 domain_name: "docs".to_string(),
//!                 title: format!("Node {id}"),
//!             })
//!             .await;
//!     }
//!
//!     storage
//!         .create(DependencyEdge::new(NodeId(1), NodeId(2), DependencyType::Hard))
//!         .await?;
//!     assert_eq!(storage.get_node_dependents(NodeId(2)).await?.len(), 1);
//!     Ok(())
//! }
//! ```

use crate::domain::{DependencyEdge, Node, NodeId, ScopeId};
use crate::error::Result;
use async_trait::async_trait;

pub mod in_memory;

/// Edge storage consumed by the graph engine.
///
/// Implementations must return edges in a stable order (insertion order for
/// the in-memory backend) so that analyses over the same snapshot are
/// reproducible.
///
/// # Error Handling
///
/// - `Error::Storage`: the backend failed
/// - `Error::RepositoryUnavailable`: the backend cannot be reached at all
#[async_trait]
pub trait DependencyStorage: Send + Sync {
    /// Get all edges whose dependency is `node` (who depends on `node`).
    async fn get_node_dependents(&self, node: NodeId) -> Result<Vec<DependencyEdge>>;

    /// Get all edges whose dependent is `node` (what `node` depends on).
    async fn get_node_dependencies(&self, node: NodeId) -> Result<Vec<DependencyEdge>>;

    /// Check whether adding `dependent -> dependency` would close a cycle.
    ///
    /// Returns `true` when `dependency` already reaches `dependent` through
    /// existing edges.
    async fn check_circular_dependency(
        &self,
        dependent: NodeId,
        dependency: NodeId,
    ) -> Result<bool>;

    /// Get the edge `dependent -> dependency`, if it exists.
    async fn get_dependency(
        &self,
        dependent: NodeId,
        dependency: NodeId,
    ) -> Result<Option<DependencyEdge>>;

    /// List every edge whose dependent node belongs to `scope`.
    async fn list_scope_edges(&self, scope: ScopeId) -> Result<Vec<DependencyEdge>>;

    /// Store a new edge.
    ///
    /// # Errors
    ///
    /// - `Error::SelfDependency` if both ends are the same node
    /// - `Error::NodeNotFound` if either end is unknown
    /// - `Error::DuplicateDependency` if the edge exists
    /// - `Error::CircularDependency` if the edge would close a cycle
    async fn create(&self, edge: DependencyEdge) -> Result<()>;

    /// Remove the edge `dependent -> dependency`.
    ///
    /// # Errors
    ///
    /// - `Error::DependencyNotFound` if the edge doesn't exist
    async fn delete(&self, dependent: NodeId, dependency: NodeId) -> Result<()>;
}

/// Node lookups consumed by the graph engine.
#[async_trait]
pub trait NodeStorage: Send + Sync {
    /// Get a node by id.
    ///
    /// Returns `None` if the node doesn't exist.
    async fn get_by_id(&self, id: NodeId) -> Result<Option<Node>>;
}
