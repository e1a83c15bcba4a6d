//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;
use urldb_graph::domain::{DependencyEdge, DependencyType, Node, NodeId, ScopeId};
use urldb_graph::error::{Error, Result};
use urldb_graph::storage::in_memory::InMemoryStorage;
use urldb_graph::storage::{DependencyStorage, NodeStorage};
use urldb_graph::{DependencyEngine, EngineConfig};

/// Scope every fixture node belongs to
pub const SCOPE: ScopeId = ScopeId(1);

/// A node in [`SCOPE`] under the `docs` domain
pub fn node(id: i64) -> Node {
    Node {
        id: NodeId(id),
        scope_id: SCOPE,
        domain_name: "docs".to_string(),
        title: format!("Node {id}"),
    }
}

/// Shorthand for a non-cascading edge `dependent -> dependency`
pub fn edge(dependent: i64, dependency: i64, dependency_type: DependencyType) -> DependencyEdge {
    DependencyEdge::new(NodeId(dependent), NodeId(dependency), dependency_type)
}

/// Storage holding `nodes` and `edges`, imported without the cycle check
pub async fn storage_with(nodes: &[i64], edges: Vec<DependencyEdge>) -> Arc<InMemoryStorage> {
    let storage = Arc::new(InMemoryStorage::new());
    for &id in nodes {
        storage.insert_node(node(id)).await;
    }
    for edge in edges {
        storage
            .import_edge(edge)
            .await
            .expect("Failed to import fixture edge");
    }
    storage
}

/// Engine over `storage` with the cache disabled
pub fn engine(storage: &Arc<InMemoryStorage>) -> DependencyEngine {
    let mut config = EngineConfig::default();
    config.cache.enabled = false;
    DependencyEngine::new(storage.clone(), storage.clone(), config)
}

/// Engine over `storage` with the default (cached) configuration
pub fn cached_engine(storage: &Arc<InMemoryStorage>) -> DependencyEngine {
    DependencyEngine::new(storage.clone(), storage.clone(), EngineConfig::default())
}

/// Edge storage whose every call fails
pub struct FailingStorage;

#[async_trait]
impl DependencyStorage for FailingStorage {
    async fn get_node_dependents(&self, _node: NodeId) -> Result<Vec<DependencyEdge>> {
        Err(Error::Storage("connection reset".to_string()))
    }

    async fn get_node_dependencies(&self, _node: NodeId) -> Result<Vec<DependencyEdge>> {
        Err(Error::Storage("connection reset".to_string()))
    }

    async fn check_circular_dependency(
        &self,
        _dependent: NodeId,
        _dependency: NodeId,
    ) -> Result<bool> {
        Err(Error::Storage("connection reset".to_string()))
    }

    async fn get_dependency(
        &self,
        _dependent: NodeId,
        _dependency: NodeId,
    ) -> Result<Option<DependencyEdge>> {
        Err(Error::Storage("connection reset".to_string()))
    }

    async fn list_scope_edges(&self, _scope: ScopeId) -> Result<Vec<DependencyEdge>> {
        Err(Error::Storage("connection reset".to_string()))
    }

    async fn create(&self, _edge: DependencyEdge) -> Result<()> {
        Err(Error::Storage("connection reset".to_string()))
    }

    async fn delete(&self, _dependent: NodeId, _dependency: NodeId) -> Result<()> {
        Err(Error::Storage("connection reset".to_string()))
    }
}

/// Node storage that knows no nodes
pub struct EmptyNodes;

#[async_trait]
impl NodeStorage for EmptyNodes {
    async fn get_by_id(&self, _id: NodeId) -> Result<Option<Node>> {
        Ok(None)
    }
}
