//! Storage trait implementations for in-memory storage.

use super::graph::{all_edges, edges_of, would_close_cycle};
use super::InMemoryStorage;
use crate::domain::{DependencyEdge, Node, NodeId, ScopeId};
use crate::error::{Error, Result};
use crate::storage::{DependencyStorage, NodeStorage};
use async_trait::async_trait;
use petgraph::Direction;

#[async_trait]
impl DependencyStorage for InMemoryStorage {
    async fn get_node_dependents(&self, node: NodeId) -> Result<Vec<DependencyEdge>> {
        let inner = self.inner.read().await;
        Ok(edges_of(&inner.graph, &inner.node_map, node, Direction::Incoming))
    }

    async fn get_node_dependencies(&self, node: NodeId) -> Result<Vec<DependencyEdge>> {
        let inner = self.inner.read().await;
        Ok(edges_of(&inner.graph, &inner.node_map, node, Direction::Outgoing))
    }

    async fn check_circular_dependency(
        &self,
        dependent: NodeId,
        dependency: NodeId,
    ) -> Result<bool> {
        let inner = self.inner.read().await;
        Ok(would_close_cycle(
            &inner.graph,
            &inner.node_map,
            dependent,
            dependency,
        ))
    }

    async fn get_dependency(
        &self,
        dependent: NodeId,
        dependency: NodeId,
    ) -> Result<Option<DependencyEdge>> {
        let inner = self.inner.read().await;
        let (Some(&from), Some(&to)) = (
            inner.node_map.get(&dependent),
            inner.node_map.get(&dependency),
        ) else {
            return Ok(None);
        };

        Ok(inner
            .graph
            .find_edge(from, to)
            .and_then(|edge| inner.graph.edge_weight(edge))
            .map(|stored| stored.edge.clone()))
    }

    async fn list_scope_edges(&self, scope: ScopeId) -> Result<Vec<DependencyEdge>> {
        let inner = self.inner.read().await;
        Ok(all_edges(&inner.graph)
            .into_iter()
            .filter(|stored| {
                inner
                    .nodes
                    .get(&stored.edge.dependent_node_id)
                    .is_some_and(|node| node.scope_id == scope)
            })
            .map(|stored| stored.edge.clone())
            .collect())
    }

    async fn create(&self, edge: DependencyEdge) -> Result<()> {
        let mut inner = self.inner.write().await;

        // === Phase 1: All validations (no mutations) ===
        inner.check_endpoints(&edge)?;
        if would_close_cycle(
            &inner.graph,
            &inner.node_map,
            edge.dependent_node_id,
            edge.dependency_node_id,
        ) {
            return Err(Error::CircularDependency {
                dependent: edge.dependent_node_id,
                dependency: edge.dependency_node_id,
            });
        }

        // === Phase 2: Store ===
        inner.add_edge(edge);
        Ok(())
    }

    async fn delete(&self, dependent: NodeId, dependency: NodeId) -> Result<()> {
        let mut inner = self.inner.write().await;

        let not_found = Error::DependencyNotFound {
            dependent,
            dependency,
        };
        let (Some(&from), Some(&to)) = (
            inner.node_map.get(&dependent),
            inner.node_map.get(&dependency),
        ) else {
            return Err(not_found);
        };

        let edge = inner.graph.find_edge(from, to).ok_or(not_found)?;
        inner.graph.remove_edge(edge);
        Ok(())
    }
}

#[async_trait]
impl NodeStorage for InMemoryStorage {
    async fn get_by_id(&self, id: NodeId) -> Result<Option<Node>> {
        let inner = self.inner.read().await;
        Ok(inner.nodes.get(&id).cloned())
    }
}
