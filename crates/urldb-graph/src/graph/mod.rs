//! Dependency graph analyses.
//!
//! Components, leaf first:
//!
//! - [`GraphBuilder`]: loads a scope's edges into a [`DependencyGraph`]
//! - [`CycleDetector`]: Tarjan SCC over a built graph
//! - [`DependencyValidator`]: accepts or rejects a proposed edge
//! - [`ImpactAnalyzer`]: scores the blast radius of a change
//! - [`DependencyTreeService`]: two-sided dependency view of one node
//!
//! Every component reaches storage through [`Repositories`], which turns an
//! unset collaborator into [`Error::RepositoryUnavailable`] instead of a
//! fault, and checks the caller's [`CancelToken`] before each call.

mod builder;
mod cycles;
mod impact;
mod tree;
mod validator;

pub use builder::{DependencyGraph, GraphBuilder, Neighbor};
pub use cycles::{strongly_connected, CycleDetector};
pub use impact::{ImpactAnalyzer, ImpactPolicy};
pub use tree::DependencyTreeService;
pub use validator::DependencyValidator;

use crate::cancel::CancelToken;
use crate::domain::{DependencyEdge, Node, NodeId};
use crate::error::{Error, Result};
use crate::storage::{DependencyStorage, NodeStorage};
use std::sync::Arc;

/// Storage collaborators shared by the analyses.
///
/// Either side may be absent; operations that need it fail with
/// `Error::RepositoryUnavailable`.
#[derive(Clone, Default)]
pub struct Repositories {
    dependencies: Option<Arc<dyn DependencyStorage>>,
    nodes: Option<Arc<dyn NodeStorage>>,
}

impl Repositories {
    /// Wire both collaborators.
    #[must_use]
    pub fn new(dependencies: Arc<dyn DependencyStorage>, nodes: Arc<dyn NodeStorage>) -> Self {
        Self {
            dependencies: Some(dependencies),
            nodes: Some(nodes),
        }
    }

    /// Wire whichever collaborators are available.
    #[must_use]
    pub fn from_parts(
        dependencies: Option<Arc<dyn DependencyStorage>>,
        nodes: Option<Arc<dyn NodeStorage>>,
    ) -> Self {
        Self {
            dependencies,
            nodes,
        }
    }

    pub(crate) fn dependencies(&self) -> Result<&dyn DependencyStorage> {
        self.dependencies
            .as_deref()
            .ok_or_else(|| Error::RepositoryUnavailable("dependency storage".to_string()))
    }

    pub(crate) fn nodes(&self) -> Result<&dyn NodeStorage> {
        self.nodes
            .as_deref()
            .ok_or_else(|| Error::RepositoryUnavailable("node storage".to_string()))
    }

    /// Fail fast when either collaborator is missing.
    pub(crate) fn require_all(&self) -> Result<()> {
        self.dependencies()?;
        self.nodes()?;
        Ok(())
    }

    pub(crate) async fn node(&self, id: NodeId, cancel: &CancelToken) -> Result<Option<Node>> {
        let nodes = self.nodes()?;
        cancel.check()?;
        nodes.get_by_id(id).await
    }

    pub(crate) async fn dependents_of(
        &self,
        id: NodeId,
        cancel: &CancelToken,
    ) -> Result<Vec<DependencyEdge>> {
        let storage = self.dependencies()?;
        cancel.check()?;
        storage.get_node_dependents(id).await
    }

    pub(crate) async fn dependencies_of(
        &self,
        id: NodeId,
        cancel: &CancelToken,
    ) -> Result<Vec<DependencyEdge>> {
        let storage = self.dependencies()?;
        cancel.check()?;
        storage.get_node_dependencies(id).await
    }

    /// Labels for a cycle path, `"Node <id> (unknown)"` for unresolved ids.
    pub(crate) async fn describe(
        &self,
        path: &[NodeId],
        tool_name: &str,
        cancel: &CancelToken,
    ) -> Result<Vec<String>> {
        let mut details = Vec::with_capacity(path.len());
        for &id in path {
            let label = match self.node(id, cancel).await? {
                Some(node) => node.label(tool_name),
                None => format!("Node {id} (unknown)"),
            };
            details.push(label);
        }
        Ok(details)
    }
}

/// Rotate a cycle so it starts at its lowest id, keeping edge order.
pub(crate) fn rotate_to_min(path: &mut [NodeId]) {
    if let Some(start) = path
        .iter()
        .enumerate()
        .min_by_key(|&(_, id)| id)
        .map(|(pos, _)| pos)
    {
        path.rotate_left(start);
    }
}
