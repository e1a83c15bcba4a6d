//! Two-sided dependency tree of a single node.
//!
//! The dependency side follows forward edges (what the root needs), the
//! dependent side reverse edges (what needs the root). Each side keeps its
//! own visited set. A node already expanded on that side is still listed
//! where it is met again but gets no children, which is how a loop back to
//! the root shows up in the view.

use super::Repositories;
use crate::cancel::CancelToken;
use crate::config::MAX_TRAVERSAL_DEPTH;
use crate::domain::{DependencyEdge, DependencyGraphView, DependencyTreeNode, NodeId};
use crate::error::{Error, Result};
use serde_json::Value;
use std::collections::HashSet;

/// Priority reported for every edge
pub const DEFAULT_PRIORITY: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Dependencies,
    Dependents,
}

impl Side {
    /// The node on the far end of `edge` when walking this side.
    fn far_end(self, edge: &DependencyEdge) -> NodeId {
        match self {
            Self::Dependencies => edge.dependency_node_id,
            Self::Dependents => edge.dependent_node_id,
        }
    }
}

fn constraint_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// One node being expanded: its remaining edges and the entries built so far.
struct Frame {
    depth: usize,
    edges: std::vec::IntoIter<DependencyEdge>,
    entries: Vec<DependencyTreeNode>,
    deepest: usize,
    /// Entry waiting for the children of the frame above it
    pending: Option<DependencyTreeNode>,
}

impl Frame {
    fn new(depth: usize, edges: Vec<DependencyEdge>) -> Self {
        Self {
            depth,
            edges: edges.into_iter(),
            entries: Vec::new(),
            deepest: depth,
            pending: None,
        }
    }
}

/// Builds [`DependencyGraphView`]s.
#[derive(Clone)]
pub struct DependencyTreeService {
    repos: Repositories,
    tool_name: String,
    depth_limit: usize,
}

impl DependencyTreeService {
    /// Create a tree service; `tool_name` prefixes composite ids.
    #[must_use]
    pub fn new(repos: Repositories, tool_name: impl Into<String>) -> Self {
        Self {
            repos,
            tool_name: tool_name.into(),
            depth_limit: MAX_TRAVERSAL_DEPTH,
        }
    }

    /// Cap every requested depth at `limit`.
    #[must_use]
    pub fn with_depth_limit(mut self, limit: usize) -> Self {
        self.depth_limit = limit.min(MAX_TRAVERSAL_DEPTH);
        self
    }

    /// Build the dependency view of `node` down to `max_depth` levels.
    ///
    /// `max_depth` is clamped to the service's depth limit.
    ///
    /// # Errors
    ///
    /// - `Error::RepositoryUnavailable` if a collaborator is missing
    /// - `Error::NodeNotFound` if `node` does not exist
    /// - `Error::Cancelled` if `cancel` trips
    pub async fn dependency_graph(
        &self,
        node: NodeId,
        max_depth: usize,
        cancel: &CancelToken,
    ) -> Result<DependencyGraphView> {
        self.repos.require_all()?;
        if self.repos.node(node, cancel).await?.is_none() {
            return Err(Error::NodeNotFound(node));
        }

        let max_depth = max_depth.min(self.depth_limit);
        let (dependencies, forward_depth) = self
            .build(node, max_depth, Side::Dependencies, cancel)
            .await?;
        let (dependents, reverse_depth) =
            self.build(node, max_depth, Side::Dependents, cancel).await?;

        let has_circular = mentions(&dependencies, node);
        tracing::debug!(
            node = %node,
            dependencies = dependencies.len(),
            dependents = dependents.len(),
            "Built dependency tree"
        );

        Ok(DependencyGraphView {
            node_id: node,
            total_dependencies: dependencies.len(),
            total_dependents: dependents.len(),
            dependencies,
            dependents,
            depth: forward_depth.max(reverse_depth),
            has_circular,
        })
    }

    async fn edges(
        &self,
        node: NodeId,
        side: Side,
        cancel: &CancelToken,
    ) -> Result<Vec<DependencyEdge>> {
        match side {
            Side::Dependencies => self.repos.dependencies_of(node, cancel).await,
            Side::Dependents => self.repos.dependents_of(node, cancel).await,
        }
    }

    /// One side of the tree; returns the entries and the deepest level
    /// reached.
    ///
    /// Depth-first with an explicit frame stack. A node is expanded the first
    /// time it is met on this side and below `max_depth`; later sightings are
    /// listed without children.
    async fn build(
        &self,
        root: NodeId,
        max_depth: usize,
        side: Side,
        cancel: &CancelToken,
    ) -> Result<(Vec<DependencyTreeNode>, usize)> {
        if max_depth == 0 {
            return Ok((Vec::new(), 0));
        }

        let mut visited: HashSet<NodeId> = HashSet::from([root]);
        let mut frames = vec![Frame::new(0, self.edges(root, side, cancel).await?)];

        loop {
            cancel.check()?;
            let Some(top) = frames.last_mut() else {
                return Ok((Vec::new(), 0));
            };

            let Some(edge) = top.edges.next() else {
                let Some(done) = frames.pop() else {
                    return Ok((Vec::new(), 0));
                };
                let Some(parent) = frames.last_mut() else {
                    return Ok((done.entries, done.deepest));
                };
                if let Some(mut entry) = parent.pending.take() {
                    entry.children = done.entries;
                    parent.entries.push(entry);
                }
                parent.deepest = parent.deepest.max(done.deepest);
                continue;
            };

            let far = side.far_end(&edge);
            let depth = top.depth + 1;
            let Some(related) = self.repos.node(far, cancel).await? else {
                tracing::debug!(node = %far, "Skipping unresolved node in dependency tree");
                continue;
            };

            let entry = DependencyTreeNode {
                node_id: far,
                composite_id: related.composite_id(&self.tool_name),
                title: related.title,
                dependency_type: edge.dependency_type,
                category: edge.dependency_type.category(),
                strength: edge.strength(),
                priority: DEFAULT_PRIORITY,
                is_required: edge.dependency_type.is_required(),
                version_constraint: edge.version_constraint().map(constraint_text),
                metadata: edge.metadata,
                children: Vec::new(),
            };

            if depth >= max_depth || !visited.insert(far) {
                top.deepest = top.deepest.max(depth);
                top.entries.push(entry);
                continue;
            }

            let edges = self.edges(far, side, cancel).await?;
            if let Some(top) = frames.last_mut() {
                top.pending = Some(entry);
            }
            frames.push(Frame::new(depth, edges));
        }
    }
}

/// Whether `target` appears anywhere in `entries`.
fn mentions(entries: &[DependencyTreeNode], target: NodeId) -> bool {
    let mut stack: Vec<&DependencyTreeNode> = entries.iter().collect();
    while let Some(entry) = stack.pop() {
        if entry.node_id == target {
            return true;
        }
        stack.extend(entry.children.iter());
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_constraint_text() {
        assert_eq!(constraint_text(&json!(">=1.2")), ">=1.2");
        assert_eq!(constraint_text(&json!(3)), "3");
    }

    #[test]
    fn test_far_end() {
        let edge = DependencyEdge::new(NodeId(1), NodeId(2), crate::domain::DependencyType::Hard);
        assert_eq!(Side::Dependencies.far_end(&edge), NodeId(2));
        assert_eq!(Side::Dependents.far_end(&edge), NodeId(1));
    }
}
