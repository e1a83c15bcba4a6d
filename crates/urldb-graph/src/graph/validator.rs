//! Validation of proposed edges.

use super::{rotate_to_min, Repositories};
use crate::cancel::CancelToken;
use crate::domain::{CircularDependency, DependencyValidationResult, NodeId, MAX_STRENGTH};
use crate::error::Result;
use std::collections::{HashMap, HashSet, VecDeque};

/// Error text for `dependent == dependency`
pub const SELF_DEPENDENCY_MESSAGE: &str = "Self-dependencies are not allowed";

/// Error text for an edge that would close a cycle
pub const CIRCULAR_DEPENDENCY_MESSAGE: &str =
    "Adding this dependency would create a circular dependency";

/// Warning text for an edge that is already stored
pub const DUPLICATE_DEPENDENCY_WARNING: &str = "Dependency already exists";

/// Decides whether a new edge may be added.
#[derive(Clone)]
pub struct DependencyValidator {
    repos: Repositories,
    tool_name: String,
}

impl DependencyValidator {
    /// Create a validator; `tool_name` prefixes composite ids in node details.
    #[must_use]
    pub fn new(repos: Repositories, tool_name: impl Into<String>) -> Self {
        Self {
            repos,
            tool_name: tool_name.into(),
        }
    }

    /// Check the edge `dependent -> dependency`.
    ///
    /// Rejections are reported in the result, never as errors. A
    /// self-dependency is rejected without touching storage.
    ///
    /// # Errors
    ///
    /// - `Error::RepositoryUnavailable` if a collaborator is missing
    /// - `Error::Cancelled` if `cancel` trips
    /// - storage errors from the collaborators
    pub async fn validate_new_dependency(
        &self,
        dependent: NodeId,
        dependency: NodeId,
        cancel: &CancelToken,
    ) -> Result<DependencyValidationResult> {
        let mut result = DependencyValidationResult::valid();

        if dependent == dependency {
            result.reject(SELF_DEPENDENCY_MESSAGE);
            return Ok(result);
        }

        self.repos.require_all()?;
        let storage = self.repos.dependencies()?;

        cancel.check()?;
        if storage.get_dependency(dependent, dependency).await?.is_some() {
            result.warnings.push(DUPLICATE_DEPENDENCY_WARNING.to_string());
        }

        cancel.check()?;
        if storage.check_circular_dependency(dependent, dependency).await? {
            result.reject(CIRCULAR_DEPENDENCY_MESSAGE);
            let cycle = self.would_be_cycle(dependent, dependency, cancel).await?;
            result.cycles.push(cycle);
        }

        tracing::debug!(
            dependent = %dependent,
            dependency = %dependency,
            valid = result.is_valid,
            "Validated proposed dependency"
        );
        Ok(result)
    }

    /// Rebuild the cycle the new edge would close.
    ///
    /// Breadth-first from `dependency` along existing edges until `dependent`
    /// is reached, so the reported cycle is a shortest one.
    async fn would_be_cycle(
        &self,
        dependent: NodeId,
        dependency: NodeId,
        cancel: &CancelToken,
    ) -> Result<CircularDependency> {
        // child -> (parent, strength of parent -> child)
        let mut parent: HashMap<NodeId, (NodeId, u8)> = HashMap::new();
        let mut visited: HashSet<NodeId> = HashSet::from([dependency]);
        let mut queue: VecDeque<NodeId> = VecDeque::from([dependency]);
        let mut found = false;

        while let Some(current) = queue.pop_front() {
            if current == dependent {
                found = true;
                break;
            }
            for edge in self.repos.dependencies_of(current, cancel).await? {
                let next = edge.dependency_node_id;
                if visited.insert(next) {
                    parent.insert(next, (current, edge.strength()));
                    queue.push_back(next);
                }
            }
        }

        let mut path = vec![dependent];
        let mut strength = MAX_STRENGTH;
        if found {
            let mut current = dependent;
            while let Some(&(prev, edge_strength)) = parent.get(&current) {
                strength = strength.min(edge_strength);
                path.push(prev);
                current = prev;
            }
            path.reverse();
        } else {
            // storage reported reachability but the edges have since changed
            tracing::debug!(
                dependent = %dependent,
                dependency = %dependency,
                "Cycle path could not be reconstructed"
            );
            path.insert(0, dependency);
        }

        rotate_to_min(&mut path);
        let node_details = self.repos.describe(&path, &self.tool_name, cancel).await?;
        Ok(CircularDependency {
            path,
            node_details,
            strength,
        })
    }
}
