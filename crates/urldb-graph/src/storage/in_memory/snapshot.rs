//! Snapshot loading for the in-memory backend.
//!
//! A snapshot is a YAML (or JSON) document listing nodes and edges:
//!
//! ```yaml
//! nodes:
//!   - { id: 1, scope_id: 1, domain_name: docs, title: Intro }
//!   - { id: 2, scope_id: 1, domain_name: docs, title: Setup }
//! dependencies:
//!   - { dependent_node_id: 2, dependency_node_id: 1, dependency_type: hard, cascade_delete: true }
//! ```
//!
//! Loading is resilient: edges that cannot be stored are skipped and reported
//! as [`LoadWarning`]s instead of failing the whole load. Cycles are kept, so
//! a snapshot of inconsistent data can still be inspected.

use super::InMemoryStorage;
use crate::domain::{DependencyEdge, Node, NodeId};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// Serialized form of a graph snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Nodes to load
    #[serde(default)]
    pub nodes: Vec<Node>,

    /// Edges to load, in insertion order
    #[serde(default)]
    pub dependencies: Vec<DependencyEdge>,
}

/// Problems found while loading a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// An edge pointed a node at itself.
    SelfDependency {
        /// The offending node
        node: NodeId,
    },

    /// An edge referenced a node missing from the snapshot.
    UnknownNode {
        /// The dependent end of the edge
        dependent: NodeId,
        /// The dependency end of the edge
        dependency: NodeId,
        /// The id that could not be found
        missing: NodeId,
    },

    /// The same edge was listed twice; the first copy wins.
    DuplicateDependency {
        /// The dependent end of the edge
        dependent: NodeId,
        /// The dependency end of the edge
        dependency: NodeId,
    },
}

impl GraphSnapshot {
    /// Parse a snapshot from YAML or JSON text.
    ///
    /// # Errors
    ///
    /// Returns `Error::Snapshot` if the document is malformed.
    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::Snapshot(e.to_string()))
    }

    /// Build an in-memory storage from this snapshot.
    ///
    /// # Errors
    ///
    /// Only unexpected storage failures are returned; per-edge problems are
    /// collected as warnings.
    pub async fn into_storage(self) -> Result<(InMemoryStorage, Vec<LoadWarning>)> {
        let storage = InMemoryStorage::new();
        for node in self.nodes {
            storage.insert_node(node).await;
        }

        let mut warnings = Vec::new();
        for edge in self.dependencies {
            let dependent = edge.dependent_node_id;
            let dependency = edge.dependency_node_id;

            match storage.import_edge(edge).await {
                Ok(()) => {}
                Err(Error::SelfDependency(node)) => {
                    warnings.push(LoadWarning::SelfDependency { node });
                }
                Err(Error::NodeNotFound(missing)) => warnings.push(LoadWarning::UnknownNode {
                    dependent,
                    dependency,
                    missing,
                }),
                Err(Error::DuplicateDependency { .. }) => {
                    warnings.push(LoadWarning::DuplicateDependency {
                        dependent,
                        dependency,
                    });
                }
                Err(other) => return Err(other),
            }
        }

        Ok((storage, warnings))
    }
}

/// Load a snapshot file into a fresh in-memory storage.
///
/// # Errors
///
/// - `Error::Io` if the file cannot be read
/// - `Error::Snapshot` if the file cannot be parsed
pub async fn load_snapshot(path: &Path) -> Result<(InMemoryStorage, Vec<LoadWarning>)> {
    let content = fs::read_to_string(path).await?;
    let (storage, warnings) = GraphSnapshot::parse(&content)?.into_storage().await?;

    for warning in &warnings {
        tracing::warn!(warning = ?warning, path = %path.display(), "Snapshot load warning");
    }

    Ok((storage, warnings))
}
