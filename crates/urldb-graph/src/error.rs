//! Error types for the dependency graph engine.
//!
//! Validation outcomes (self-dependency, would-create-cycle) are not errors:
//! they are reported through [`DependencyValidationResult`]. The variants here
//! cover infrastructure failures and bad caller input.
//!
//! ## Error Categorization
//!
//! [`Error::status_class`] maps every variant onto a 4xx/5xx style category so
//! that handlers can translate engine errors without matching on each variant.
//!
//! [`DependencyValidationResult`]: crate::domain::DependencyValidationResult

use crate::domain::NodeId;
use std::io;
use thiserror::Error;

/// A specialized Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for dependency graph operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Fetching edges failed while assembling a graph.
    #[error("failed to build graph: {source}")]
    GraphBuildFailure {
        /// The storage error that interrupted the build.
        #[source]
        source: Box<Error>,
    },

    /// A storage collaborator is not configured or cannot be reached.
    #[error("repository unavailable: {0}")]
    RepositoryUnavailable(String),

    /// The caller asked for an impact type outside the supported set.
    #[error("unsupported impact type: {0}")]
    UnsupportedImpactType(String),

    /// The requested node does not exist.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// The operation was cancelled or ran past its deadline.
    #[error("operation cancelled")]
    Cancelled,

    /// Backend-specific storage failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// A node may not depend on itself.
    #[error("self-dependency rejected for node {0}")]
    SelfDependency(NodeId),

    /// Adding the edge would close a cycle.
    #[error("circular dependency: {dependent} -> {dependency}")]
    CircularDependency {
        /// The node that would gain the dependency.
        dependent: NodeId,
        /// The node being depended upon.
        dependency: NodeId,
    },

    /// The edge already exists.
    #[error("dependency already exists: {dependent} -> {dependency}")]
    DuplicateDependency {
        /// The dependent node.
        dependent: NodeId,
        /// The dependency node.
        dependency: NodeId,
    },

    /// The edge to remove does not exist.
    #[error("dependency not found: {dependent} -> {dependency}")]
    DependencyNotFound {
        /// The dependent node.
        dependent: NodeId,
        /// The dependency node.
        dependency: NodeId,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A graph snapshot file could not be parsed or applied.
    #[error("snapshot error: {0}")]
    Snapshot(String),

    /// IO error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Coarse error category used by callers to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// The referenced entity does not exist (404-style).
    NotFound,
    /// The caller supplied invalid input (400-style).
    BadRequest,
    /// A collaborator failed or is missing (503-style).
    Unavailable,
    /// The request was cancelled before completion.
    Cancelled,
    /// Anything else on our side (500-style).
    Internal,
}

impl Error {
    /// Wrap a storage error raised while building a graph.
    ///
    /// Cancellation and missing collaborators pass through untouched so that
    /// callers can still tell them apart from a failed fetch.
    #[must_use]
    pub fn graph_build(source: Error) -> Self {
        match source {
            Self::Cancelled | Self::RepositoryUnavailable(_) | Self::GraphBuildFailure { .. } => {
                source
            }
            other => Self::GraphBuildFailure {
                source: Box::new(other),
            },
        }
    }

    /// Returns the response category for this error.
    #[must_use]
    pub fn status_class(&self) -> StatusClass {
        match self {
            Self::NodeNotFound(_) | Self::DependencyNotFound { .. } => StatusClass::NotFound,
            Self::UnsupportedImpactType(_)
            | Self::SelfDependency(_)
            | Self::CircularDependency { .. }
            | Self::DuplicateDependency { .. } => StatusClass::BadRequest,
            Self::GraphBuildFailure { .. } | Self::RepositoryUnavailable(_) | Self::Storage(_) => {
                StatusClass::Unavailable
            }
            Self::Cancelled => StatusClass::Cancelled,
            Self::Config(_) | Self::Snapshot(_) | Self::Io(_) => StatusClass::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_build_failure_display_includes_cause() {
        let err = Error::graph_build(Error::Storage("connection refused".to_string()));

        assert_eq!(
            err.to_string(),
            "failed to build graph: storage error: connection refused"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn graph_build_keeps_cancellation_distinct() {
        let err = Error::graph_build(Error::Cancelled);
        assert!(matches!(err, Error::Cancelled));

        let err = Error::graph_build(Error::RepositoryUnavailable("edges".to_string()));
        assert!(matches!(err, Error::RepositoryUnavailable(_)));
    }

    #[test]
    fn status_class_follows_handler_translation() {
        assert_eq!(
            Error::NodeNotFound(NodeId(1)).status_class(),
            StatusClass::NotFound
        );
        assert_eq!(
            Error::UnsupportedImpactType("rename".to_string()).status_class(),
            StatusClass::BadRequest
        );
        assert_eq!(
            Error::RepositoryUnavailable("nodes".to_string()).status_class(),
            StatusClass::Unavailable
        );
        assert_eq!(
            Error::graph_build(Error::Storage("down".to_string())).status_class(),
            StatusClass::Unavailable
        );
        assert_eq!(Error::Cancelled.status_class(), StatusClass::Cancelled);
    }
}
