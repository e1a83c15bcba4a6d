//! Domain types for the dependency graph.
//!
//! This module contains node and edge types shared by the engine and its
//! storage collaborators. Analysis outputs live in [`results`].

mod results;

pub use results::{
    AffectedNode, CircularDependency, DependencyGraphView, DependencyTreeNode,
    DependencyValidationResult, ImpactAnalysisResult, ImpactLevel, ImpactType,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Metadata key that marks an edge as carrying a version constraint.
pub const VERSION_CONSTRAINT_KEY: &str = "version_constraint";

/// Strength reported for a cycle when none of its edges are known.
pub const MAX_STRENGTH: u8 = 100;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub i64);

impl NodeId {
    /// Create a new node ID
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw integer id.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for NodeId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Identifier of a scope (a url-db domain) that groups nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeId(pub i64);

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ScopeId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A node as seen by the graph engine.
///
/// Only the fields needed for reporting are carried; the full url-db node
/// (URL, description, attributes) stays with the node service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Node id
    pub id: NodeId,

    /// Scope (domain) the node belongs to
    pub scope_id: ScopeId,

    /// Human-readable domain name, used in composite ids
    pub domain_name: String,

    /// Node title
    pub title: String,
}

impl Node {
    /// Render this node's composite id, `<tool>:<domain>:<id>`.
    #[must_use]
    pub fn composite_id(&self, tool_name: &str) -> String {
        format!("{tool_name}:{}:{}", self.domain_name, self.id)
    }

    /// Label used in cycle reports: `"<title> (<composite id>)"`.
    #[must_use]
    pub fn label(&self, tool_name: &str) -> String {
        format!("{} ({})", self.title, self.composite_id(tool_name))
    }
}

/// Grouping of dependency types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyCategory {
    /// Existence relationships (hard, soft, reference)
    Structural,

    /// Execution relationships (runtime, compile, optional)
    Behavioral,

    /// Data flow relationships (sync, async)
    Data,
}

/// Type of dependency relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyType {
    /// The dependent cannot exist without the dependency
    Hard,

    /// The dependent degrades without the dependency
    Soft,

    /// Informational link
    Reference,

    /// Needed while running
    Runtime,

    /// Needed at build time
    Compile,

    /// Used when present
    Optional,

    /// Synchronous data feed
    Sync,

    /// Asynchronous data feed
    Async,
}

impl DependencyType {
    /// All dependency types, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Hard,
        Self::Soft,
        Self::Reference,
        Self::Runtime,
        Self::Compile,
        Self::Optional,
        Self::Sync,
        Self::Async,
    ];

    /// Wire name of this type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hard => "hard",
            Self::Soft => "soft",
            Self::Reference => "reference",
            Self::Runtime => "runtime",
            Self::Compile => "compile",
            Self::Optional => "optional",
            Self::Sync => "sync",
            Self::Async => "async",
        }
    }

    /// Category this type belongs to.
    #[must_use]
    pub const fn category(self) -> DependencyCategory {
        match self {
            Self::Hard | Self::Soft | Self::Reference => DependencyCategory::Structural,
            Self::Runtime | Self::Compile | Self::Optional => DependencyCategory::Behavioral,
            Self::Sync | Self::Async => DependencyCategory::Data,
        }
    }

    /// Default edge strength (0-100) used to rank edges.
    #[must_use]
    pub const fn default_strength(self) -> u8 {
        match self {
            Self::Hard => 90,
            Self::Reference => 30,
            _ => 50,
        }
    }

    /// Whether the dependent needs the dependency to function.
    #[must_use]
    pub const fn is_required(self) -> bool {
        !matches!(self, Self::Optional | Self::Reference)
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DependencyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown dependency type: {s}"))
    }
}

/// A directed dependency between two nodes.
///
/// Edge direction is **dependent -> dependency**: `dependent_node_id`
/// requires `dependency_node_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// The node that requires the other one
    pub dependent_node_id: NodeId,

    /// The node being required
    pub dependency_node_id: NodeId,

    /// Type of dependency
    pub dependency_type: DependencyType,

    /// Delete the dependent when the dependency is deleted
    #[serde(default)]
    pub cascade_delete: bool,

    /// Flag the dependent for update when the dependency changes
    #[serde(default)]
    pub cascade_update: bool,

    /// Free-form metadata (e.g. `version_constraint`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,

    /// Creation timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl DependencyEdge {
    /// Create a non-cascading edge without metadata.
    #[must_use]
    pub fn new(dependent: NodeId, dependency: NodeId, dependency_type: DependencyType) -> Self {
        Self {
            dependent_node_id: dependent,
            dependency_node_id: dependency,
            dependency_type,
            cascade_delete: false,
            cascade_update: false,
            metadata: None,
            created_at: Utc::now(),
        }
    }

    /// Set the cascade-delete flag.
    #[must_use]
    pub fn with_cascade_delete(mut self, cascade: bool) -> Self {
        self.cascade_delete = cascade;
        self
    }

    /// Set the cascade-update flag.
    #[must_use]
    pub fn with_cascade_update(mut self, cascade: bool) -> Self {
        self.cascade_update = cascade;
        self
    }

    /// Attach a version constraint to the edge metadata.
    #[must_use]
    pub fn with_version_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.metadata
            .get_or_insert_with(Map::new)
            .insert(VERSION_CONSTRAINT_KEY.to_string(), Value::String(constraint.into()));
        self
    }

    /// Returns the version constraint carried in metadata, if any.
    #[must_use]
    pub fn version_constraint(&self) -> Option<&Value> {
        self.metadata.as_ref()?.get(VERSION_CONSTRAINT_KEY)
    }

    /// Strength of this edge, derived from its type.
    #[must_use]
    pub fn strength(&self) -> u8 {
        self.dependency_type.default_strength()
    }

    /// Whether this edge would be a self-loop.
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.dependent_node_id == self.dependency_node_id
    }
}
