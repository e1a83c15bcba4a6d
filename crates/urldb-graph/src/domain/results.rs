//! Analysis result types.
//!
//! These are transient values built per request (or served from the graph
//! cache) and serialized with the same field names url-db handlers expose.

use super::{DependencyCategory, DependencyType, NodeId};
use crate::error::Error;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Kind of change being analyzed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactType {
    /// The source node is deleted
    Delete,

    /// The source node is updated in place
    Update,

    /// The source node changes version
    VersionChange,
}

impl ImpactType {
    /// Wire name of this impact type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Update => "update",
            Self::VersionChange => "version_change",
        }
    }

    /// Whether the walk continues below a dependent reached through an edge
    /// with the given cascade flags. Version changes never recurse.
    #[must_use]
    pub const fn cascade_flag(self, cascade_delete: bool, cascade_update: bool) -> bool {
        match self {
            Self::Delete => cascade_delete,
            Self::Update => cascade_update,
            Self::VersionChange => false,
        }
    }
}

impl fmt::Display for ImpactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImpactType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "delete" => Ok(Self::Delete),
            "update" => Ok(Self::Update),
            "version_change" => Ok(Self::VersionChange),
            other => Err(Error::UnsupportedImpactType(other.to_string())),
        }
    }
}

/// Severity tier assigned to an affected node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    /// The node is removed or broken outright
    Critical,

    /// The node needs changes
    High,

    /// The node should be checked
    Medium,

    /// The node is barely touched
    Low,
}

impl ImpactLevel {
    /// Raw score contribution of this tier.
    #[must_use]
    pub const fn points(self) -> u32 {
        match self {
            Self::Critical => 100,
            Self::High => 75,
            Self::Medium => 50,
            Self::Low => 25,
        }
    }

    /// Wire name of this level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node affected by a proposed change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffectedNode {
    /// Affected node id
    pub node_id: NodeId,

    /// Composite id of the affected node
    pub composite_id: String,

    /// Node title
    pub title: String,

    /// Severity tier
    pub impact_level: ImpactLevel,

    /// Why the node is affected
    pub reason: String,

    /// What the operator should do about it
    pub action_needed: String,

    /// Node ids from the source to this node, both ends included
    pub path: Vec<NodeId>,
}

impl AffectedNode {
    /// Number of hops between the source and this node.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// Outcome of an impact analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactAnalysisResult {
    /// Node the change applies to
    pub source_node_id: NodeId,

    /// Composite id of the source node
    #[serde(rename = "source_composite_id")]
    pub source_composite: String,

    /// Kind of change
    pub impact_type: ImpactType,

    /// Affected nodes in traversal order
    pub affected_nodes: Vec<AffectedNode>,

    /// Overall score, 0-100
    pub impact_score: u32,

    /// Deepest cascade level reached
    pub cascade_depth: usize,

    /// Rough effort estimate
    pub estimated_time: String,

    /// Problems met during traversal
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    /// Suggested next steps
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
}

impl ImpactAnalysisResult {
    /// Count affected nodes at the given tier.
    #[must_use]
    pub fn count_at(&self, level: ImpactLevel) -> usize {
        self.affected_nodes
            .iter()
            .filter(|node| node.impact_level == level)
            .count()
    }
}

/// A detected circular dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircularDependency {
    /// Cycle members, starting at the lowest id
    pub path: Vec<NodeId>,

    /// Labels parallel to `path`
    pub node_details: Vec<String>,

    /// Strength of the weakest edge in the cycle
    pub strength: u8,
}

/// Result of checking a proposed edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyValidationResult {
    /// Whether the edge may be added
    pub is_valid: bool,

    /// Reasons the edge is rejected
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,

    /// Non-blocking observations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    /// Cycles the edge would close
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cycles: Vec<CircularDependency>,
}

impl DependencyValidationResult {
    /// A passing result with no messages.
    #[must_use]
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            cycles: Vec::new(),
        }
    }

    /// Record a blocking error and mark the result invalid.
    pub fn reject(&mut self, error: impl Into<String>) {
        self.is_valid = false;
        self.errors.push(error.into());
    }
}

/// One entry of a dependency or dependent tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyTreeNode {
    /// Node id of the related node
    pub node_id: NodeId,

    /// Composite id of the related node
    pub composite_id: String,

    /// Node title
    pub title: String,

    /// Type of the edge that links it
    pub dependency_type: DependencyType,

    /// Category of that type
    pub category: DependencyCategory,

    /// Edge strength
    pub strength: u8,

    /// Edge priority
    pub priority: u8,

    /// Whether the edge is required
    pub is_required: bool,

    /// Version constraint from edge metadata, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_constraint: Option<String>,

    /// Edge metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,

    /// Entries one level further out
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DependencyTreeNode>,
}

/// Two-sided dependency view of one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyGraphView {
    /// Root node
    pub node_id: NodeId,

    /// What the root depends on
    pub dependencies: Vec<DependencyTreeNode>,

    /// What depends on the root
    pub dependents: Vec<DependencyTreeNode>,

    /// Deepest level reached on either side
    pub depth: usize,

    /// Whether the root sits on a cycle within the depth bound
    pub has_circular: bool,

    /// Number of direct dependencies
    pub total_dependencies: usize,

    /// Number of direct dependents
    pub total_dependents: usize,
}
