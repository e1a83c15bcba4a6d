//! Impact analysis.
//!
//! Walks the dependents of a source node (reverse edges), assigning each an
//! impact tier from the change type and the edge that reached it. The walk
//! descends below a dependent only when the edge carries the change type's
//! cascade flag, and never for version changes.
//!
//! Pre-order, siblings in storage order, with a visited set seeded with the
//! source so every node is scored once even in cyclic or diamond-shaped
//! graphs.

use super::Repositories;
use crate::cancel::CancelToken;
use crate::config::ImpactConfig;
use crate::domain::{
    AffectedNode, DependencyEdge, DependencyType, ImpactAnalysisResult, ImpactLevel, ImpactType,
    NodeId,
};
use crate::error::{Error, Result};
use std::collections::HashSet;

/// Scoring, wording and bounds used by [`ImpactAnalyzer`].
#[derive(Debug, Clone)]
pub struct ImpactPolicy {
    /// Composite id prefix
    pub tool_name: String,

    /// Deepest hop count explored
    pub max_depth: usize,

    /// Most dependents expanded below one node
    pub max_fan_out: usize,

    /// Time and recommendation constants
    pub impact: ImpactConfig,
}

fn impact_level(impact_type: ImpactType, edge: &DependencyEdge) -> ImpactLevel {
    match impact_type {
        ImpactType::Delete => {
            if edge.cascade_delete {
                return ImpactLevel::Critical;
            }
            match edge.dependency_type {
                DependencyType::Hard => ImpactLevel::High,
                DependencyType::Reference => ImpactLevel::Low,
                _ => ImpactLevel::Medium,
            }
        }
        ImpactType::Update => {
            if edge.cascade_update {
                return ImpactLevel::High;
            }
            match edge.dependency_type {
                DependencyType::Hard => ImpactLevel::Medium,
                _ => ImpactLevel::Low,
            }
        }
        ImpactType::VersionChange => match edge.dependency_type {
            DependencyType::Hard | DependencyType::Runtime => ImpactLevel::High,
            DependencyType::Compile => ImpactLevel::Medium,
            _ => ImpactLevel::Low,
        },
    }
}

fn action_needed(impact_type: ImpactType, cascades: bool, level: ImpactLevel) -> &'static str {
    match (impact_type, cascades, level) {
        (ImpactType::Delete, true, _) => "Will be automatically deleted",
        (ImpactType::Delete, false, ImpactLevel::Critical | ImpactLevel::High) => {
            "Review and update or remove dependency"
        }
        (ImpactType::Delete, false, ImpactLevel::Medium) => "Consider updating configuration",
        (ImpactType::Update, true, _) => "Will be automatically updated",
        (ImpactType::Update, false, ImpactLevel::Critical | ImpactLevel::High) => {
            "Review and test changes"
        }
        (ImpactType::Update, false, ImpactLevel::Medium) => "Monitor for compatibility issues",
        (ImpactType::Delete | ImpactType::Update, false, ImpactLevel::Low) => {
            "Update documentation if needed"
        }
        (ImpactType::VersionChange, _, ImpactLevel::Critical | ImpactLevel::High) => {
            "Verify version compatibility and update constraints"
        }
        (ImpactType::VersionChange, _, ImpactLevel::Medium) => "Test with new version",
        (ImpactType::VersionChange, _, ImpactLevel::Low) => "Update version constraint if needed",
    }
}

fn reason(impact_type: ImpactType, edge: &DependencyEdge) -> String {
    match impact_type {
        ImpactType::Delete => format!(
            "Depends on deleted node with {} dependency",
            edge.dependency_type
        ),
        ImpactType::Update => format!(
            "May need update due to {} dependency change",
            edge.dependency_type
        ),
        ImpactType::VersionChange => "Has version constraint that may be affected".to_string(),
    }
}

/// Integer mean of tier points, amplified for wide impacts, capped at 100.
fn impact_score(nodes: &[AffectedNode], policy: &ImpactConfig) -> u32 {
    let Ok(count) = u32::try_from(nodes.len()) else {
        return 100;
    };
    if count == 0 {
        return 0;
    }

    let total: u32 = nodes
        .iter()
        .map(|node| node.impact_level.points())
        .fold(0, u32::saturating_add);
    let mean = total / count;
    let amplified = mean.saturating_mul(policy.amplification_percent(nodes.len())) / 100;
    amplified.min(100)
}

#[allow(clippy::cast_precision_loss)]
fn estimated_time(impact_type: ImpactType, count: usize, depth: usize, policy: &ImpactConfig) -> String {
    let cost = policy.cost(impact_type);
    let count = u64::try_from(count).unwrap_or(u64::MAX);
    let depth = u64::try_from(depth).unwrap_or(u64::MAX);
    let minutes = count
        .saturating_mul(cost.minutes_per_node)
        .saturating_add(depth.saturating_mul(cost.minutes_per_level));

    if minutes < 60 {
        format!("{minutes} minutes")
    } else {
        format!("{:.1} hours", minutes as f64 / 60.0)
    }
}

fn recommendations(result: &ImpactAnalysisResult, policy: &ImpactConfig) -> Vec<String> {
    let count = result.affected_nodes.len();
    let mut out = Vec::new();

    match result.impact_type {
        ImpactType::Delete => {
            let critical = result.count_at(ImpactLevel::Critical);
            if critical > 0 {
                out.push(format!(
                    "{critical} nodes will be automatically deleted due to cascade delete"
                ));
                out.push("Consider backing up data before proceeding".to_string());
            }
            let high = result.count_at(ImpactLevel::High);
            if high > 0 {
                out.push(format!("Review {high} nodes with high impact dependencies"));
            }
            if count > policy.phased_deletion_threshold {
                out.push("Consider phased deletion approach to minimize disruption".to_string());
            }
        }
        ImpactType::Update => {
            if count > 0 {
                out.push("Test in staging environment before production deployment".to_string());
            }
            if result.cascade_depth > policy.deep_cascade_threshold {
                out.push("Deep cascade detected - consider gradual rollout".to_string());
            }
        }
        ImpactType::VersionChange => {
            if count > 0 {
                out.push("Verify version constraints are compatible".to_string());
                out.push("Run compatibility tests before deployment".to_string());
            }
        }
    }

    out
}

/// A dependent waiting to be scored, with the path that reached it
struct Pending {
    edge: DependencyEdge,
    path: Vec<NodeId>,
}

/// Computes the blast radius of a change to one node.
#[derive(Clone)]
pub struct ImpactAnalyzer {
    repos: Repositories,
    policy: ImpactPolicy,
}

impl ImpactAnalyzer {
    /// Create an analyzer with the given policy.
    #[must_use]
    pub fn new(repos: Repositories, policy: ImpactPolicy) -> Self {
        Self { repos, policy }
    }

    /// The policy this analyzer scores with.
    #[must_use]
    pub fn policy(&self) -> &ImpactPolicy {
        &self.policy
    }

    /// Analyze `impact_type` (`delete`, `update` or `version_change`) on
    /// `source`, bounded by the policy's max depth.
    ///
    /// The impact type is checked before any storage call.
    ///
    /// # Errors
    ///
    /// - `Error::UnsupportedImpactType` for any other impact type
    /// - `Error::RepositoryUnavailable` if a collaborator is missing
    /// - `Error::NodeNotFound` if `source` does not exist
    /// - `Error::Cancelled` if `cancel` trips
    pub async fn analyze_impact(
        &self,
        source: NodeId,
        impact_type: &str,
        cancel: &CancelToken,
    ) -> Result<ImpactAnalysisResult> {
        let impact_type: ImpactType = impact_type.parse()?;
        self.analyze(source, impact_type, self.policy.max_depth, cancel)
            .await
    }

    /// Analyze an already parsed impact type with an explicit depth bound.
    ///
    /// # Errors
    ///
    /// Same as [`analyze_impact`](Self::analyze_impact), minus the impact
    /// type check.
    pub async fn analyze(
        &self,
        source: NodeId,
        impact_type: ImpactType,
        max_depth: usize,
        cancel: &CancelToken,
    ) -> Result<ImpactAnalysisResult> {
        self.repos.require_all()?;

        let source_node = self
            .repos
            .node(source, cancel)
            .await?
            .ok_or(Error::NodeNotFound(source))?;

        let mut warnings = Vec::new();
        let mut affected = Vec::new();
        let mut visited: HashSet<NodeId> = HashSet::from([source]);
        let mut depth_capped = false;

        let direct = self.repos.dependents_of(source, cancel).await?;
        let mut stack: Vec<Pending> = Vec::new();
        self.push_children(&mut stack, &mut warnings, source, direct, &[source]);

        while let Some(Pending { edge, path }) = stack.pop() {
            cancel.check()?;

            if impact_type == ImpactType::VersionChange && edge.version_constraint().is_none() {
                continue;
            }

            let node_id = edge.dependent_node_id;
            if !visited.insert(node_id) {
                continue;
            }

            let cascades = impact_type.cascade_flag(edge.cascade_delete, edge.cascade_update);

            // an unresolvable node still passes the cascade on to its dependents
            if cascades {
                let children = self.repos.dependents_of(node_id, cancel).await?;
                if path.len().saturating_sub(1) < max_depth {
                    self.push_children(&mut stack, &mut warnings, node_id, children, &path);
                } else if !children.is_empty() && !depth_capped {
                    depth_capped = true;
                    warnings.push(format!("Traversal stopped at max depth {max_depth}"));
                }
            }

            let Some(node) = self.repos.node(node_id, cancel).await? else {
                warnings.push(format!("Dependent node {node_id} could not be resolved"));
                continue;
            };

            let level = impact_level(impact_type, &edge);
            let entry = AffectedNode {
                node_id,
                composite_id: node.composite_id(&self.policy.tool_name),
                title: node.title,
                impact_level: level,
                reason: reason(impact_type, &edge),
                action_needed: action_needed(impact_type, cascades, level).to_string(),
                path,
            };

            affected.push(entry);
        }

        let cascade_depth = affected.iter().map(AffectedNode::depth).max().unwrap_or(0);
        let mut result = ImpactAnalysisResult {
            source_node_id: source,
            source_composite: source_node.composite_id(&self.policy.tool_name),
            impact_type,
            impact_score: impact_score(&affected, &self.policy.impact),
            estimated_time: estimated_time(
                impact_type,
                affected.len(),
                cascade_depth,
                &self.policy.impact,
            ),
            affected_nodes: affected,
            cascade_depth,
            warnings,
            recommendations: Vec::new(),
        };
        result.recommendations = recommendations(&result, &self.policy.impact);

        tracing::debug!(
            node = %source,
            impact_type = %impact_type,
            affected = result.affected_nodes.len(),
            score = result.impact_score,
            "Impact analysis complete"
        );
        Ok(result)
    }

    /// Queue `children` so they pop in storage order, honoring the fan-out cap.
    fn push_children(
        &self,
        stack: &mut Vec<Pending>,
        warnings: &mut Vec<String>,
        parent: NodeId,
        mut children: Vec<DependencyEdge>,
        parent_path: &[NodeId],
    ) {
        let cap = self.policy.max_fan_out;
        if children.len() > cap {
            warnings.push(format!(
                "Dependents of node {parent} truncated to max fan-out {cap}"
            ));
            children.truncate(cap);
        }

        for edge in children.into_iter().rev() {
            let mut path = parent_path.to_vec();
            path.push(edge.dependent_node_id);
            stack.push(Pending { edge, path });
        }
    }
}
