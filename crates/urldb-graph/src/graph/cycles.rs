//! Circular dependency detection.
//!
//! Tarjan's strongly-connected-components algorithm, run iteratively with an
//! explicit call stack so that deep chains cannot overflow the thread stack.
//! Every component with two or more members is reported as one cycle.

use super::builder::DependencyGraph;
use super::{rotate_to_min, GraphBuilder, Repositories};
use crate::cancel::CancelToken;
use crate::domain::{CircularDependency, NodeId, ScopeId, MAX_STRENGTH};
use crate::error::Result;
use std::collections::{HashMap, HashSet};

/// Per-node Tarjan bookkeeping, indexed densely by position in
/// `DependencyGraph::nodes()`.
struct Tarjan<'g> {
    ids: &'g [NodeId],
    adjacency: Vec<Vec<usize>>,
    discovery: Vec<Option<usize>>,
    lowlink: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    next_index: usize,
}

impl<'g> Tarjan<'g> {
    fn new(graph: &'g DependencyGraph) -> Self {
        let ids = graph.nodes();
        let position: HashMap<NodeId, usize> =
            ids.iter().enumerate().map(|(pos, &id)| (id, pos)).collect();
        let adjacency = ids
            .iter()
            .map(|&id| {
                graph
                    .dependencies_of(id)
                    .iter()
                    .filter_map(|neighbor| position.get(&neighbor.node).copied())
                    .collect()
            })
            .collect();

        Self {
            ids,
            adjacency,
            discovery: vec![None; ids.len()],
            lowlink: vec![0; ids.len()],
            on_stack: vec![false; ids.len()],
            stack: Vec::new(),
            next_index: 0,
        }
    }

    fn discover(&mut self, v: usize) {
        self.discovery[v] = Some(self.next_index);
        self.lowlink[v] = self.next_index;
        self.next_index += 1;
        self.stack.push(v);
        self.on_stack[v] = true;
    }

    /// Run from every undiscovered node; components come back in completion
    /// order with members sorted by discovery index.
    fn run(mut self, cancel: &CancelToken) -> Result<Vec<Vec<NodeId>>> {
        let mut components = Vec::new();

        for root in 0..self.ids.len() {
            if self.discovery[root].is_some() {
                continue;
            }
            cancel.check()?;

            // (node, next neighbour position)
            let mut frames: Vec<(usize, usize)> = vec![(root, 0)];
            self.discover(root);

            while let Some(&(v, next)) = frames.last() {
                cancel.check()?;

                if let Some(&w) = self.adjacency[v].get(next) {
                    if let Some(frame) = frames.last_mut() {
                        frame.1 += 1;
                    }
                    match self.discovery[w] {
                        None => {
                            self.discover(w);
                            frames.push((w, 0));
                        }
                        Some(index) if self.on_stack[w] => {
                            self.lowlink[v] = self.lowlink[v].min(index);
                        }
                        Some(_) => {}
                    }
                    continue;
                }

                frames.pop();
                if let Some(&(parent, _)) = frames.last() {
                    self.lowlink[parent] = self.lowlink[parent].min(self.lowlink[v]);
                }

                if Some(self.lowlink[v]) == self.discovery[v] {
                    if let Some(component) = self.pop_component(v) {
                        components.push(component);
                    }
                }
            }
        }

        Ok(components)
    }

    /// Pop the component rooted at `v`; singletons are discarded.
    fn pop_component(&mut self, v: usize) -> Option<Vec<NodeId>> {
        let mut members = Vec::new();
        while let Some(w) = self.stack.pop() {
            self.on_stack[w] = false;
            members.push(w);
            if w == v {
                break;
            }
        }

        if members.len() < 2 {
            return None;
        }

        members.sort_by_key(|&w| self.discovery[w]);
        Some(members.into_iter().map(|w| self.ids[w]).collect())
    }
}

/// Find every strongly connected component of two or more nodes.
///
/// Each component lists its members in DFS discovery order, rotated to start
/// at the lowest id; components are sorted by that first id.
///
/// # Errors
///
/// Returns `Error::Cancelled` if `cancel` trips mid-run.
pub fn strongly_connected(graph: &DependencyGraph, cancel: &CancelToken) -> Result<Vec<Vec<NodeId>>> {
    let mut components = Tarjan::new(graph).run(cancel)?;
    for component in &mut components {
        rotate_to_min(component);
    }
    components.sort_by_key(|component| component.first().copied());
    Ok(components)
}

/// Weakest edge with both ends inside `members`.
fn internal_strength(graph: &DependencyGraph, members: &[NodeId]) -> u8 {
    let inside: HashSet<NodeId> = members.iter().copied().collect();
    members
        .iter()
        .flat_map(|&id| graph.dependencies_of(id))
        .filter(|neighbor| inside.contains(&neighbor.node))
        .map(|neighbor| neighbor.strength)
        .min()
        .unwrap_or(MAX_STRENGTH)
}

/// Detects circular dependency chains within a scope.
#[derive(Clone)]
pub struct CycleDetector {
    builder: GraphBuilder,
    repos: Repositories,
    tool_name: String,
}

impl CycleDetector {
    /// Create a detector; `tool_name` prefixes composite ids in node details.
    #[must_use]
    pub fn new(repos: Repositories, tool_name: impl Into<String>) -> Self {
        Self {
            builder: GraphBuilder::new(repos.clone()),
            repos,
            tool_name: tool_name.into(),
        }
    }

    /// Find all circular dependencies in `scope`.
    ///
    /// # Errors
    ///
    /// - `Error::RepositoryUnavailable` if a collaborator is missing
    /// - `Error::GraphBuildFailure` if the scope's edges cannot be fetched
    /// - `Error::Cancelled` if `cancel` trips
    pub async fn detect_cycles(
        &self,
        scope: ScopeId,
        cancel: &CancelToken,
    ) -> Result<Vec<CircularDependency>> {
        self.repos.require_all()?;
        let graph = self.builder.build_graph(scope, cancel).await?;
        self.cycles_in(&graph, cancel).await
    }

    /// Find all circular dependencies in an already built graph.
    ///
    /// # Errors
    ///
    /// - `Error::RepositoryUnavailable` if node storage is missing
    /// - `Error::Cancelled` if `cancel` trips
    pub async fn cycles_in(
        &self,
        graph: &DependencyGraph,
        cancel: &CancelToken,
    ) -> Result<Vec<CircularDependency>> {
        let components = strongly_connected(graph, cancel)?;

        let mut cycles = Vec::with_capacity(components.len());
        for path in components {
            let strength = internal_strength(graph, &path);
            let node_details = self.repos.describe(&path, &self.tool_name, cancel).await?;
            cycles.push(CircularDependency {
                path,
                node_details,
                strength,
            });
        }

        if !cycles.is_empty() {
            tracing::info!(cycles = cycles.len(), "Circular dependencies detected");
        }
        Ok(cycles)
    }
}
