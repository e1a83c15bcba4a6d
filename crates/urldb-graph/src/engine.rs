//! Engine facade.
//!
//! [`DependencyEngine`] wires the analyses to one set of collaborators, one
//! configuration and one result cache. Cycle reports, impact analyses and
//! dependency trees are read through the cache; validation always hits
//! storage because it guards writes.
//!
//! Every operation has a `_with_cancel` twin taking a [`CancelToken`]; the
//! plain form runs with a token that never trips.

use crate::cache::{CacheKey, CachedValue, GraphCache, NoopCache, TtlGraphCache};
use crate::cancel::CancelToken;
use crate::config::EngineConfig;
use crate::domain::{
    CircularDependency, DependencyGraphView, DependencyValidationResult, ImpactAnalysisResult,
    ImpactType, NodeId, ScopeId,
};
use crate::error::Result;
use crate::graph::{
    CycleDetector, DependencyTreeService, DependencyValidator, ImpactAnalyzer, ImpactPolicy,
    Repositories,
};
use crate::storage::{DependencyStorage, NodeStorage};
use std::sync::Arc;

/// Entry point for dependency graph operations
#[derive(Clone)]
pub struct DependencyEngine {
    config: EngineConfig,
    cache: Arc<dyn GraphCache>,
    cycles: CycleDetector,
    validator: DependencyValidator,
    impact: ImpactAnalyzer,
    tree: DependencyTreeService,
}

impl DependencyEngine {
    /// Create an engine over both collaborators.
    ///
    /// The cache follows `config.cache`: a [`TtlGraphCache`] when enabled,
    /// otherwise a [`NoopCache`].
    #[must_use]
    pub fn new(
        dependencies: Arc<dyn DependencyStorage>,
        nodes: Arc<dyn NodeStorage>,
        config: EngineConfig,
    ) -> Self {
        Self::from_repositories(Repositories::new(dependencies, nodes), config)
    }

    /// Create an engine over whichever collaborators are available.
    ///
    /// Operations that need a missing collaborator fail with
    /// `Error::RepositoryUnavailable`.
    #[must_use]
    pub fn from_repositories(repos: Repositories, config: EngineConfig) -> Self {
        let cache: Arc<dyn GraphCache> = if config.cache.enabled {
            Arc::new(TtlGraphCache::new(config.cache.max_entries))
        } else {
            Arc::new(NoopCache)
        };

        let tool_name = config.composite.tool_name.clone();
        let policy = ImpactPolicy {
            tool_name: tool_name.clone(),
            max_depth: config.traversal.max_depth,
            max_fan_out: config.traversal.max_fan_out,
            impact: config.impact.clone(),
        };

        Self {
            cycles: CycleDetector::new(repos.clone(), tool_name.clone()),
            validator: DependencyValidator::new(repos.clone(), tool_name.clone()),
            impact: ImpactAnalyzer::new(repos.clone(), policy),
            tree: DependencyTreeService::new(repos, tool_name)
                .with_depth_limit(config.traversal.max_depth),
            cache,
            config,
        }
    }

    /// Replace the result cache, e.g. to share one across engines.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn GraphCache>) -> Self {
        self.cache = cache;
        self
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Drop every cached result. Call after mutating edges.
    pub fn invalidate_cache(&self) {
        self.cache.invalidate_all();
    }

    /// Check whether `dependent -> dependency` may be added.
    ///
    /// # Errors
    ///
    /// See [`DependencyValidator::validate_new_dependency`].
    pub async fn validate_new_dependency(
        &self,
        dependent: NodeId,
        dependency: NodeId,
    ) -> Result<DependencyValidationResult> {
        self.validate_new_dependency_with_cancel(dependent, dependency, &CancelToken::new())
            .await
    }

    /// [`validate_new_dependency`](Self::validate_new_dependency) with a
    /// cancel token.
    ///
    /// # Errors
    ///
    /// See [`DependencyValidator::validate_new_dependency`].
    pub async fn validate_new_dependency_with_cancel(
        &self,
        dependent: NodeId,
        dependency: NodeId,
        cancel: &CancelToken,
    ) -> Result<DependencyValidationResult> {
        self.validator
            .validate_new_dependency(dependent, dependency, cancel)
            .await
    }

    /// Find every circular dependency in `scope`.
    ///
    /// # Errors
    ///
    /// See [`CycleDetector::detect_cycles`].
    pub async fn detect_cycles(&self, scope: ScopeId) -> Result<Vec<CircularDependency>> {
        self.detect_cycles_with_cancel(scope, &CancelToken::new())
            .await
    }

    /// [`detect_cycles`](Self::detect_cycles) with a cancel token.
    ///
    /// # Errors
    ///
    /// See [`CycleDetector::detect_cycles`].
    pub async fn detect_cycles_with_cancel(
        &self,
        scope: ScopeId,
        cancel: &CancelToken,
    ) -> Result<Vec<CircularDependency>> {
        let key = CacheKey::Cycles(scope);
        if let Some(CachedValue::Cycles(cycles)) = self.cache.get(&key) {
            tracing::debug!(scope = %scope, "Cycle report served from cache");
            return Ok(cycles);
        }

        let cycles = self.cycles.detect_cycles(scope, cancel).await?;
        self.cache
            .put(key, CachedValue::Cycles(cycles.clone()), self.config.cache.ttl());
        Ok(cycles)
    }

    /// Analyze the impact of `impact_type` on `node`.
    ///
    /// `max_depth` overrides the configured traversal depth.
    ///
    /// # Errors
    ///
    /// See [`ImpactAnalyzer::analyze_impact`].
    pub async fn analyze_impact(
        &self,
        node: NodeId,
        impact_type: &str,
        max_depth: Option<usize>,
    ) -> Result<ImpactAnalysisResult> {
        self.analyze_impact_with_cancel(node, impact_type, max_depth, &CancelToken::new())
            .await
    }

    /// [`analyze_impact`](Self::analyze_impact) with a cancel token.
    ///
    /// # Errors
    ///
    /// See [`ImpactAnalyzer::analyze_impact`].
    pub async fn analyze_impact_with_cancel(
        &self,
        node: NodeId,
        impact_type: &str,
        max_depth: Option<usize>,
        cancel: &CancelToken,
    ) -> Result<ImpactAnalysisResult> {
        let impact_type: ImpactType = impact_type.parse()?;
        let max_depth = max_depth.unwrap_or(self.config.traversal.max_depth);

        let key = CacheKey::Impact {
            node,
            max_depth,
            impact_type,
        };
        if let Some(CachedValue::Impact(result)) = self.cache.get(&key) {
            tracing::debug!(node = %node, impact_type = %impact_type, "Impact served from cache");
            return Ok(result);
        }

        let result = self
            .impact
            .analyze(node, impact_type, max_depth, cancel)
            .await?;
        self.cache
            .put(key, CachedValue::Impact(result.clone()), self.config.cache.ttl());
        Ok(result)
    }

    /// Build the two-sided dependency view of `node`.
    ///
    /// `max_depth` defaults to the configured tree depth and is clamped to
    /// `traversal.max-depth`.
    ///
    /// # Errors
    ///
    /// See [`DependencyTreeService::dependency_graph`].
    pub async fn dependency_graph(
        &self,
        node: NodeId,
        max_depth: Option<usize>,
    ) -> Result<DependencyGraphView> {
        self.dependency_graph_with_cancel(node, max_depth, &CancelToken::new())
            .await
    }

    /// [`dependency_graph`](Self::dependency_graph) with a cancel token.
    ///
    /// # Errors
    ///
    /// See [`DependencyTreeService::dependency_graph`].
    pub async fn dependency_graph_with_cancel(
        &self,
        node: NodeId,
        max_depth: Option<usize>,
        cancel: &CancelToken,
    ) -> Result<DependencyGraphView> {
        let max_depth = max_depth
            .unwrap_or(self.config.traversal.tree_depth)
            .min(self.config.traversal.max_depth);

        let key = CacheKey::Tree { node, max_depth };
        if let Some(CachedValue::Tree(view)) = self.cache.get(&key) {
            tracing::debug!(node = %node, "Dependency tree served from cache");
            return Ok(view);
        }

        let view = self.tree.dependency_graph(node, max_depth, cancel).await?;
        self.cache
            .put(key, CachedValue::Tree(view.clone()), self.config.cache.ttl());
        Ok(view)
    }
}
