//! Read-through cache for analysis results.
//!
//! The engine consults a [`GraphCache`] before recomputing impact analyses,
//! scope cycle reports and dependency trees. The cache is injected as
//! `Arc<dyn GraphCache>` so tests and callers that mutate edges often can
//! swap in [`NoopCache`].
//!
//! [`TtlGraphCache`] is bounded: each entry carries its own time-to-live and
//! the least useful entries are evicted once `max_entries` is reached.
//! Expired entries are reclaimed by the cache's housekeeping, not left for a
//! later read to find. A `put` for an existing key overwrites it.

use crate::domain::{
    CircularDependency, DependencyGraphView, ImpactAnalysisResult, ImpactType, NodeId, ScopeId,
};
use crate::config::DEFAULT_MAX_ENTRIES;
use moka::Expiry;
use moka::sync::Cache;
use std::time::{Duration, Instant};

/// Identifies one cached computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Impact analysis of `node` bounded by `max_depth`
    Impact {
        /// Source node
        node: NodeId,
        /// Traversal depth bound
        max_depth: usize,
        /// Kind of change
        impact_type: ImpactType,
    },

    /// Cycle report for a scope
    Cycles(ScopeId),

    /// Dependency tree of `node` bounded by `max_depth`
    Tree {
        /// Root node
        node: NodeId,
        /// Tree depth bound
        max_depth: usize,
    },
}

/// A cached result
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    /// Impact analysis result
    Impact(ImpactAnalysisResult),

    /// Cycles found in a scope
    Cycles(Vec<CircularDependency>),

    /// Dependency tree view
    Tree(DependencyGraphView),
}

/// Result cache shared by concurrent requests.
///
/// Each call is atomic; implementations must be safe to share across tasks.
pub trait GraphCache: Send + Sync {
    /// Look up a live entry.
    fn get(&self, key: &CacheKey) -> Option<CachedValue>;

    /// Store `value` under `key` for `ttl`.
    fn put(&self, key: CacheKey, value: CachedValue, ttl: Duration);

    /// Drop every entry.
    fn invalidate_all(&self);
}

#[derive(Clone)]
struct Entry {
    value: CachedValue,
    ttl: Duration,
}

/// Expires each entry after the ttl it was stored with.
struct PerEntryTtl;

impl Expiry<CacheKey, Entry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &CacheKey,
        value: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &CacheKey,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process cache with per-entry time-to-live and a size bound
#[derive(Clone)]
pub struct TtlGraphCache {
    entries: Cache<CacheKey, Entry>,
}

impl TtlGraphCache {
    /// Create an empty cache holding at most `max_entries` results.
    #[must_use]
    pub fn new(max_entries: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(PerEntryTtl)
            .build();
        Self { entries }
    }

    /// Number of live entries after pending evictions have run.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.run_pending_tasks();
        usize::try_from(self.entries.entry_count()).unwrap_or(usize::MAX)
    }

    /// Whether the cache holds no live entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TtlGraphCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl GraphCache for TtlGraphCache {
    fn get(&self, key: &CacheKey) -> Option<CachedValue> {
        self.entries.get(key).map(|entry| entry.value)
    }

    fn put(&self, key: CacheKey, value: CachedValue, ttl: Duration) {
        self.entries.insert(key, Entry { value, ttl });
    }

    fn invalidate_all(&self) {
        self.entries.invalidate_all();
        tracing::debug!("Result cache cleared");
    }
}

/// Cache that stores nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCache;

impl GraphCache for NoopCache {
    fn get(&self, _key: &CacheKey) -> Option<CachedValue> {
        None
    }

    fn put(&self, _key: CacheKey, _value: CachedValue, _ttl: Duration) {}

    fn invalidate_all(&self) {}
}
