//! Engine configuration.
//!
//! Configuration is a YAML document with kebab-case keys. Every field has a
//! default, so an empty file (or no file at all) yields the stock url-db
//! behavior:
//!
//! ```yaml
//! composite:
//!   tool-name: url-db
//! traversal:
//!   max-depth: 32
//!   max-fan-out: 10000
//!   tree-depth: 3
//! cache:
//!   enabled: true
//!   ttl-seconds: 300
//!   max-entries: 10000
//! impact:
//!   delete: { minutes-per-node: 5, minutes-per-level: 10 }
//!   update: { minutes-per-node: 2, minutes-per-level: 5 }
//!   version-change: { minutes-per-node: 3, minutes-per-level: 0 }
//!   amplification:
//!     - { above: 10, percent: 120 }
//!     - { above: 5, percent: 110 }
//!   phased-deletion-threshold: 5
//!   deep-cascade-threshold: 3
//! ```

use crate::domain::ImpactType;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;

/// Default tool name used in composite ids
pub const DEFAULT_TOOL_NAME: &str = "url-db";

/// Default maximum hop count for impact traversal
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Default maximum number of dependents expanded per node
pub const DEFAULT_MAX_FAN_OUT: usize = 10_000;

/// Default depth of the dependency tree view
pub const DEFAULT_TREE_DEPTH: usize = 3;

/// Default cache entry lifetime in seconds
pub const DEFAULT_TTL_SECONDS: u64 = 300;

/// Default bound on the number of cached results
pub const DEFAULT_MAX_ENTRIES: u64 = 10_000;

/// Hard upper bound for `traversal.max-depth`; tree views are nested this
/// deep at most.
pub const MAX_TRAVERSAL_DEPTH: usize = 1024;

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct EngineConfig {
    /// Composite id rendering
    pub composite: CompositeConfig,

    /// Traversal bounds
    pub traversal: TraversalConfig,

    /// Result cache
    pub cache: CacheConfig,

    /// Impact scoring policy
    pub impact: ImpactConfig,
}

/// Composite id section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct CompositeConfig {
    /// Leading segment of `<tool>:<domain>:<id>`
    pub tool_name: String,
}

impl Default for CompositeConfig {
    fn default() -> Self {
        Self {
            tool_name: DEFAULT_TOOL_NAME.to_string(),
        }
    }
}

/// Traversal section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct TraversalConfig {
    /// Deepest cascade level explored by impact analysis
    pub max_depth: usize,

    /// Most dependents expanded below any single node
    pub max_fan_out: usize,

    /// Depth used by the tree view when the caller gives none. Requested
    /// tree depths are clamped to `max_depth`.
    pub tree_depth: usize,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_fan_out: DEFAULT_MAX_FAN_OUT,
            tree_depth: DEFAULT_TREE_DEPTH,
        }
    }
}

/// Cache section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct CacheConfig {
    /// Whether results are cached at all
    pub enabled: bool,

    /// Entry lifetime
    pub ttl_seconds: u64,

    /// Most results held at once; least useful entries are evicted first
    pub max_entries: u64,
}

impl CacheConfig {
    /// Entry lifetime as a `Duration`.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: DEFAULT_TTL_SECONDS,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

/// Effort estimate constants for one impact type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct TimeCost {
    /// Minutes charged per affected node
    pub minutes_per_node: u64,

    /// Minutes charged per cascade level
    pub minutes_per_level: u64,
}

impl TimeCost {
    /// Create a cost pair.
    #[must_use]
    pub const fn new(minutes_per_node: u64, minutes_per_level: u64) -> Self {
        Self {
            minutes_per_node,
            minutes_per_level,
        }
    }
}

/// Score multiplier applied when more than `above` nodes are affected
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct AmplificationTier {
    /// Exclusive lower bound on the affected-node count
    pub above: usize,

    /// Multiplier in percent (120 means x1.2)
    pub percent: u32,
}

/// Impact scoring section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct ImpactConfig {
    /// Cost of a delete
    pub delete: TimeCost,

    /// Cost of an update
    pub update: TimeCost,

    /// Cost of a version change
    pub version_change: TimeCost,

    /// Amplification tiers; the first matching tier in descending `above`
    /// order wins
    pub amplification: Vec<AmplificationTier>,

    /// Above this many affected nodes a delete suggests a phased approach
    pub phased_deletion_threshold: usize,

    /// Above this cascade depth an update suggests a gradual rollout
    pub deep_cascade_threshold: usize,
}

impl ImpactConfig {
    /// Effort constants for `impact_type`.
    #[must_use]
    pub const fn cost(&self, impact_type: ImpactType) -> TimeCost {
        match impact_type {
            ImpactType::Delete => self.delete,
            ImpactType::Update => self.update,
            ImpactType::VersionChange => self.version_change,
        }
    }

    /// Multiplier in percent for `count` affected nodes (100 when no tier
    /// applies).
    #[must_use]
    pub fn amplification_percent(&self, count: usize) -> u32 {
        self.amplification
            .iter()
            .filter(|tier| count > tier.above)
            .max_by_key(|tier| tier.above)
            .map_or(100, |tier| tier.percent)
    }
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            delete: TimeCost::new(5, 10),
            update: TimeCost::new(2, 5),
            version_change: TimeCost::new(3, 0),
            amplification: vec![
                AmplificationTier {
                    above: 10,
                    percent: 120,
                },
                AmplificationTier {
                    above: 5,
                    percent: 110,
                },
            ],
            phased_deletion_threshold: 5,
            deep_cascade_threshold: 3,
        }
    }
}

impl EngineConfig {
    /// Parse configuration from YAML text and validate it.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the text is malformed or fails validation.
    pub fn from_yaml(content: &str) -> Result<Self> {
        // serde_yaml maps an empty document to unit, not an empty map
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self =
            serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// - `Error::Io` if the file cannot be read
    /// - `Error::Config` if it cannot be parsed or fails validation
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        Self::from_yaml(&content)
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// - `Error::Config` if serialization fails
    /// - `Error::Io` if the file cannot be written
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Reject values that cannot produce meaningful results.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` naming the first offending key.
    pub fn validate(&self) -> Result<()> {
        if self.composite.tool_name.trim().is_empty() {
            return Err(Error::Config("composite.tool-name must not be empty".to_string()));
        }

        if self.composite.tool_name.contains(':') {
            return Err(Error::Config(
                "composite.tool-name must not contain ':'".to_string(),
            ));
        }

        if self.traversal.max_depth == 0 {
            return Err(Error::Config(
                "traversal.max-depth must be at least 1".to_string(),
            ));
        }

        if self.traversal.max_depth > MAX_TRAVERSAL_DEPTH {
            return Err(Error::Config(format!(
                "traversal.max-depth must be at most {MAX_TRAVERSAL_DEPTH}"
            )));
        }

        if self.traversal.tree_depth > self.traversal.max_depth {
            return Err(Error::Config(
                "traversal.tree-depth must not exceed traversal.max-depth".to_string(),
            ));
        }

        if self.traversal.max_fan_out == 0 {
            return Err(Error::Config(
                "traversal.max-fan-out must be at least 1".to_string(),
            ));
        }

        if self.cache.enabled && self.cache.ttl_seconds == 0 {
            return Err(Error::Config(
                "cache.ttl-seconds must be positive when the cache is enabled".to_string(),
            ));
        }

        if self.cache.enabled && self.cache.max_entries == 0 {
            return Err(Error::Config(
                "cache.max-entries must be positive when the cache is enabled".to_string(),
            ));
        }

        if let Some(tier) = self.impact.amplification.iter().find(|t| t.percent == 0) {
            return Err(Error::Config(format!(
                "impact.amplification tier above {} has a zero percent factor",
                tier.above
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_url_db_policy() {
        let config = EngineConfig::default();

        assert_eq!(config.composite.tool_name, "url-db");
        assert!(config.cache.enabled);
        assert_eq!(config.cache.ttl(), Duration::from_secs(300));
        assert_eq!(config.cache.max_entries, 10_000);
        assert_eq!(config.impact.cost(ImpactType::Delete), TimeCost::new(5, 10));
        assert_eq!(config.impact.cost(ImpactType::Update), TimeCost::new(2, 5));
        assert_eq!(
            config.impact.cost(ImpactType::VersionChange),
            TimeCost::new(3, 0)
        );
        assert!(config.validate().is_ok());
    }

    #[rstest]
    #[case(0, 100)]
    #[case(5, 100)]
    #[case(6, 110)]
    #[case(10, 110)]
    #[case(11, 120)]
    #[case(500, 120)]
    fn test_amplification_tiers(#[case] count: usize, #[case] expected: u32) {
        let impact = ImpactConfig::default();
        assert_eq!(impact.amplification_percent(count), expected);
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let config = EngineConfig::from_yaml(
            "composite:\n  tool-name: bookmarks\nimpact:\n  delete: { minutes-per-node: 1, minutes-per-level: 2 }\n",
        )
        .unwrap();

        assert_eq!(config.composite.tool_name, "bookmarks");
        assert_eq!(config.impact.delete, TimeCost::new(1, 2));
        assert_eq!(config.impact.update, TimeCost::new(2, 5));
        assert_eq!(config.traversal, TraversalConfig::default());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(EngineConfig::from_yaml("").unwrap(), EngineConfig::default());
    }

    #[rstest]
    #[case("composite:\n  tool-name: \"\"\n")]
    #[case("composite:\n  tool-name: \"a:b\"\n")]
    #[case("traversal:\n  max-depth: 0\n")]
    #[case("traversal:\n  max-fan-out: 0\n")]
    #[case("cache:\n  ttl-seconds: 0\n")]
    #[case("cache:\n  max-entries: 0\n")]
    #[case("traversal:\n  max-depth: 1025\n")]
    #[case("traversal:\n  max-depth: 2\n  tree-depth: 3\n")]
    #[case("impact:\n  amplification:\n    - { above: 3, percent: 0 }\n")]
    fn test_invalid_values_are_rejected(#[case] yaml: &str) {
        assert!(matches!(
            EngineConfig::from_yaml(yaml),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_disabled_cache_allows_zero_ttl() {
        let config = EngineConfig::from_yaml("cache:\n  enabled: false\n  ttl-seconds: 0\n").unwrap();
        assert!(!config.cache.enabled);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("engine.yaml");

        let mut config = EngineConfig::default();
        config.traversal.max_depth = 4;
        config.save(&path).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("max-depth: 4"));

        let loaded = EngineConfig::load(&path).await.unwrap();
        assert_eq!(loaded, config);
    }
}
