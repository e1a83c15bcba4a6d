//! urldb-graph - dependency graph analysis for url-db.
//!
//! url-db stores typed, directed dependency edges between bookmarked nodes.
//! This crate provides the graph side of that model: building an adjacency
//! view of a scope, detecting cycles, validating proposed edges before they
//! are written and estimating the impact of deleting, updating or
//! re-versioning a node.
//!
//! Storage stays behind the [`storage::DependencyStorage`] and
//! [`storage::NodeStorage`] traits. [`storage::in_memory`] is the bundled
//! backend used by the CLI and the tests.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use urldb_graph::{DependencyEngine, EngineConfig, NodeId};
//! use urldb_graph::storage::in_memory::load_snapshot;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let (storage, _warnings) = load_snapshot("graph.yaml".as_ref()).await?;
//! let storage = Arc::new(storage);
//! let engine = DependencyEngine::new(storage.clone(), storage, EngineConfig::default());
//!
//! let check = engine.validate_new_dependency(NodeId(3), NodeId(1)).await?;
//! if !check.is_valid {
//!     println!("{:?}", check.errors);
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod cache;
pub mod cancel;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod graph;
pub mod storage;

// Public CLI module (needed by binary)
pub mod cli;

// Output formatting for CLI commands
pub mod output;

pub use cache::{GraphCache, NoopCache, TtlGraphCache};
pub use cancel::CancelToken;
pub use config::EngineConfig;
pub use domain::{
    CircularDependency, DependencyEdge, DependencyGraphView, DependencyType,
    DependencyValidationResult, ImpactAnalysisResult, ImpactLevel, ImpactType, Node, NodeId,
    ScopeId,
};
pub use engine::DependencyEngine;
pub use error::{Error, Result};
pub use graph::Repositories;
