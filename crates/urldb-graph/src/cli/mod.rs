//! CLI argument parsing and command dispatch.
//!
//! The CLI loads a graph snapshot into the in-memory backend and runs one
//! analysis over it. It is an operator and debugging surface; production
//! callers embed [`DependencyEngine`](crate::engine::DependencyEngine)
//! directly.
//!
//! # Commands
//!
//! - `cycles`: List circular dependencies in a scope
//! - `validate`: Check whether a new edge may be added
//! - `impact`: Score the blast radius of a change
//! - `tree`: Show what a node depends on and what depends on it
//!
//! # Global Flags
//!
//! - `--snapshot <file>`: YAML or JSON graph snapshot (required)
//! - `--config <file>`: Engine configuration (YAML)
//! - `--json`: Output in JSON format
//!
//! # Example
//!
//! ```bash
//! urldb-graph --snapshot graph.yaml cycles --scope 1
//! urldb-graph --snapshot graph.yaml validate 3 1
//! urldb-graph --snapshot graph.yaml --json impact 50 delete --max-depth 4
//! urldb-graph --snapshot graph.yaml tree 5 --max-depth 2
//! ```

mod args;
mod execute;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

pub use args::{CyclesArgs, ImpactArgs, TreeArgs, ValidateArgs};

use crate::config::EngineConfig;
use crate::engine::DependencyEngine;
use crate::output::OutputMode;
use crate::storage::in_memory::load_snapshot;

/// Dependency graph analysis for url-db
///
/// Detects circular dependencies, validates proposed edges and estimates the
/// impact of deleting, updating or re-versioning a node.
#[derive(Parser, Debug)]
#[command(name = "urldb-graph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Graph snapshot to analyze (YAML or JSON)
    #[arg(long, global = true, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,

    /// Engine configuration file (YAML)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List circular dependencies in a scope
    ///
    /// Runs strongly-connected-component analysis over every edge whose
    /// dependent belongs to the scope.
    Cycles(CyclesArgs),

    /// Check whether a new dependency may be added
    ///
    /// Rejects self-dependencies and edges that would close a cycle.
    Validate(ValidateArgs),

    /// Analyze the impact of a change to a node
    ///
    /// Walks the node's dependents and scores how hard they are hit.
    Impact(ImpactArgs),

    /// Show the dependency tree of a node
    ///
    /// Lists both what the node depends on and what depends on it.
    Tree(TreeArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    #[must_use]
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    ///
    /// # Errors
    ///
    /// Returns the clap error for invalid arguments.
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Load configuration and snapshot, then build the engine.
    ///
    /// # Errors
    ///
    /// Fails if no snapshot is given or either file cannot be loaded.
    pub async fn engine(&self) -> Result<DependencyEngine> {
        let config = match &self.config {
            Some(path) => EngineConfig::load(path).await?,
            None => EngineConfig::default(),
        };

        let snapshot = self
            .snapshot
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("--snapshot <FILE> is required"))?;
        let (storage, warnings) = load_snapshot(snapshot).await?;
        if !warnings.is_empty() {
            tracing::info!(
                skipped = warnings.len(),
                "Snapshot loaded with skipped edges"
            );
        }

        let storage = Arc::new(storage);
        Ok(DependencyEngine::new(storage.clone(), storage, config))
    }

    /// Execute the CLI command
    ///
    /// # Errors
    ///
    /// Returns any engine, loading or output error.
    pub async fn execute(&self) -> Result<()> {
        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        let engine = self.engine().await?;
        match &self.command {
            Commands::Cycles(args) => execute::execute_cycles(&engine, args, output_mode).await,
            Commands::Validate(args) => {
                execute::execute_validate(&engine, args, output_mode).await
            }
            Commands::Impact(args) => execute::execute_impact(&engine, args, output_mode).await,
            Commands::Tree(args) => execute::execute_tree(&engine, args, output_mode).await,
        }
    }
}
