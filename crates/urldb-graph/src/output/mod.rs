//! Output formatting for CLI commands.
//!
//! Every command prints either human-readable text or pretty JSON of the
//! result type, which carries the same field names url-db handlers serve.
//!
//! Submodules:
//! - [`color`]: Color and styling helpers
//! - `tree`: Dependency tree rendering with ASCII/Unicode connectors

pub mod color;
mod tree;

use crate::domain::{
    CircularDependency, DependencyGraphView, DependencyValidationResult, ImpactAnalysisResult,
};
use serde::Serialize;
use std::env;
use std::io::{self, Write};

use color::{bold, colorize_id, colorize_level, dimmed, error, success, warning};

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

/// Configuration for text output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use ASCII-only connectors instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new `OutputConfig` with explicit values.
    #[must_use]
    pub fn new(use_ascii: bool, use_colors: bool) -> Self {
        Self {
            use_ascii,
            use_colors,
        }
    }

    /// Create an `OutputConfig` by reading from environment variables.
    ///
    /// Reads:
    /// - `URLDB_ASCII`: Set to "1" or "true" for ASCII-only connectors
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `URLDB_COLOR`: Set to "0" or "false" to disable colors
    #[must_use]
    pub fn from_env() -> Self {
        let use_ascii = match env::var("URLDB_ASCII") {
            Ok(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
            Ok(v) if v == "0" || v.eq_ignore_ascii_case("false") || v.is_empty() => false,
            Ok(v) => {
                tracing::warn!(
                    env_var = "URLDB_ASCII",
                    value = %v,
                    "Invalid value (expected '1', 'true', '0', or 'false'), using default"
                );
                false
            }
            Err(_) => false,
        };

        // Respect NO_COLOR standard (https://no-color.org/)
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("URLDB_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self {
            use_ascii,
            use_colors,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::new(false, true)
    }
}

/// Print any serializable value as pretty JSON
///
/// # Errors
///
/// Returns an I/O error if serialization or the write fails.
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json(&mut handle, value)
}

fn write_json<W: Write, T: Serialize>(w: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    writeln!(w, "{json}")
}

/// Print a cycle report in the specified format
///
/// # Errors
///
/// Returns an I/O error if writing to stdout fails.
pub fn print_cycles(cycles: &[CircularDependency], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match mode {
        OutputMode::Json => write_json(&mut handle, &cycles),
        OutputMode::Text => print_cycles_text(&mut handle, cycles, &OutputConfig::from_env()),
    }
}

/// Print a validation result in the specified format
///
/// # Errors
///
/// Returns an I/O error if writing to stdout fails.
pub fn print_validation(result: &DependencyValidationResult, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match mode {
        OutputMode::Json => write_json(&mut handle, result),
        OutputMode::Text => print_validation_text(&mut handle, result, &OutputConfig::from_env()),
    }
}

/// Print an impact analysis in the specified format
///
/// # Errors
///
/// Returns an I/O error if writing to stdout fails.
pub fn print_impact(result: &ImpactAnalysisResult, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match mode {
        OutputMode::Json => write_json(&mut handle, result),
        OutputMode::Text => print_impact_text(&mut handle, result, &OutputConfig::from_env()),
    }
}

/// Print a dependency view in the specified format
///
/// # Errors
///
/// Returns an I/O error if writing to stdout fails.
pub fn print_view(view: &DependencyGraphView, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match mode {
        OutputMode::Json => write_json(&mut handle, view),
        OutputMode::Text => tree::print_view_text(&mut handle, view, &OutputConfig::from_env()),
    }
}

fn print_cycles_text<W: Write>(
    w: &mut W,
    cycles: &[CircularDependency],
    config: &OutputConfig,
) -> io::Result<()> {
    if cycles.is_empty() {
        return writeln!(w, "{}", success("No circular dependencies found", config));
    }

    writeln!(
        w,
        "{}",
        bold(&format!("{} circular dependencies:", cycles.len()), config)
    )?;
    for (i, cycle) in cycles.iter().enumerate() {
        let path: Vec<String> = cycle.path.iter().map(ToString::to_string).collect();
        let mut closed = path.clone();
        if let Some(first) = path.first() {
            closed.push(first.clone());
        }
        writeln!(
            w,
            "{}. {} {}",
            i + 1,
            colorize_id(&closed.join(" -> "), config),
            dimmed(&format!("(strength {})", cycle.strength), config)
        )?;
        for detail in &cycle.node_details {
            writeln!(w, "   {detail}")?;
        }
    }
    Ok(())
}

fn print_validation_text<W: Write>(
    w: &mut W,
    result: &DependencyValidationResult,
    config: &OutputConfig,
) -> io::Result<()> {
    if result.is_valid {
        writeln!(w, "{}", success("Dependency is valid", config))?;
    } else {
        writeln!(w, "{}", error("Dependency is invalid", config))?;
    }
    for message in &result.errors {
        writeln!(w, "  {} {message}", error("error:", config))?;
    }
    for message in &result.warnings {
        writeln!(w, "  {} {message}", warning("warning:", config))?;
    }
    if !result.cycles.is_empty() {
        print_cycles_text(w, &result.cycles, config)?;
    }
    Ok(())
}

fn print_impact_text<W: Write>(
    w: &mut W,
    result: &ImpactAnalysisResult,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "{} {} of {}",
        bold("Impact:", config),
        result.impact_type,
        colorize_id(&result.source_composite, config)
    )?;
    writeln!(
        w,
        "Score {} | cascade depth {} | estimated {}",
        result.impact_score, result.cascade_depth, result.estimated_time
    )?;

    if result.affected_nodes.is_empty() {
        writeln!(w, "{}", success("No affected nodes", config))?;
    } else {
        writeln!(w)?;
        for node in &result.affected_nodes {
            writeln!(
                w,
                "{} {} {}",
                colorize_level(node.impact_level, config),
                colorize_id(&node.composite_id, config),
                node.title
            )?;
            writeln!(w, "         {}", dimmed(&node.reason, config))?;
            writeln!(w, "         -> {}", node.action_needed)?;
        }
    }

    for message in &result.warnings {
        writeln!(w, "{} {message}", warning("warning:", config))?;
    }
    if !result.recommendations.is_empty() {
        writeln!(w)?;
        writeln!(w, "{}", bold("Recommendations:", config))?;
        for recommendation in &result.recommendations {
            writeln!(w, "  - {recommendation}")?;
        }
    }
    Ok(())
}
