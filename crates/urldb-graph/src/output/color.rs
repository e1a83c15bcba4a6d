//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Critical / invalid: red
//!   - High / warnings:    yellow
//!   - Medium:             blue
//!   - Low / valid:        green
//!   - Ids:                cyan
//!   - Muted:              dimmed (edge types, connectors)

use crate::domain::ImpactLevel;
use colored::Colorize;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Colorize an id or composite id (cyan).
pub(crate) fn colorize_id(id: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return id.to_string();
    }
    id.cyan().to_string()
}

/// Apply dimmed style to text.
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply bold style to text.
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}

/// Impact level label, padded for column alignment, colored by severity.
pub(crate) fn colorize_level(level: ImpactLevel, config: &OutputConfig) -> String {
    let text = format!("{:<8}", level.as_str());
    if !config.use_colors {
        return text;
    }
    match level {
        ImpactLevel::Critical => text.red().bold().to_string(),
        ImpactLevel::High => text.yellow().to_string(),
        ImpactLevel::Medium => text.blue().to_string(),
        ImpactLevel::Low => text.green().to_string(),
    }
}
