//! CLI argument structs for all commands.

use clap::Parser;

/// Arguments for the `cycles` command
#[derive(Parser, Debug, Clone)]
pub struct CyclesArgs {
    /// Scope (domain id) to analyze
    #[arg(short, long, allow_hyphen_values = true)]
    pub scope: i64,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug, Clone)]
pub struct ValidateArgs {
    /// Node that would gain the dependency
    #[arg(allow_hyphen_values = true)]
    pub dependent: i64,

    /// Node that would be depended upon
    #[arg(allow_hyphen_values = true)]
    pub dependency: i64,
}

/// Arguments for the `impact` command
#[derive(Parser, Debug, Clone)]
pub struct ImpactArgs {
    /// Node the change applies to
    #[arg(allow_hyphen_values = true)]
    pub node: i64,

    /// Kind of change: delete, update or version_change
    pub impact_type: String,

    /// Deepest cascade level to explore (defaults to the configured value)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_depth: Option<u32>,
}

/// Arguments for the `tree` command
#[derive(Parser, Debug, Clone)]
pub struct TreeArgs {
    /// Root node
    #[arg(allow_hyphen_values = true)]
    pub node: i64,

    /// Levels to expand on each side (defaults to the configured value)
    #[arg(long, value_parser = clap::value_parser!(u32))]
    pub max_depth: Option<u32>,
}
