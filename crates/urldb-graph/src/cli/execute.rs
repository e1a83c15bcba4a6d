//! Command execution logic.

use anyhow::Result;

use super::args::{CyclesArgs, ImpactArgs, TreeArgs, ValidateArgs};
use crate::domain::{NodeId, ScopeId};
use crate::engine::DependencyEngine;
use crate::output::{self, OutputMode};

/// Execute the cycles command
pub async fn execute_cycles(
    engine: &DependencyEngine,
    args: &CyclesArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let cycles = engine.detect_cycles(ScopeId(args.scope)).await?;
    output::print_cycles(&cycles, output_mode)?;
    Ok(())
}

/// Execute the validate command
pub async fn execute_validate(
    engine: &DependencyEngine,
    args: &ValidateArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let result = engine
        .validate_new_dependency(NodeId(args.dependent), NodeId(args.dependency))
        .await?;
    output::print_validation(&result, output_mode)?;
    Ok(())
}

/// Execute the impact command
pub async fn execute_impact(
    engine: &DependencyEngine,
    args: &ImpactArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let max_depth = args.max_depth.map(usize::try_from).transpose()?;
    let result = engine
        .analyze_impact(NodeId(args.node), &args.impact_type, max_depth)
        .await?;
    output::print_impact(&result, output_mode)?;
    Ok(())
}

/// Execute the tree command
pub async fn execute_tree(
    engine: &DependencyEngine,
    args: &TreeArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let max_depth = args.max_depth.map(usize::try_from).transpose()?;
    let view = engine.dependency_graph(NodeId(args.node), max_depth).await?;
    output::print_view(&view, output_mode)?;
    Ok(())
}
