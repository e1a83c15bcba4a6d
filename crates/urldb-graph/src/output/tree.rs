//! Dependency tree rendering for `urldb-graph tree` output.

use std::io::{self, Write};

use super::color::{bold, colorize_id, dimmed, warning};
use super::OutputConfig;
use crate::domain::{DependencyGraphView, DependencyTreeNode};

/// Render both sides of a dependency view with ASCII/Unicode connectors.
///
/// ```text
/// ◆ node 5 (depth 2)
/// Dependencies:
/// ├── url-db:docs:2 Setup (hard)
/// │   └── url-db:docs:1 Intro (soft, optional)
/// └── url-db:docs:3 Usage (reference, optional)
/// Dependents: none
/// ```
pub(crate) fn print_view_text<W: Write>(
    w: &mut W,
    view: &DependencyGraphView,
    config: &OutputConfig,
) -> io::Result<()> {
    let root_icon = if config.use_ascii { "*" } else { "◆" };
    writeln!(
        w,
        "{} node {} {}",
        bold(root_icon, config),
        colorize_id(&view.node_id.to_string(), config),
        dimmed(&format!("(depth {})", view.depth), config)
    )?;
    if view.has_circular {
        writeln!(w, "{}", warning("Circular dependency through this node", config))?;
    }

    print_side(w, "Dependencies", &view.dependencies, config)?;
    print_side(w, "Dependents", &view.dependents, config)
}

fn print_side<W: Write>(
    w: &mut W,
    title: &str,
    entries: &[DependencyTreeNode],
    config: &OutputConfig,
) -> io::Result<()> {
    if entries.is_empty() {
        return writeln!(w, "{}: none", bold(title, config));
    }
    writeln!(w, "{}:", bold(title, config))?;
    print_children(w, entries, &[], config)
}

/// Recursively render tree entries with connector lines.
///
/// `prefix_segments` tracks which ancestor levels still have siblings below.
fn print_children<W: Write>(
    w: &mut W,
    children: &[DependencyTreeNode],
    prefix_segments: &[bool],
    config: &OutputConfig,
) -> io::Result<()> {
    let (branch, corner, pipe, space) = if config.use_ascii {
        ("|-- ", "`-- ", "|   ", "    ")
    } else {
        ("├── ", "└── ", "│   ", "    ")
    };

    for (i, child) in children.iter().enumerate() {
        let is_last = i + 1 == children.len();

        let mut prefix = String::new();
        for &has_more in prefix_segments {
            prefix.push_str(&dimmed(if has_more { pipe } else { space }, config));
        }
        let connector = dimmed(if is_last { corner } else { branch }, config);

        let mut detail = child.dependency_type.to_string();
        if !child.is_required {
            detail.push_str(", optional");
        }
        if let Some(constraint) = &child.version_constraint {
            detail.push_str(", ");
            detail.push_str(constraint);
        }

        writeln!(
            w,
            "{}{}{} {} {}",
            prefix,
            connector,
            colorize_id(&child.composite_id, config),
            child.title,
            dimmed(&format!("({detail})"), config)
        )?;

        if !child.children.is_empty() {
            let mut next_segments = prefix_segments.to_vec();
            next_segments.push(!is_last);
            print_children(w, &child.children, &next_segments, config)?;
        }
    }

    Ok(())
}
