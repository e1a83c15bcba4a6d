//! urldb-graph CLI binary.

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use urldb_graph::cli::Cli;

/// Main entry point for the urldb-graph CLI.
///
/// Each invocation runs one analysis over a loaded snapshot, so the
/// current_thread runtime is enough.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Controlled via RUST_LOG, e.g. RUST_LOG=urldb_graph=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("urldb_graph=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting urldb-graph CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("urldb-graph CLI completed successfully");
    Ok(())
}
