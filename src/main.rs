use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use register_placer::assign::AssignerKind;
use register_placer::runner::{self, RunnerConfig};

/// Register (latency) assignment engine: solves every dataset entry under
/// `dataset-root` and writes a combined scorecard into `scorecard-dir`.
#[derive(Debug, Parser)]
#[command(name = "register-placer", version, about)]
struct Cli {
    /// Directory tree containing `*.graphml` / `*.goal.xml` pairs.
    dataset_root: PathBuf,
    /// Directory the scorecard CSV (and optional DOT files) are written to.
    scorecard_dir: PathBuf,
    /// Which latency assigner to run.
    #[arg(long, value_enum, default_value_t = AssignerKind::Greedy)]
    assigner: AssignerKind,
    /// Maximum number of dataset entries solved concurrently.
    #[arg(long, default_value_t = 8)]
    max_concurrent_solves: usize,
    /// Write a per-entry DOT visualization alongside the scorecard.
    #[arg(long)]
    emit_dot: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let config = RunnerConfig {
        assigner: cli.assigner,
        max_concurrent_solves: cli.max_concurrent_solves,
        emit_dot: cli.emit_dot,
    };

    let stats = runner::run(&cli.dataset_root, &cli.scorecard_dir, config).await?;

    tracing::info!(
        entries_processed = stats.entries_processed,
        entries_failed = stats.entries_failed,
        cycles_found = stats.cycles_found,
        "dataset run complete"
    );

    Ok(())
}
