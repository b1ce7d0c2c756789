//! Dataset runner (external collaborator, §6): fans a discovered dataset
//! out across independent solves.
//!
//! The core engine (§5 of the spec) is single-threaded and synchronous by
//! design — there is no shared state between graphs. This module is where
//! that independence gets turned into concurrency: each `(graph, goal)`
//! pair runs on the blocking thread pool, gated by a semaphore, and results
//! are aggregated under a lock. The teacher's producer/writer/searcher
//! pipeline streamed one shared dataset through a staged async pipeline;
//! here there is nothing to stream, so the async runtime exists purely to
//! fan out otherwise-independent blocking work.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{instrument, warn};

use crate::assign::AssignerKind;
use crate::dataset::{self, DatasetEntry};
use crate::error::RunError;
use crate::io::scorecard::{self, ScorecardRow};
use crate::io::{dot, goal, graphml};
use crate::solution;

/// Tunables for a dataset run (§6.3 of the expanded spec).
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub assigner: AssignerKind,
    pub max_concurrent_solves: usize,
    pub emit_dot: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self { assigner: AssignerKind::Greedy, max_concurrent_solves: 8, emit_dot: false }
    }
}

/// Aggregate counters over a whole dataset run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunStats {
    pub entries_processed: usize,
    pub entries_failed: usize,
    pub cycles_found: usize,
}

/// Discovers `dataset_root`, solves every entry under `config`, and writes
/// a combined scorecard CSV (and, if `config.emit_dot`, one DOT file per
/// entry) into `scorecard_dir`.
#[instrument(skip(config), fields(assigner = %config.assigner))]
pub async fn run(dataset_root: &Path, scorecard_dir: &Path, config: RunnerConfig) -> Result<RunStats, RunError> {
    std::fs::create_dir_all(scorecard_dir)
        .map_err(|source| RunError::ScorecardDir { path: scorecard_dir.to_path_buf(), source })?;

    let entries = dataset::discover(dataset_root)?;
    let stats = Arc::new(Mutex::new(RunStats::default()));
    let rows = Arc::new(Mutex::new(Vec::new()));
    let semaphore = Arc::new(Semaphore::new(config.max_concurrent_solves.max(1)));

    let mut join_set = JoinSet::new();
    for entry in entries {
        let semaphore = semaphore.clone();
        let stats = stats.clone();
        let rows = rows.clone();
        let assigner = config.assigner;
        let emit_dot = config.emit_dot;
        let scorecard_dir = scorecard_dir.to_path_buf();

        join_set.spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("runner semaphore was closed early");
            solve_one(entry, assigner, emit_dot, scorecard_dir, stats, rows).await
        });
    }

    while let Some(joined) = join_set.join_next().await {
        if let Err(join_err) = joined {
            warn!(error = %join_err, "solve task panicked");
            stats.lock().entries_failed += 1;
        }
    }

    let rows = Arc::try_unwrap(rows).map(Mutex::into_inner).unwrap_or_default();
    scorecard::write_scorecard(&scorecard_dir.join("scorecard.csv"), &rows)?;

    Ok(Arc::try_unwrap(stats).map(Mutex::into_inner).unwrap_or_default())
}

type SolveOutput = (ScorecardRow, bool, Option<String>);

#[instrument(skip(assigner, emit_dot, scorecard_dir, stats, rows), fields(entry = %entry.name))]
async fn solve_one(
    entry: DatasetEntry,
    assigner: AssignerKind,
    emit_dot: bool,
    scorecard_dir: PathBuf,
    stats: Arc<Mutex<RunStats>>,
    rows: Arc<Mutex<Vec<ScorecardRow>>>,
) {
    let name = entry.name.clone();
    let graph_path = entry.graph_path.clone();
    let goal_path = entry.goal_path.clone();

    let outcome = tokio::task::spawn_blocking(move || solve_blocking(&name, &graph_path, &goal_path, assigner, emit_dot)).await;

    let result = match outcome {
        Ok(inner) => inner,
        Err(join_err) => Err(RunError::TaskJoin { name: entry.name.clone(), source: join_err }),
    };

    match result {
        Ok((row, found_cycle, dot_text)) => {
            if let Some(dot_text) = dot_text {
                let dot_path = scorecard_dir.join(format!("{}.dot", entry.name));
                if let Err(source) = std::fs::write(&dot_path, dot_text) {
                    warn!(path = %dot_path.display(), error = %source, "failed to write DOT export");
                }
            }
            let mut guard = stats.lock();
            guard.entries_processed += 1;
            if found_cycle {
                guard.cycles_found += 1;
            }
            drop(guard);
            rows.lock().push(row);
        }
        Err(err) => {
            warn!(entry = %entry.name, error = %err, "dataset entry failed");
            stats.lock().entries_failed += 1;
        }
    }
}

fn solve_blocking(
    name: &str,
    graph_path: &Path,
    goal_path: &Path,
    assigner_kind: AssignerKind,
    emit_dot: bool,
) -> Result<SolveOutput, RunError> {
    let mut graph = graphml::load_graph(graph_path)
        .map_err(|source| RunError::Ingest { name: name.to_string(), source })?;
    graph.prune_parallel_edges();

    let target_period_ps = goal::load_target_period_ps(goal_path, &graph)
        .map_err(|source| RunError::Ingest { name: name.to_string(), source })?;

    let assigner = assigner_kind.build();
    let candidate: HashSet<_> = assigner.assign(&graph, target_period_ps);
    let solution = solution::evaluate(name.to_string(), &graph, candidate, target_period_ps)
        .map_err(|source| RunError::Solve { name: name.to_string(), source })?;

    let dot_text = if emit_dot {
        let mut buf = Vec::new();
        dot::write_dot(&graph, &solution.registered, &mut buf).ok();
        Some(String::from_utf8_lossy(&buf).into_owned())
    } else {
        None
    };

    let row = ScorecardRow::from_solution(name.to_string(), assigner.name(), &solution);
    Ok((row, solution.found_combo_cycle, dot_text))
}
