//! Scorecard CSV emitter (§6): one row per dataset entry summarizing the
//! chosen assigner's outcome.

use std::path::Path;

use serde::Serialize;

use crate::error::RunError;
use crate::solution::Solution;

#[derive(Debug, Clone, Serialize)]
pub struct ScorecardRow {
    pub dataset_entry: String,
    pub assigner: String,
    pub throughput: u64,
    pub latency: u64,
    pub registers: u64,
    pub found_combo_cycle: bool,
    pub slack_ps: i64,
}

impl ScorecardRow {
    pub fn from_solution(dataset_entry: impl Into<String>, assigner: &str, solution: &Solution) -> Self {
        Self {
            dataset_entry: dataset_entry.into(),
            assigner: assigner.to_string(),
            throughput: solution.score.throughput,
            latency: solution.score.latency,
            registers: solution.score.registers,
            found_combo_cycle: solution.found_combo_cycle,
            slack_ps: solution.slack,
        }
    }
}

/// Writes `rows` to `path` as CSV, one row per line, header included.
pub fn write_scorecard(path: &Path, rows: &[ScorecardRow]) -> Result<(), RunError> {
    let mut writer = csv::Writer::from_path(path).map_err(|source| RunError::ScorecardWrite {
        path: path.to_path_buf(),
        source,
    })?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|source| RunError::ScorecardWrite { path: path.to_path_buf(), source })?;
    }
    writer
        .flush()
        .map_err(|source| RunError::ScorecardWrite { path: path.to_path_buf(), source: csv::Error::from(source) })?;
    Ok(())
}
