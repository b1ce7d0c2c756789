//! Latency assigners (C5, C6): strategies that turn a graph and a target
//! period into a candidate registered-vertex set, handed to
//! [`crate::solution::evaluate`] for fixup and scoring.

pub mod asap;
pub mod greedy;

use std::collections::HashSet;
use std::fmt;

use crate::graph::{DirectedGraph, VertexIndex};

/// Common interface over the two assignment strategies so a caller (the
/// runner, benchmarks) can pick one without matching on a strategy enum at
/// every call site.
pub trait LatencyAssigner {
    fn assign(&self, graph: &DirectedGraph, target_period_ps: u64) -> HashSet<VertexIndex>;
    fn name(&self) -> &'static str;
}

/// Forward-sweep strategy (§4.5): registers a vertex as soon as it would
/// otherwise bridge too long a combinational segment.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsapAssigner;

impl LatencyAssigner for AsapAssigner {
    fn assign(&self, graph: &DirectedGraph, target_period_ps: u64) -> HashSet<VertexIndex> {
        asap::assign(graph, target_period_ps)
    }

    fn name(&self) -> &'static str {
        "asap"
    }
}

/// Register-all-then-de-register strategy (§4.6).
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyAssigner;

impl LatencyAssigner for GreedyAssigner {
    fn assign(&self, graph: &DirectedGraph, target_period_ps: u64) -> HashSet<VertexIndex> {
        greedy::assign(graph, target_period_ps)
    }

    fn name(&self) -> &'static str {
        "greedy"
    }
}

/// Selects an assigner implementation from configuration or the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AssignerKind {
    Asap,
    Greedy,
}

impl AssignerKind {
    pub fn build(self) -> Box<dyn LatencyAssigner> {
        match self {
            Self::Asap => Box::new(AsapAssigner),
            Self::Greedy => Box::new(GreedyAssigner),
        }
    }
}

impl fmt::Display for AssignerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asap => write!(f, "asap"),
            Self::Greedy => write!(f, "greedy"),
        }
    }
}
