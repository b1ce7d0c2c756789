use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading a GraphML graph or goal file from disk.
///
/// These occur before any core type is constructed; the core engine never
/// sees malformed input.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("file {path} could not be opened")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("file {path} could not be parsed as XML")]
    Xml {
        path: PathBuf,
        #[source]
        source: quick_xml::Error,
    },
    #[error("{path}: {reason}")]
    Malformed { path: PathBuf, reason: String },
    #[error("{path}: vertex id {id} referenced before it was declared")]
    UnknownVertex { path: PathBuf, id: String },
    #[error("{path}: could not parse integer field {field}")]
    InvalidInteger {
        path: PathBuf,
        field: &'static str,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("{path}: could not parse boolean field {field}")]
    InvalidBool { path: PathBuf, field: &'static str },
    #[error("{path}: target clock period must be a positive integer, got {raw}")]
    InvalidTargetPeriod { path: PathBuf, raw: String },
}

/// The one error the core solve path itself can raise (§7 of the spec).
///
/// A well-formed graph (feedback edges correctly marked) never trips this;
/// it only fires if the forward-edge subgraph is not actually acyclic,
/// which means upstream data is degenerate.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SolveError {
    #[error("unexpected bad topological seed: forward-edge subgraph is not acyclic")]
    BadTopologicalSeed,
}

/// Failures aggregating a run across many dataset entries.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("dataset root {path} does not exist or is not a directory")]
    BadDatasetRoot { path: PathBuf },
    #[error("scorecard directory {path} could not be created")]
    ScorecardDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to ingest dataset entry {name}")]
    Ingest {
        name: String,
        #[source]
        source: IngestError,
    },
    #[error("solve for dataset entry {name} failed")]
    Solve {
        name: String,
        #[source]
        source: SolveError,
    },
    #[error("solve task for dataset entry {name} panicked")]
    TaskJoin {
        name: String,
        #[source]
        source: tokio::task::JoinError,
    },
    #[error("scorecard could not be written to {path}")]
    ScorecardWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
