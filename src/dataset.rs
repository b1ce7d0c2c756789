//! Dataset discovery (§6, external collaborator): walks a directory tree
//! pairing each `*.graphml` file with its sibling `*.goal.xml` file.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::RunError;

/// One graph file paired with its goal file, keyed by a name derived from
/// the graph file's stem.
#[derive(Debug, Clone)]
pub struct DatasetEntry {
    pub name: String,
    pub graph_path: PathBuf,
    pub goal_path: PathBuf,
}

/// Walks `dataset_root` and returns every `(graph, goal)` pair found, sorted
/// by path so a run is reproducible across filesystems with different
/// directory-entry ordering.
pub fn discover(dataset_root: &Path) -> Result<Vec<DatasetEntry>, RunError> {
    if !dataset_root.is_dir() {
        return Err(RunError::BadDatasetRoot { path: dataset_root.to_path_buf() });
    }

    let mut entries = Vec::new();
    let walker = WalkDir::new(dataset_root).sort_by(|a, b| a.file_name().cmp(b.file_name()));

    for entry in walker.into_iter().filter_map(Result::ok) {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("graphml") {
            continue;
        }
        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        let goal_path = path.with_file_name(format!("{stem}.goal.xml"));
        if !goal_path.is_file() {
            continue;
        }
        entries.push(DatasetEntry { name: stem, graph_path: path.to_path_buf(), goal_path });
    }

    Ok(entries)
}
