//! Goal-file importer (§6): reads the target clock period and enforces the
//! hard floor that no period may be tighter than the graph's own widest
//! single-edge delay.

use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::IngestError;
use crate::graph::DirectedGraph;

/// Reads `<TargetClockPeriodInPicoSeconds>` from the goal file at `path`,
/// raising it to `graph`'s maximum single-edge delay if the declared value
/// is smaller.
pub fn load_target_period_ps(path: &Path, graph: &DirectedGraph) -> Result<u64, IngestError> {
    let content = std::fs::read_to_string(path).map_err(|source| IngestError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = Reader::from_str(&content);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut in_target = false;
    let mut raw: Option<String> = None;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|source| IngestError::Xml { path: path.to_path_buf(), source })?;
        match event {
            Event::Eof => break,
            Event::Start(tag) if tag.name().as_ref() == b"TargetClockPeriodInPicoSeconds" => {
                in_target = true;
            }
            Event::End(tag) if tag.name().as_ref() == b"TargetClockPeriodInPicoSeconds" => {
                in_target = false;
            }
            Event::Text(text) if in_target => {
                let value = text
                    .unescape()
                    .map_err(|source| IngestError::Xml { path: path.to_path_buf(), source })?
                    .into_owned();
                raw = Some(value);
            }
            _ => {}
        }
        buf.clear();
    }

    let raw = raw.ok_or_else(|| IngestError::Malformed {
        path: path.to_path_buf(),
        reason: "missing TargetClockPeriodInPicoSeconds element".to_string(),
    })?;
    let declared: i64 = raw.trim().parse().map_err(|_| IngestError::InvalidTargetPeriod {
        path: path.to_path_buf(),
        raw: raw.clone(),
    })?;
    if declared <= 0 {
        return Err(IngestError::InvalidTargetPeriod { path: path.to_path_buf(), raw });
    }

    let max_edge_delay = graph.edges().map(|(_, e)| e.delay).max().unwrap_or(0);
    Ok((declared as u64).max(max_edge_delay))
}
