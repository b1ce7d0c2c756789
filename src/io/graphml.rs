//! GraphML importer (§6): reads the `http://graphml.graphdrawing.org/xmlns`
//! variant described for this engine — `<data key="...">` children named
//! directly after the field they carry, no indirection through a `<key>`
//! declaration block.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::IngestError;
use crate::graph::{DirectedGraph, NodeType, Vertex};

#[derive(Default)]
struct PendingNode {
    graphml_id: String,
    fields: HashMap<String, String>,
}

#[derive(Default)]
struct PendingEdge {
    source: String,
    target: String,
    fields: HashMap<String, String>,
}

/// Parses the GraphML file at `path` into a [`DirectedGraph`].
///
/// Vertices and edges are added in document order, so the resulting
/// graph's insertion order matches the file's node/edge order.
pub fn load_graph(path: &Path) -> Result<DirectedGraph, IngestError> {
    let content = std::fs::read_to_string(path).map_err(|source| IngestError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = Reader::from_str(&content);
    reader.config_mut().trim_text(true);

    let mut graph = DirectedGraph::new();
    let mut graphml_id_to_index: HashMap<String, usize> = HashMap::new();
    let mut buf = Vec::new();

    let mut current_node: Option<PendingNode> = None;
    let mut current_edge: Option<PendingEdge> = None;
    let mut current_data_key: Option<String> = None;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|source| IngestError::Xml { path: path.to_path_buf(), source })?;

        match event {
            Event::Eof => break,
            Event::Start(tag) if tag.name().as_ref() == b"node" => {
                let graphml_id = attr_value(&tag, path, "id")?;
                current_node = Some(PendingNode { graphml_id, fields: HashMap::new() });
            }
            Event::End(tag) if tag.name().as_ref() == b"node" => {
                if let Some(pending) = current_node.take() {
                    let index = build_vertex(&mut graph, path, &pending)?;
                    graphml_id_to_index.insert(pending.graphml_id, index);
                }
            }
            Event::Start(tag) if tag.name().as_ref() == b"edge" => {
                let source = attr_value(&tag, path, "source")?;
                let target = attr_value(&tag, path, "target")?;
                current_edge = Some(PendingEdge { source, target, fields: HashMap::new() });
            }
            Event::End(tag) if tag.name().as_ref() == b"edge" => {
                if let Some(pending) = current_edge.take() {
                    add_edge(&mut graph, path, &graphml_id_to_index, &pending)?;
                }
            }
            Event::Start(tag) if tag.name().as_ref() == b"data" => {
                current_data_key = Some(attr_value(&tag, path, "key")?);
            }
            Event::Text(text) => {
                if let Some(key) = current_data_key.take() {
                    let value = text
                        .unescape()
                        .map_err(|source| IngestError::Xml { path: path.to_path_buf(), source })?
                        .into_owned();
                    if let Some(node) = current_node.as_mut() {
                        node.fields.insert(key, value);
                    } else if let Some(edge) = current_edge.as_mut() {
                        edge.fields.insert(key, value);
                    }
                }
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(graph)
}

fn attr_value(tag: &quick_xml::events::BytesStart, path: &Path, name: &str) -> Result<String, IngestError> {
    for attr in tag.attributes() {
        let attr = attr.map_err(|_| IngestError::Malformed {
            path: path.to_path_buf(),
            reason: format!("malformed attribute on <{}>", String::from_utf8_lossy(tag.name().as_ref())),
        })?;
        if attr.key.as_ref() == name.as_bytes() {
            let value = attr
                .unescape_value()
                .map_err(|source| IngestError::Xml { path: path.to_path_buf(), source })?;
            return Ok(value.into_owned());
        }
    }
    Err(IngestError::Malformed {
        path: path.to_path_buf(),
        reason: format!("<{}> missing attribute {name}", String::from_utf8_lossy(tag.name().as_ref())),
    })
}

fn field<'a>(fields: &'a HashMap<String, String>, path: &Path, name: &'static str) -> Result<&'a str, IngestError> {
    fields.get(name).map(String::as_str).ok_or_else(|| IngestError::Malformed {
        path: path.to_path_buf(),
        reason: format!("missing data key {name}"),
    })
}

fn parse_int<T>(path: &Path, field_name: &'static str, raw: &str) -> Result<T, IngestError>
where
    T: FromStr<Err = std::num::ParseIntError>,
{
    raw.parse::<T>().map_err(|source| IngestError::InvalidInteger { path: path.to_path_buf(), field: field_name, source })
}

fn parse_bool(path: &Path, field_name: &'static str, raw: &str) -> Result<bool, IngestError> {
    match raw {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(IngestError::InvalidBool { path: path.to_path_buf(), field: field_name }),
    }
}

fn build_vertex(graph: &mut DirectedGraph, path: &Path, pending: &PendingNode) -> Result<usize, IngestError> {
    let fields = &pending.fields;
    let vertex_id: i64 = parse_int(path, "VertexId", field(fields, path, "VertexId")?)?;
    let node_type_ordinal: i64 = parse_int(path, "NodeType", field(fields, path, "NodeType")?)?;
    let node_type = NodeType::from_ordinal(node_type_ordinal).ok_or_else(|| IngestError::Malformed {
        path: path.to_path_buf(),
        reason: format!("unknown NodeType ordinal {node_type_ordinal}"),
    })?;
    let node_unique_id: i64 = parse_int(path, "NodeUniqueId", field(fields, path, "NodeUniqueId")?)?;
    let throughput_cost_if_registered: u64 =
        parse_int(path, "ThroughputCostIfRegistered", field(fields, path, "ThroughputCostIfRegistered")?)?;
    let latency_cost_if_registered: u64 =
        parse_int(path, "LatencyCostIfRegistered", field(fields, path, "LatencyCostIfRegistered")?)?;
    let register_cost_if_registered: u64 =
        parse_int(path, "RegisterCostIfRegistered", field(fields, path, "RegisterCostIfRegistered")?)?;
    let is_registered = parse_bool(path, "IsRegistered", field(fields, path, "IsRegistered")?)?;
    let is_input_terminal = parse_bool(path, "IsInputTerminal", field(fields, path, "IsInputTerminal")?)?;
    let is_output_terminal = parse_bool(path, "IsOutputTerminal", field(fields, path, "IsOutputTerminal")?)?;
    let disallow_register = parse_bool(path, "DisallowRegister", field(fields, path, "DisallowRegister")?)?;

    let vertex = Vertex {
        vertex_id,
        node_unique_id,
        node_type,
        is_input_terminal,
        is_output_terminal,
        is_registered,
        disallow_register,
        throughput_cost_if_registered,
        latency_cost_if_registered,
        register_cost_if_registered,
    };
    graph.add_vertex(vertex);
    graph.vertex_index_by_id(vertex_id).ok_or_else(|| IngestError::Malformed {
        path: path.to_path_buf(),
        reason: format!("vertex {vertex_id} could not be indexed after insertion"),
    })
}

fn add_edge(
    graph: &mut DirectedGraph,
    path: &Path,
    graphml_id_to_index: &HashMap<String, usize>,
    pending: &PendingEdge,
) -> Result<(), IngestError> {
    let delay: u64 = parse_int(path, "Delay", field(&pending.fields, path, "Delay")?)?;
    let is_feedback = parse_bool(path, "IsFeedback", field(&pending.fields, path, "IsFeedback")?)?;

    let source = *graphml_id_to_index
        .get(&pending.source)
        .ok_or_else(|| IngestError::UnknownVertex { path: path.to_path_buf(), id: pending.source.clone() })?;
    let target = *graphml_id_to_index
        .get(&pending.target)
        .ok_or_else(|| IngestError::UnknownVertex { path: path.to_path_buf(), id: pending.target.clone() })?;

    graph.add_edge(source, target, delay, is_feedback);
    Ok(())
}
