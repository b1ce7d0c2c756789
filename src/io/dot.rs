//! DOT export (§6): a per-solution visualization aid, not part of the core
//! engine's contract.

use std::collections::HashSet;
use std::io::{self, Write};

use crate::graph::{DirectedGraph, VertexIndex};

/// Writes `graph` as a DOT digraph to `out`, marking effectively-registered
/// vertices as filled and feedback edges as dashed.
pub fn write_dot<W: Write>(graph: &DirectedGraph, registered: &HashSet<VertexIndex>, out: &mut W) -> io::Result<()> {
    writeln!(out, "digraph delay_graph {{")?;
    for v in graph.vertex_indices() {
        let vertex = graph.vertex(v);
        let filled = graph.is_effectively_registered(v, registered);
        writeln!(
            out,
            "  n{v} [label=\"{}\" style={}];",
            vertex.vertex_id,
            if filled { "filled" } else { "solid" }
        )?;
    }
    for (_, edge) in graph.edges() {
        let style = if edge.is_feedback { "dashed" } else { "solid" };
        writeln!(out, "  n{} -> n{} [label=\"{}\" style={style}];", edge.source, edge.target, edge.delay)?;
    }
    writeln!(out, "}}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeType, Vertex};

    #[test]
    fn renders_a_registered_vertex_as_filled() {
        let mut g = DirectedGraph::new();
        g.add_vertex(Vertex {
            vertex_id: 0,
            node_unique_id: -1,
            node_type: NodeType::Other,
            is_input_terminal: false,
            is_output_terminal: false,
            is_registered: false,
            disallow_register: false,
            throughput_cost_if_registered: 0,
            latency_cost_if_registered: 0,
            register_cost_if_registered: 0,
        });
        let registered: HashSet<VertexIndex> = [0].into_iter().collect();
        let mut out = Vec::new();
        write_dot(&g, &registered, &mut out).unwrap();
        let rendered = String::from_utf8(out).unwrap();
        assert!(rendered.contains("style=filled"));
    }
}
