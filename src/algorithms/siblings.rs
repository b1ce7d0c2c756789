//! Sibling-group discovery (C2.5): vertices sharing `node_unique_id` and
//! terminal direction must always be registered or left bare together (I2).

use std::collections::HashMap;

use crate::graph::{DirectedGraph, VertexIndex};

/// Groups not-yet-registered vertices by `(node_unique_id, is_input_terminal)`,
/// keeping only groups with two or more members. Vertices with a negative
/// `node_unique_id` never join a group. Group order and member order are
/// both normalized to ascending vertex index so the result is deterministic
/// regardless of hash iteration order.
pub fn discover_sibling_groups(graph: &DirectedGraph) -> Vec<Vec<VertexIndex>> {
    let mut groups: HashMap<(i64, bool), Vec<VertexIndex>> = HashMap::new();

    for v in graph.vertex_indices() {
        let vertex = graph.vertex(v);
        if vertex.is_registered || vertex.node_unique_id < 0 {
            continue;
        }
        groups
            .entry((vertex.node_unique_id, vertex.is_input_terminal))
            .or_default()
            .push(v);
    }

    let mut result: Vec<Vec<VertexIndex>> = groups.into_values().filter(|g| g.len() >= 2).collect();
    for group in &mut result {
        group.sort_unstable();
    }
    result.sort_by_key(|g| g[0]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeType, Vertex};

    fn vertex(vertex_id: i64, node_unique_id: i64, is_input_terminal: bool, is_registered: bool) -> Vertex {
        Vertex {
            vertex_id,
            node_unique_id,
            node_type: NodeType::BorderNode,
            is_input_terminal,
            is_output_terminal: !is_input_terminal,
            is_registered,
            disallow_register: false,
            throughput_cost_if_registered: 0,
            latency_cost_if_registered: 0,
            register_cost_if_registered: 0,
        }
    }

    #[test]
    fn same_node_same_direction_groups_together() {
        let mut g = DirectedGraph::new();
        g.add_vertex(vertex(0, 7, true, false));
        g.add_vertex(vertex(1, 7, true, false));
        g.add_vertex(vertex(2, 7, false, false));
        let groups = discover_sibling_groups(&g);
        assert_eq!(groups, vec![vec![0, 1]]);
    }

    #[test]
    fn negative_node_unique_id_never_groups() {
        let mut g = DirectedGraph::new();
        g.add_vertex(vertex(0, -1, true, false));
        g.add_vertex(vertex(1, -1, true, false));
        assert!(discover_sibling_groups(&g).is_empty());
    }

    #[test]
    fn already_registered_vertices_are_excluded() {
        let mut g = DirectedGraph::new();
        g.add_vertex(vertex(0, 7, true, true));
        g.add_vertex(vertex(1, 7, true, false));
        assert!(discover_sibling_groups(&g).is_empty());
    }

    #[test]
    fn singleton_groups_are_dropped() {
        let mut g = DirectedGraph::new();
        g.add_vertex(vertex(0, 7, true, false));
        g.add_vertex(vertex(1, 8, true, false));
        assert!(discover_sibling_groups(&g).is_empty());
    }
}
