//! Maximum forward latency (C2.4): a wavefront over the topological order
//! that tracks a single accumulated register count per vertex rather than a
//! per-origin map, since forward latency has no cycle to close.

use std::collections::HashSet;

use crate::graph::{DirectedGraph, VertexIndex};

/// Computes the maximum number of registers (weighted by
/// `latency_cost_if_registered`) crossed along any forward path from a
/// source to a sink of `graph`.
pub fn max_forward_latency(
    graph: &DirectedGraph,
    sort: &[VertexIndex],
    registered: &HashSet<VertexIndex>,
) -> u64 {
    let mut cost = vec![0u64; graph.vertex_count()];
    let mut max_latency = 0u64;

    for &v in sort {
        let incoming_max = graph
            .forward_in_edges(v)
            .map(|(_, edge)| cost[edge.source])
            .max()
            .unwrap_or(0);

        let registered_cost = if graph.is_effectively_registered(v, registered) {
            graph.vertex(v).latency_cost_if_registered
        } else {
            0
        };
        cost[v] = incoming_max + registered_cost;

        if graph.forward_out_edges(v).next().is_none() {
            max_latency = max_latency.max(cost[v]);
        }
    }

    max_latency
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::topo::topological_sort;
    use crate::graph::{NodeType, Vertex};

    fn vertex(vertex_id: i64, latency_cost: u64) -> Vertex {
        Vertex {
            vertex_id,
            node_unique_id: -1,
            node_type: NodeType::Other,
            is_input_terminal: false,
            is_output_terminal: false,
            is_registered: false,
            disallow_register: false,
            throughput_cost_if_registered: 0,
            latency_cost_if_registered: latency_cost,
            register_cost_if_registered: 0,
        }
    }

    #[test]
    fn chain_with_one_register_counts_it_once() {
        let mut g = DirectedGraph::new();
        g.add_vertex(vertex(0, 1));
        g.add_vertex(vertex(1, 1));
        g.add_vertex(vertex(2, 1));
        g.add_edge(0, 1, 10, false);
        g.add_edge(1, 2, 10, false);
        let sort = topological_sort(&g).unwrap();
        let registered: HashSet<VertexIndex> = [1].into_iter().collect();
        assert_eq!(max_forward_latency(&g, &sort, &registered), 1);
    }

    #[test]
    fn diverging_paths_take_the_max_branch() {
        let mut g = DirectedGraph::new();
        g.add_vertex(vertex(0, 1)); // source
        g.add_vertex(vertex(1, 1)); // short branch, 1 register
        g.add_vertex(vertex(2, 1)); // long branch, 2 registers
        g.add_vertex(vertex(3, 1));
        g.add_vertex(vertex(4, 1)); // join
        g.add_edge(0, 1, 10, false);
        g.add_edge(0, 2, 10, false);
        g.add_edge(2, 3, 10, false);
        g.add_edge(1, 4, 10, false);
        g.add_edge(3, 4, 10, false);
        let sort = topological_sort(&g).unwrap();
        let registered: HashSet<VertexIndex> = [1, 2, 3].into_iter().collect();
        assert_eq!(max_forward_latency(&g, &sort, &registered), 2);
    }
}
