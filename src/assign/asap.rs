//! ASAP latency assignment (C5): a forward sweep run twice, registering a
//! vertex as soon as its combinational neighborhood would otherwise exceed
//! the target period or a downstream cost dominates its own.

use std::collections::HashSet;

use crate::graph::{DirectedGraph, VertexIndex};

/// Runs the ASAP forward sweep over `graph` and returns the vertices it
/// chooses to register.
///
/// The sweep runs twice over vertices in insertion order: the first pass can
/// leave a vertex's delay contribution understated when its predecessor is
/// reached through a feedback edge that has not been visited yet in this
/// pass, so a second pass re-evaluates every decision against the first
/// pass's settled `delay_map`.
pub fn assign(graph: &DirectedGraph, target_period_ps: u64) -> HashSet<VertexIndex> {
    let n = graph.vertex_count();
    let mut delay_map = vec![0u64; n];
    let mut registered: HashSet<VertexIndex> =
        graph.vertex_indices().filter(|&v| graph.vertex(v).is_registered).collect();

    for _pass in 0..2 {
        for v in graph.vertex_indices() {
            if graph.vertex(v).is_registered {
                continue;
            }

            let max_delay_in = graph
                .in_edges(v)
                .map(|(_, e)| e.delay + delay_map[e.source])
                .max()
                .unwrap_or(0);
            let max_delay_out = graph.out_edges(v).map(|(_, e)| e.delay).max().unwrap_or(0);

            let mut max_throughput_out = 0u64;
            let mut max_latency_out = 0u64;
            let mut max_register_out = 0u64;
            for (_, edge) in graph.out_edges(v) {
                let target = graph.vertex(edge.target);
                max_throughput_out = max_throughput_out.max(target.throughput_cost_if_registered);
                max_latency_out = max_latency_out.max(target.latency_cost_if_registered);
                max_register_out = max_register_out.max(target.register_cost_if_registered);
            }

            let vertex = graph.vertex(v);
            let pressure = max_delay_in + max_delay_out > target_period_ps;
            let downstream_outranks = max_delay_in > 0
                && (max_throughput_out > vertex.throughput_cost_if_registered
                    || (max_throughput_out == vertex.throughput_cost_if_registered
                        && max_latency_out > vertex.latency_cost_if_registered)
                    || (max_throughput_out == vertex.throughput_cost_if_registered
                        && max_latency_out == vertex.latency_cost_if_registered
                        && max_register_out > vertex.register_cost_if_registered));

            if pressure || downstream_outranks {
                delay_map[v] = 0;
                registered.insert(v);
            } else {
                delay_map[v] = max_delay_in;
                registered.remove(&v);
            }
        }
    }

    registered
}
