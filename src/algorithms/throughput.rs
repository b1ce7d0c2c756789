//! Maximum cyclic throughput cost (C2.3): a single wavefront pass over a
//! topological order that bounds memory to O(frontier width × vertex count)
//! instead of materializing all cycle paths.
//!
//! For every vertex on the wavefront we keep a small map from "cycle origin
//! vertex" to "accumulated throughput cost since that origin". Once every
//! consumer of a predecessor's map has read it, the predecessor's entry is
//! dropped, which is what keeps the table bounded by the live frontier
//! rather than the whole graph.

use std::collections::{HashMap, HashSet};

use crate::graph::{DirectedGraph, VertexIndex};

struct WavefrontEntry {
    data: HashMap<VertexIndex, u64>,
    /// Remaining forward out-edges that still need to read this entry.
    ref_count: usize,
}

/// Computes the maximum throughput cost along any cycle in `graph`, given
/// `sort` (a topological order over forward edges) and the set of
/// currently-registered vertices.
pub fn max_cyclic_throughput_cost(
    graph: &DirectedGraph,
    sort: &[VertexIndex],
    registered: &HashSet<VertexIndex>,
) -> u64 {
    let mut table: HashMap<VertexIndex, WavefrontEntry> = HashMap::new();
    let mut max_cycle_cost = 0u64;

    for &v in sort {
        let mut my_data: HashMap<VertexIndex, u64> = HashMap::new();
        for (_, edge) in graph.forward_in_edges(v) {
            if let Some(entry) = table.get(&edge.source) {
                for (&origin, &cost) in &entry.data {
                    my_data
                        .entry(origin)
                        .and_modify(|existing| *existing = (*existing).max(cost))
                        .or_insert(cost);
                }
            }
        }

        let mut exhausted = Vec::new();
        for (_, edge) in graph.forward_in_edges(v) {
            if let Some(entry) = table.get_mut(&edge.source) {
                entry.ref_count -= 1;
                if entry.ref_count == 0 {
                    exhausted.push(edge.source);
                }
            }
        }
        for source in exhausted {
            table.remove(&source);
        }

        let registered_cost = if graph.is_effectively_registered(v, registered) {
            graph.vertex(v).throughput_cost_if_registered
        } else {
            0
        };
        if registered_cost > 0 {
            for cost in my_data.values_mut() {
                *cost += registered_cost;
            }
        }

        if graph.feedback_in_edges(v).next().is_some() {
            my_data.insert(v, registered_cost);
        }

        for (_, edge) in graph.feedback_out_edges(v) {
            if let Some(&cost) = my_data.get(&edge.target) {
                max_cycle_cost = max_cycle_cost.max(cost);
            }
        }

        let ref_count = graph.forward_out_edges(v).count();
        if ref_count > 0 {
            table.insert(v, WavefrontEntry { data: my_data, ref_count });
        }
    }

    max_cycle_cost
}
