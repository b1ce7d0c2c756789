//! Longest combinational path estimation (C3): the span between two
//! register boundaries, where a boundary is an effectively-registered
//! vertex or a vertex with no in-edges (a graph input).
//!
//! Combinational delay propagates over *every* edge, forward or feedback —
//! a feedback edge that never crosses a register is a real timing cycle,
//! not just a topological-sort nuisance. Results are memoized per vertex so
//! a vertex reachable from several boundaries is only walked once.

use std::collections::HashSet;

use crate::graph::{DirectedGraph, VertexIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Queued,
    Visiting,
    Visited,
}

/// Computes `(max_period_ps, cycle_flag)` for `graph` under `registered`.
///
/// `cycle_flag` is set if any combinational path revisits a vertex still
/// under active exploration; that path contributes only its closing edge's
/// own delay, never an unbounded sum, so a pure-cyclic subgraph still
/// terminates with a finite (if meaningless) period.
///
/// Every vertex is walked from, not only register boundaries: the
/// recurrence for a non-boundary vertex's longest onward delay does not
/// depend on which boundary started the walk, so starting from every
/// unvisited vertex folds the spec's "first pass from boundaries, second
/// pass over the rest" into one memoized sweep.
pub fn estimate_period(graph: &DirectedGraph, registered: &HashSet<VertexIndex>) -> (u64, bool) {
    let n = graph.vertex_count();
    let mut mark = vec![Mark::Queued; n];
    let mut computed_delays = vec![0u64; n];
    let mut cycle_flag = false;

    for start in graph.vertex_indices() {
        if mark[start] != Mark::Queued {
            continue;
        }
        mark[start] = Mark::Visiting;
        let mut stack: Vec<(VertexIndex, usize)> = vec![(start, 0)];

        while let Some(&(v, cursor)) = stack.last() {
            let out: Vec<(VertexIndex, u64)> = graph.out_edges(v).map(|(_, e)| (e.target, e.delay)).collect();
            if cursor >= out.len() {
                stack.pop();
                mark[v] = Mark::Visited;
                continue;
            }
            let (w, delay) = out[cursor];
            if graph.is_effectively_registered(w, registered) {
                computed_delays[v] = computed_delays[v].max(delay);
                stack.last_mut().unwrap().1 += 1;
                continue;
            }
            match mark[w] {
                Mark::Visited => {
                    computed_delays[v] = computed_delays[v].max(delay + computed_delays[w]);
                    stack.last_mut().unwrap().1 += 1;
                }
                Mark::Visiting => {
                    cycle_flag = true;
                    computed_delays[v] = computed_delays[v].max(delay);
                    stack.last_mut().unwrap().1 += 1;
                }
                Mark::Queued => {
                    mark[w] = Mark::Visiting;
                    stack.push((w, 0));
                }
            }
        }
    }

    let mut max_period = 0u64;
    for v in graph.vertex_indices() {
        let is_boundary = graph.is_effectively_registered(v, registered) || graph.in_edges(v).next().is_none();
        if is_boundary {
            max_period = max_period.max(computed_delays[v]);
        }
    }

    (max_period, cycle_flag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeType, Vertex};

    fn vertex(vertex_id: i64) -> Vertex {
        Vertex {
            vertex_id,
            node_unique_id: -1,
            node_type: NodeType::Other,
            is_input_terminal: false,
            is_output_terminal: false,
            is_registered: false,
            disallow_register: false,
            throughput_cost_if_registered: 0,
            latency_cost_if_registered: 0,
            register_cost_if_registered: 0,
        }
    }

    #[test]
    fn single_edge_period_is_its_delay() {
        let mut g = DirectedGraph::new();
        g.add_vertex(vertex(0));
        g.add_vertex(vertex(1));
        g.add_edge(0, 1, 100, false);
        let (period, cycle) = estimate_period(&g, &HashSet::new());
        assert_eq!(period, 100);
        assert!(!cycle);
    }

    #[test]
    fn register_splits_the_path() {
        let mut g = DirectedGraph::new();
        g.add_vertex(vertex(0));
        g.add_vertex(vertex(1));
        g.add_vertex(vertex(2));
        g.add_edge(0, 1, 60, false);
        g.add_edge(1, 2, 70, false);
        let registered: HashSet<VertexIndex> = [1].into_iter().collect();
        let (period, cycle) = estimate_period(&g, &registered);
        assert_eq!(period, 70);
        assert!(!cycle);
    }

    #[test]
    fn unbroken_feedback_loop_is_flagged() {
        let mut g = DirectedGraph::new();
        g.add_vertex(vertex(0));
        g.add_vertex(vertex(1));
        g.add_edge(0, 1, 50, false);
        g.add_edge(1, 0, 50, true);
        let (_, cycle) = estimate_period(&g, &HashSet::new());
        assert!(cycle);
    }

    #[test]
    fn registered_vertex_breaks_the_cycle() {
        let mut g = DirectedGraph::new();
        g.add_vertex(vertex(0));
        g.add_vertex(vertex(1));
        g.add_edge(0, 1, 50, false);
        g.add_edge(1, 0, 50, true);
        let registered: HashSet<VertexIndex> = [0].into_iter().collect();
        let (_, cycle) = estimate_period(&g, &registered);
        assert!(!cycle);
    }
}
