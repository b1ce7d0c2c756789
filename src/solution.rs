//! Solution evaluation (C4): sibling fixup, cycle repair, and the scoring
//! discipline that arbitrates between two candidate register placements.

use std::collections::HashSet;

use crate::algorithms::{discover_sibling_groups, max_cyclic_throughput_cost, max_forward_latency, topological_sort};
use crate::error::SolveError;
use crate::graph::{DirectedGraph, NodeType, VertexIndex};
use crate::period::estimate_period;

/// The three-tier cost used to rank solutions, compared lexicographically
/// in declaration order (throughput, then latency, then registers). Lower
/// is better on every tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct ScoreCard {
    pub throughput: u64,
    pub latency: u64,
    pub registers: u64,
}

/// A finished, scored register placement.
#[derive(Debug, Clone)]
pub struct Solution {
    pub name: String,
    pub registered: HashSet<VertexIndex>,
    pub score: ScoreCard,
    /// `true` if cycle repair could not eliminate every combinational cycle.
    pub found_combo_cycle: bool,
    /// `target_period_ps - estimated_period`; negative is a timing violation.
    pub slack: i64,
}

/// `true` iff `a` should be preferred over `b`.
///
/// A cycle-free solution always beats one that still carries a
/// combinational cycle, regardless of score. Otherwise the comparison falls
/// through to the lexicographic [`ScoreCard`] ordering. Slack sign plays no
/// part in the comparison; see the design notes for why that knob stays
/// off.
pub fn is_better(a: &Solution, b: &Solution) -> bool {
    match (a.found_combo_cycle, b.found_combo_cycle) {
        (false, true) => true,
        (true, false) => false,
        _ => a.score < b.score,
    }
}

/// Runs sibling fixup, cycle repair, and scoring over `initial_registered`,
/// producing a frozen [`Solution`]. This is the single place those three
/// steps are wired together; an assigner only needs to produce a candidate
/// registered set and hand it here.
pub fn evaluate(
    name: impl Into<String>,
    graph: &DirectedGraph,
    initial_registered: HashSet<VertexIndex>,
    target_period_ps: u64,
) -> Result<Solution, SolveError> {
    let mut registered = initial_registered;

    sibling_fixup(graph, &mut registered);

    let (_, has_cycle) = estimate_period(graph, &registered);
    if has_cycle {
        repair_cycles(graph, &mut registered);
    }
    let (period, found_combo_cycle) = estimate_period(graph, &registered);

    let sort = topological_sort(graph)?;
    let throughput = max_cyclic_throughput_cost(graph, &sort, &registered);
    let latency = max_forward_latency(graph, &sort, &registered);
    let registers: u64 = registered
        .iter()
        .map(|&v| graph.vertex(v).register_cost_if_registered)
        .sum();

    Ok(Solution {
        name: name.into(),
        registered,
        score: ScoreCard { throughput, latency, registers },
        found_combo_cycle,
        slack: target_period_ps as i64 - period as i64,
    })
}

fn sibling_fixup(graph: &DirectedGraph, registered: &mut HashSet<VertexIndex>) {
    for group in discover_sibling_groups(graph) {
        let any_registered = group.iter().any(|&v| graph.is_effectively_registered(v, registered));
        if !any_registered {
            continue;
        }
        for &v in &group {
            if !graph.vertex(v).is_registered {
                registered.insert(v);
            }
        }
    }
}

fn repair_cycles(graph: &DirectedGraph, registered: &mut HashSet<VertexIndex>) {
    for v in graph.vertex_indices() {
        let vertex = graph.vertex(v);
        if !vertex.is_terminal() || graph.is_effectively_registered(v, registered) {
            continue;
        }
        let is_feedback_input = vertex.node_type == NodeType::FeedbackInputNode;
        let is_output_shift_register = vertex.node_type == NodeType::RightShiftRegister && vertex.is_output_terminal;
        if !is_feedback_input && !is_output_shift_register {
            continue;
        }

        // Which side of the feedback edge `v` sits on determines both the
        // candidate list and which direction closes the cycle: a
        // RightShiftRegister owns the feedback edge as its source (v→next),
        // so the forward path has to run from `next` back to `v`. A
        // FeedbackInputNode instead owns it as its target (next→v), so the
        // forward path has to run from `v` out to `next` — the combinational
        // loop is always "forward path from the feedback edge's target back
        // to its source".
        let candidates: Vec<VertexIndex> = if is_output_shift_register {
            graph.feedback_out_edges(v).map(|(_, e)| e.target).collect()
        } else {
            graph.feedback_in_edges(v).map(|(_, e)| e.source).collect()
        };

        for next in candidates {
            if graph.is_effectively_registered(next, registered) {
                continue;
            }
            let path_exists = if is_output_shift_register {
                purely_forward_unregistered_path_exists(graph, registered, next, v)
            } else {
                purely_forward_unregistered_path_exists(graph, registered, v, next)
            };
            if !path_exists {
                continue;
            }

            if !vertex.disallow_register {
                registered.insert(v);
            } else if is_feedback_input {
                let sources: Vec<VertexIndex> = graph.forward_in_edges(v).map(|(_, e)| e.source).collect();
                for s in sources {
                    let source_vertex = graph.vertex(s);
                    if !source_vertex.disallow_register && !graph.is_effectively_registered(s, registered) {
                        registered.insert(s);
                    }
                }
            }
            break;
        }
    }
}

/// `true` iff a path from `from` to `to` exists using only forward edges
/// where every vertex on the path, `from` included, is not effectively
/// registered. A registered vertex encountered mid-path blocks further
/// expansion through it, since a register there would already have broken
/// the combinational path.
fn purely_forward_unregistered_path_exists(
    graph: &DirectedGraph,
    registered: &HashSet<VertexIndex>,
    from: VertexIndex,
    to: VertexIndex,
) -> bool {
    if from == to {
        return true;
    }
    let mut visited = HashSet::new();
    visited.insert(from);
    let mut stack = vec![from];
    while let Some(u) = stack.pop() {
        for (_, edge) in graph.forward_out_edges(u) {
            let w = edge.target;
            if w == to {
                return true;
            }
            if visited.contains(&w) || graph.is_effectively_registered(w, registered) {
                continue;
            }
            visited.insert(w);
            stack.push(w);
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Vertex;

    fn vertex(vertex_id: i64, node_unique_id: i64, node_type: NodeType) -> Vertex {
        Vertex {
            vertex_id,
            node_unique_id,
            node_type,
            is_input_terminal: false,
            is_output_terminal: false,
            is_registered: false,
            disallow_register: false,
            throughput_cost_if_registered: 1,
            latency_cost_if_registered: 1,
            register_cost_if_registered: 1,
        }
    }

    #[test]
    fn cycle_free_solution_always_wins() {
        let clean = Solution {
            name: "clean".into(),
            registered: HashSet::new(),
            score: ScoreCard { throughput: 5, latency: 5, registers: 5 },
            found_combo_cycle: false,
            slack: -1,
        };
        let broken = Solution {
            name: "broken".into(),
            registered: HashSet::new(),
            score: ScoreCard { throughput: 0, latency: 0, registers: 0 },
            found_combo_cycle: true,
            slack: 100,
        };
        assert!(is_better(&clean, &broken));
        assert!(!is_better(&broken, &clean));
    }

    #[test]
    fn lexicographic_tiebreak_on_registers() {
        let a = Solution {
            name: "a".into(),
            registered: HashSet::new(),
            score: ScoreCard { throughput: 10, latency: 10, registers: 2 },
            found_combo_cycle: false,
            slack: 0,
        };
        let b = Solution {
            name: "b".into(),
            registered: HashSet::new(),
            score: ScoreCard { throughput: 10, latency: 10, registers: 3 },
            found_combo_cycle: false,
            slack: 0,
        };
        assert!(is_better(&a, &b));
    }

    #[test]
    fn sibling_fixup_pulls_in_unregistered_peer() {
        let mut g = DirectedGraph::new();
        let mut v1 = vertex(1, 7, NodeType::BorderNode);
        v1.is_input_terminal = true;
        let mut v2 = vertex(2, 7, NodeType::BorderNode);
        v2.is_input_terminal = true;
        g.add_vertex(v1);
        g.add_vertex(v2);

        let mut registered: HashSet<VertexIndex> = [0].into_iter().collect();
        sibling_fixup(&g, &mut registered);
        assert!(registered.contains(&1));
    }

    #[test]
    fn simple_feedback_cycle_is_repaired() {
        // v0 -> v1 forward, v1 -> v0 feedback: v0 is the FeedbackInputNode,
        // so it owns the feedback edge as its *target*, not its source.
        let mut g = DirectedGraph::new();
        let mut v0 = vertex(0, -1, NodeType::FeedbackInputNode);
        v0.is_input_terminal = true;
        let v1 = vertex(1, -1, NodeType::Other);
        g.add_vertex(v0);
        g.add_vertex(v1);
        g.add_edge(0, 1, 50, false);
        g.add_edge(1, 0, 50, true);

        let solution = evaluate("s3", &g, HashSet::new(), 200).unwrap();
        assert!(!solution.found_combo_cycle);
        assert!(solution.registered.contains(&0));
    }

    #[test]
    fn right_shift_register_output_terminal_owns_the_feedback_out_edge() {
        // v0 -> v1 feedback, v1 -> v0 forward: v0 is a RightShiftRegister on
        // the output side, so it owns the feedback edge as its *source*.
        let mut g = DirectedGraph::new();
        let mut v0 = vertex(0, -1, NodeType::RightShiftRegister);
        v0.is_output_terminal = true;
        let v1 = vertex(1, -1, NodeType::Other);
        g.add_vertex(v0);
        g.add_vertex(v1);
        g.add_edge(0, 1, 50, true);
        g.add_edge(1, 0, 50, false);

        let solution = evaluate("shift-register", &g, HashSet::new(), 200).unwrap();
        assert!(!solution.found_combo_cycle);
        assert!(solution.registered.contains(&0));
    }
}
