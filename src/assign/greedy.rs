//! Greedy latency assignment (C6): start maximally registered, then
//! iteratively fold registers back out wherever the resulting merged
//! combinational segment still fits the target period.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::graph::{DirectedGraph, VertexIndex};
use crate::period::estimate_period;

/// Runs the greedy de-registration loop over `graph` and returns the
/// surviving registered set.
///
/// Every vertex starts registered. Candidates — vertices not statically
/// `is_registered` — are repeatedly sorted by descending
/// (throughput, latency, register) cost and offered de-registration; a
/// de-registration merges the vertex's neighborhood bookkeeping so later
/// candidates see the post-merge combinational distances. The loop stops
/// the first pass that de-registers nothing.
pub fn assign(graph: &DirectedGraph, target_period_ps: u64) -> HashSet<VertexIndex> {
    let n = graph.vertex_count();
    let mut registered: HashSet<VertexIndex> = graph.vertex_indices().collect();

    let mut input_delay = vec![0u64; n];
    let mut output_delay = vec![0u64; n];
    let mut fanin_regs: Vec<HashSet<VertexIndex>> = vec![HashSet::new(); n];
    let mut fanout_regs: Vec<HashSet<VertexIndex>> = vec![HashSet::new(); n];
    let mut reg_reg_delay: HashMap<(VertexIndex, VertexIndex), u64> = HashMap::new();

    for v in graph.vertex_indices() {
        input_delay[v] = graph.in_edges(v).map(|(_, e)| e.delay).max().unwrap_or(0);
        output_delay[v] = graph.out_edges(v).map(|(_, e)| e.delay).max().unwrap_or(0);
        for (_, edge) in graph.in_edges(v) {
            fanin_regs[v].insert(edge.source);
        }
        for (_, edge) in graph.out_edges(v) {
            fanout_regs[v].insert(edge.target);
            reg_reg_delay
                .entry((v, edge.target))
                .and_modify(|d| *d = (*d).max(edge.delay))
                .or_insert(edge.delay);
        }
    }

    loop {
        let mut candidates: Vec<VertexIndex> = registered
            .iter()
            .copied()
            .filter(|&v| !graph.vertex(v).is_registered)
            .collect();
        candidates.sort_by(|&a, &b| {
            let va = graph.vertex(a);
            let vb = graph.vertex(b);
            vb.throughput_cost_if_registered
                .cmp(&va.throughput_cost_if_registered)
                .then(vb.latency_cost_if_registered.cmp(&va.latency_cost_if_registered))
                .then(vb.register_cost_if_registered.cmp(&va.register_cost_if_registered))
                .then(a.cmp(&b))
        });

        let mut changed = false;
        for v in candidates {
            if !registered.contains(&v) {
                // spliced away by an earlier merge this same pass
                continue;
            }
            if try_de_register(
                graph,
                v,
                target_period_ps,
                &mut registered,
                &mut input_delay,
                &mut output_delay,
                &mut fanin_regs,
                &mut fanout_regs,
                &mut reg_reg_delay,
            ) {
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let (period, cycle) = estimate_period(graph, &registered);
    if cycle {
        warn!("greedy assignment left a residual combinational cycle");
    }
    if period > target_period_ps {
        warn!(period, target_period_ps, "greedy assignment exceeds the target period");
    }

    registered
}

#[allow(clippy::too_many_arguments)]
fn try_de_register(
    graph: &DirectedGraph,
    v: VertexIndex,
    target_period_ps: u64,
    registered: &mut HashSet<VertexIndex>,
    input_delay: &mut [u64],
    output_delay: &mut [u64],
    fanin_regs: &mut [HashSet<VertexIndex>],
    fanout_regs: &mut [HashSet<VertexIndex>],
    reg_reg_delay: &mut HashMap<(VertexIndex, VertexIndex), u64>,
) -> bool {
    if graph.vertex(v).is_registered {
        return false;
    }
    if input_delay[v] + output_delay[v] > target_period_ps {
        return false;
    }
    if fanin_regs[v].contains(&v) || fanout_regs[v].contains(&v) {
        return false;
    }

    let fan_in: Vec<VertexIndex> = fanin_regs[v].iter().copied().collect();
    let fan_out: Vec<VertexIndex> = fanout_regs[v].iter().copied().collect();

    for &fi in &fan_in {
        let d_fi_v = *reg_reg_delay
            .get(&(fi, v))
            .expect("reg_reg_delay missing a live fanin edge during greedy merge");
        for &fo in &fan_out {
            let d_v_fo = *reg_reg_delay
                .get(&(v, fo))
                .expect("reg_reg_delay missing a live fanout edge during greedy merge");
            let candidate = d_fi_v + d_v_fo;
            reg_reg_delay
                .entry((fi, fo))
                .and_modify(|d| *d = (*d).max(candidate))
                .or_insert(candidate);
        }
    }

    for &fi in &fan_in {
        let d_fi_v = *reg_reg_delay
            .get(&(fi, v))
            .expect("reg_reg_delay missing a live fanin edge during greedy merge");
        output_delay[fi] = output_delay[fi].max(d_fi_v + output_delay[v]);
    }
    for &fo in &fan_out {
        let d_v_fo = *reg_reg_delay
            .get(&(v, fo))
            .expect("reg_reg_delay missing a live fanout edge during greedy merge");
        input_delay[fo] = input_delay[fo].max(input_delay[v] + d_v_fo);
    }

    for &fi in &fan_in {
        fanout_regs[fi].remove(&v);
        for &fo in &fan_out {
            fanout_regs[fi].insert(fo);
        }
    }
    for &fo in &fan_out {
        fanin_regs[fo].remove(&v);
        for &fi in &fan_in {
            fanin_regs[fo].insert(fi);
        }
    }

    fanin_regs[v].clear();
    fanout_regs[v].clear();
    registered.remove(&v);
    true
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
    fn short_chain_with_slack_de_registers_fully() {
        let mut g = DirectedGraph::new();
        g.add_vertex(vertex(0));
        g.add_vertex(vertex(1));
        g.add_vertex(vertex(2));
        g.add_edge(0, 1, 30, false);
        g.add_edge(1, 2, 30, false);
        let registered = assign(&g, 200);
        assert!(registered.is_empty());
    }

    #[test]
    fn vertex_kept_when_total_delay_exceeds_target() {
        let mut g = DirectedGraph::new();
        g.add_vertex(vertex(0));
        g.add_vertex(vertex(1));
        g.add_vertex(vertex(2));
        g.add_edge(0, 1, 150, false);
        g.add_edge(1, 2, 150, false);
        let registered = assign(&g, 200);
        assert!(registered.contains(&1));
    }

    #[test]
    fn registered_set_shrinks_monotonically_relative_to_start() {
        let mut g = DirectedGraph::new();
        for id in 0..5 {
            g.add_vertex(vertex(id));
        }
        for id in 0..4 {
            g.add_edge(id, id + 1, 10, false);
        }
        let registered = assign(&g, 200);
        assert!(registered.len() < 5);
    }
}
