//! Iterative Tarjan strongly-connected-components over *all* edges, forward
//! and feedback alike (C2.2).
//!
//! The textbook formulation recurses once per DFS edge; here the recursion
//! is flattened into an explicit frame stack carrying the child cursor, the
//! same technique used by [`super::topo`].

use crate::graph::{DirectedGraph, VertexIndex};

/// Returns every strongly connected component of `graph`, each as a vertex
/// list in the order Tarjan's algorithm popped it off its component stack.
/// Singleton components (a vertex with no cycle through itself) are
/// included.
pub fn strongly_connected_components(graph: &DirectedGraph) -> Vec<Vec<VertexIndex>> {
    let n = graph.vertex_count();
    let mut index: Vec<Option<usize>> = vec![None; n];
    let mut lowlink: Vec<usize> = vec![0; n];
    let mut on_stack: Vec<bool> = vec![false; n];
    let mut component_stack: Vec<VertexIndex> = Vec::new();
    let mut next_index = 0usize;
    let mut result = Vec::new();

    // (vertex, next out-edge cursor)
    let mut frames: Vec<(VertexIndex, usize)> = Vec::new();

    for start in graph.vertex_indices() {
        if index[start].is_some() {
            continue;
        }
        index[start] = Some(next_index);
        lowlink[start] = next_index;
        next_index += 1;
        component_stack.push(start);
        on_stack[start] = true;
        frames.push((start, 0));

        while let Some(&(v, cursor)) = frames.last() {
            let out: Vec<VertexIndex> = graph.out_edges(v).map(|(_, e)| e.target).collect();
            if cursor < out.len() {
                frames.last_mut().unwrap().1 += 1;
                let w = out[cursor];
                if index[w].is_none() {
                    index[w] = Some(next_index);
                    lowlink[w] = next_index;
                    next_index += 1;
                    component_stack.push(w);
                    on_stack[w] = true;
                    frames.push((w, 0));
                } else if on_stack[w] {
                    lowlink[v] = lowlink[v].min(index[w].unwrap());
                }
            } else {
                frames.pop();
                if let Some(&(parent, _)) = frames.last() {
                    lowlink[parent] = lowlink[parent].min(lowlink[v]);
                }
                if lowlink[v] == index[v].unwrap() {
                    let mut component = Vec::new();
                    loop {
                        let w = component_stack.pop().unwrap();
                        on_stack[w] = false;
                        component.push(w);
                        if w == v {
                            break;
                        }
                    }
                    result.push(component);
                }
            }
        }
    }

    result
}
