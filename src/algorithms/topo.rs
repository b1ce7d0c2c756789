//! Iterative topological sort over forward edges only (C2.1).
//!
//! Converted from the natural recursive DFS formulation to an explicit work
//! stack so graphs with tens of thousands of vertices never risk a stack
//! overflow (§5 of the spec).

use crate::error::SolveError;
use crate::graph::{DirectedGraph, VertexIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    /// Not yet started.
    Queued,
    /// On the current DFS path (in the explicit stack).
    Visiting,
    /// Fully processed; safe to revisit without re-expanding.
    Visited,
}

/// Computes a topological order over `graph`'s forward edges.
///
/// Vertices with no forward in-edges are used as DFS roots first, in
/// insertion order, so ties between independent subtrees are broken by
/// insertion order. Returns [`SolveError::BadTopologicalSeed`] if a forward
/// back-edge is encountered, which only happens when feedback edges were
/// not marked correctly upstream.
pub fn topological_sort(graph: &DirectedGraph) -> Result<Vec<VertexIndex>, SolveError> {
    let n = graph.vertex_count();
    let mut mark = vec![Mark::Queued; n];
    let mut postorder = Vec::with_capacity(n);

    let mut roots: Vec<VertexIndex> = graph
        .vertex_indices()
        .filter(|&v| graph.forward_in_edges(v).next().is_none())
        .collect();
    // Defensive fallback: cover any vertex a malformed root set would miss.
    roots.extend(graph.vertex_indices().filter(|&v| !roots.contains(&v)));

    // (vertex, index of the next forward out-edge to expand)
    let mut stack: Vec<(VertexIndex, usize)> = Vec::new();

    for root in roots {
        if mark[root] != Mark::Queued {
            continue;
        }
        mark[root] = Mark::Visiting;
        stack.push((root, 0));

        while let Some(&(v, cursor)) = stack.last() {
            let out: Vec<VertexIndex> = graph.forward_out_edges(v).map(|(_, e)| e.target).collect();
            if cursor < out.len() {
                stack.last_mut().unwrap().1 += 1;
                let w = out[cursor];
                match mark[w] {
                    Mark::Visiting => return Err(SolveError::BadTopologicalSeed),
                    Mark::Queued => {
                        mark[w] = Mark::Visiting;
                        stack.push((w, 0));
                    }
                    Mark::Visited => {}
                }
            } else {
                stack.pop();
                mark[v] = Mark::Visited;
                postorder.push(v);
            }
        }
    }

    postorder.reverse();
    Ok(postorder)
}
