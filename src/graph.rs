//! The directed delay graph (C1): a stable-ordered vertex/edge container with
//! forward and feedback-edge queries.
//!
//! Vertices and edges are always enumerable in the order they were inserted;
//! several downstream algorithms (topological tie-breaking, wavefront
//! merges) depend on this and must not be "optimized" into hash-order
//! iteration.

use std::collections::HashMap;
use std::fmt;

/// A dense, 0-based handle into [`DirectedGraph`]'s vertex storage.
///
/// Equal to insertion order: the first vertex added has index 0, etc.
pub type VertexIndex = usize;

/// A dense, 0-based handle into [`DirectedGraph`]'s edge storage.
pub type EdgeIndex = usize;

/// Semantic tag for a vertex's origin, matching the GraphML `NodeType` enum
/// ordinals (0=FeedbackInputNode … 5=Unknown).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    FeedbackInputNode,
    BorderNode,
    LeftShiftRegister,
    RightShiftRegister,
    Other,
    Unknown,
}

impl NodeType {
    pub fn from_ordinal(ordinal: i64) -> Option<Self> {
        match ordinal {
            0 => Some(Self::FeedbackInputNode),
            1 => Some(Self::BorderNode),
            2 => Some(Self::LeftShiftRegister),
            3 => Some(Self::RightShiftRegister),
            4 => Some(Self::Other),
            5 => Some(Self::Unknown),
            _ => None,
        }
    }
}

/// A vertex in the delay graph.
///
/// `vertex_id` is the stable external identity (the GraphML `VertexId`);
/// `node_unique_id` groups vertices that originated from the same synthesis
/// node (used for sibling fixup, §4.4 of the spec).
#[derive(Debug, Clone)]
pub struct Vertex {
    pub vertex_id: i64,
    pub node_unique_id: i64,
    pub node_type: NodeType,
    pub is_input_terminal: bool,
    pub is_output_terminal: bool,
    pub is_registered: bool,
    pub disallow_register: bool,
    pub throughput_cost_if_registered: u64,
    pub latency_cost_if_registered: u64,
    pub register_cost_if_registered: u64,
}

impl Vertex {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.is_input_terminal || self.is_output_terminal
    }
}

/// A directed edge carrying a combinational delay in picoseconds.
///
/// `is_feedback` marks a back-edge that closes a cycle in an otherwise
/// forward DAG; feedback edges are excluded from topological sorts and
/// forward-path queries but participate in cyclic-throughput analysis and
/// cycle detection.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub source: VertexIndex,
    pub target: VertexIndex,
    pub delay: u64,
    pub is_feedback: bool,
}

/// The directed delay graph.
///
/// Vertices and edges are stored append-only except for [`DirectedGraph::remove_edge`]
/// and [`DirectedGraph::prune_parallel_edges`]; every enumeration preserves
/// insertion order.
#[derive(Debug, Clone, Default)]
pub struct DirectedGraph {
    vertices: Vec<Vertex>,
    id_index: HashMap<i64, VertexIndex>,
    edges: Vec<Option<Edge>>,
    out_edges: Vec<Vec<EdgeIndex>>,
    in_edges: Vec<Vec<EdgeIndex>>,
}

impl fmt::Display for DirectedGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DirectedGraph(vertices={}, edges={})",
            self.vertex_count(),
            self.edge_count()
        )
    }
}

impl DirectedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges still present (tombstoned removals are not counted).
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.iter().filter(|e| e.is_some()).count()
    }

    /// Every live edge, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeIndex, &Edge)> {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|e| (i, e)))
    }

    #[inline]
    pub fn vertex(&self, v: VertexIndex) -> &Vertex {
        &self.vertices[v]
    }

    #[inline]
    pub fn vertex_mut(&mut self, v: VertexIndex) -> &mut Vertex {
        &mut self.vertices[v]
    }

    #[inline]
    pub fn vertex_index_by_id(&self, vertex_id: i64) -> Option<VertexIndex> {
        self.id_index.get(&vertex_id).copied()
    }

    /// Vertices in stable insertion order.
    pub fn vertex_indices(&self) -> impl Iterator<Item = VertexIndex> {
        0..self.vertices.len()
    }

    #[inline]
    pub fn edge(&self, e: EdgeIndex) -> &Edge {
        self.edges[e]
            .as_ref()
            .expect("edge index must refer to a live edge")
    }

    /// Appends `vertex` if its `vertex_id` is new. First insertion wins: a
    /// repeated `vertex_id` leaves the graph untouched.
    ///
    /// Returns `true` if the vertex was appended.
    pub fn add_vertex(&mut self, vertex: Vertex) -> bool {
        if self.id_index.contains_key(&vertex.vertex_id) {
            return false;
        }
        let idx = self.vertices.len();
        self.id_index.insert(vertex.vertex_id, idx);
        self.vertices.push(vertex);
        self.out_edges.push(Vec::new());
        self.in_edges.push(Vec::new());
        true
    }

    /// Appends a directed edge `source -> target`. Fails (no mutation) if
    /// either endpoint is unknown.
    pub fn add_edge(&mut self, source: VertexIndex, target: VertexIndex, delay: u64, is_feedback: bool) -> Option<EdgeIndex> {
        if source >= self.vertices.len() || target >= self.vertices.len() {
            return None;
        }
        let edge_index = self.edges.len();
        self.edges.push(Some(Edge {
            source,
            target,
            delay,
            is_feedback,
        }));
        self.out_edges[source].push(edge_index);
        self.in_edges[target].push(edge_index);
        Some(edge_index)
    }

    /// Detaches `edge_index` from both adjacency lists and tombstones it in
    /// the edge list. No-op if the index is already removed or unknown.
    pub fn remove_edge(&mut self, edge_index: EdgeIndex) {
        let Some(edge) = self.edges.get(edge_index).copied().flatten() else {
            return;
        };
        self.edges[edge_index] = None;
        self.out_edges[edge.source].retain(|&e| e != edge_index);
        self.in_edges[edge.target].retain(|&e| e != edge_index);
    }

    fn adjacency_edges<'a>(&'a self, indices: &'a [EdgeIndex]) -> impl Iterator<Item = (EdgeIndex, &'a Edge)> + 'a {
        indices.iter().map(move |&ei| (ei, self.edge(ei)))
    }

    /// All in-edges of `v`, in insertion order. Empty if `v` is unknown.
    pub fn in_edges(&self, v: VertexIndex) -> impl Iterator<Item = (EdgeIndex, &Edge)> {
        self.in_edges
            .get(v)
            .map(|ids| self.adjacency_edges(ids))
            .into_iter()
            .flatten()
    }

    /// All out-edges of `v`, in insertion order. Empty if `v` is unknown.
    pub fn out_edges(&self, v: VertexIndex) -> impl Iterator<Item = (EdgeIndex, &Edge)> {
        self.out_edges
            .get(v)
            .map(|ids| self.adjacency_edges(ids))
            .into_iter()
            .flatten()
    }

    pub fn forward_in_edges(&self, v: VertexIndex) -> impl Iterator<Item = (EdgeIndex, &Edge)> {
        self.in_edges(v).filter(|(_, e)| !e.is_feedback)
    }

    pub fn forward_out_edges(&self, v: VertexIndex) -> impl Iterator<Item = (EdgeIndex, &Edge)> {
        self.out_edges(v).filter(|(_, e)| !e.is_feedback)
    }

    pub fn feedback_in_edges(&self, v: VertexIndex) -> impl Iterator<Item = (EdgeIndex, &Edge)> {
        self.in_edges(v).filter(|(_, e)| e.is_feedback)
    }

    pub fn feedback_out_edges(&self, v: VertexIndex) -> impl Iterator<Item = (EdgeIndex, &Edge)> {
        self.out_edges(v).filter(|(_, e)| e.is_feedback)
    }

    /// For every vertex, bucket its out-edges by target and keep only the
    /// edge with the largest delay in each bucket. Idempotent.
    ///
    /// Returns whether any edge was removed.
    pub fn prune_parallel_edges(&mut self) -> bool {
        let mut changed = false;
        for v in self.vertex_indices() {
            let mut best_by_target: HashMap<VertexIndex, (EdgeIndex, u64)> = HashMap::new();
            let mut losers = Vec::new();
            for &edge_index in &self.out_edges[v] {
                let edge = self.edge(edge_index);
                match best_by_target.get(&edge.target) {
                    Some(&(best_edge, best_delay)) => {
                        if edge.delay > best_delay {
                            losers.push(best_edge);
                            best_by_target.insert(edge.target, (edge_index, edge.delay));
                        } else {
                            losers.push(edge_index);
                        }
                    }
                    None => {
                        best_by_target.insert(edge.target, (edge_index, edge.delay));
                    }
                }
            }
            for loser in losers {
                self.remove_edge(loser);
                changed = true;
            }
        }
        changed
    }

    /// `true` iff `v` is effectively registered under `registered`: either
    /// statically `is_registered`, or present in the caller-supplied set.
    #[inline]
    pub fn is_effectively_registered(&self, v: VertexIndex, registered: &std::collections::HashSet<VertexIndex>) -> bool {
        self.vertex(v).is_registered || registered.contains(&v)
    }
}
