//! Directed weighted graph over dense node ids.
//!
//! Backed by petgraph. Node ids are dense `0..n` and, after a load or a
//! synthesis, equal to the underlying `NodeIndex`, so embedding matrices can
//! index rows by node id directly.

use nalgebra::DMatrix;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Node payload: the external id and an optional community label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: u32,
    pub community: Option<u32>,
}

/// Edge payload: a positive weight, 1.0 when the source file carried none.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Edge {
    pub weight: f64,
}

type Inner = petgraph::Graph<Node, Edge, Directed>;

/// Directed weighted graph used by every embedding method.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    inner: Inner,
    node_lookup: HashMap<u32, NodeIndex>,
}

/// Basic statistics for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub density: f64,
    pub average_degree: f64,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self {
            inner: Inner::new(),
            node_lookup: HashMap::new(),
        }
    }

    /// Get or create the node with the given external id.
    pub fn add_node(&mut self, id: u32) -> NodeIndex {
        if let Some(&idx) = self.node_lookup.get(&id) {
            idx
        } else {
            let idx = self.inner.add_node(Node {
                id,
                community: None,
            });
            self.node_lookup.insert(id, idx);
            idx
        }
    }

    /// Add a directed edge, creating endpoints as needed.
    ///
    /// Parallel edges are collapsed: adding an existing (source, target) pair
    /// overwrites the stored weight.
    pub fn add_edge(&mut self, source: u32, target: u32, weight: f64) {
        let s = self.add_node(source);
        let t = self.add_node(target);
        if let Some(edge) = self.inner.find_edge(s, t) {
            self.inner[edge] = Edge { weight };
        } else {
            self.inner.add_edge(s, t, Edge { weight });
        }
    }

    /// Assign a community label to a node (created if absent).
    pub fn set_community(&mut self, id: u32, community: u32) {
        let idx = self.add_node(id);
        self.inner[idx].community = Some(community);
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// True when the external id is present.
    pub fn contains_node(&self, id: u32) -> bool {
        self.node_lookup.contains_key(&id)
    }

    /// Weight of the (source, target) edge, if present.
    pub fn edge_weight(&self, source: u32, target: u32) -> Option<f64> {
        let s = *self.node_lookup.get(&source)?;
        let t = *self.node_lookup.get(&target)?;
        let edge = self.inner.find_edge(s, t)?;
        Some(self.inner[edge].weight)
    }

    /// Community label of a node, if one was assigned.
    pub fn community(&self, id: u32) -> Option<u32> {
        let idx = *self.node_lookup.get(&id)?;
        self.inner[idx].community
    }

    /// External ids in `NodeIndex` order.
    pub fn node_ids(&self) -> Vec<u32> {
        self.inner.node_weights().map(|n| n.id).collect()
    }

    /// All edges as `(source id, target id, weight)` triples.
    pub fn edges(&self) -> Vec<(u32, u32, f64)> {
        self.inner
            .edge_references()
            .map(|e| {
                (
                    self.inner[e.source()].id,
                    self.inner[e.target()].id,
                    e.weight().weight,
                )
            })
            .collect()
    }

    /// Out-neighbors of a node as `(target id, weight)` pairs.
    pub fn out_neighbors(&self, id: u32) -> Vec<(u32, f64)> {
        let Some(&idx) = self.node_lookup.get(&id) else {
            return Vec::new();
        };
        self.inner
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (self.inner[e.target()].id, e.weight().weight))
            .collect()
    }

    /// Out-degree of a node (0 for unknown ids).
    pub fn out_degree(&self, id: u32) -> usize {
        self.node_lookup
            .get(&id)
            .map(|&idx| self.inner.edges_directed(idx, Direction::Outgoing).count())
            .unwrap_or(0)
    }

    /// True when node ids are exactly `0..n` in `NodeIndex` order.
    ///
    /// Loaders and the synthesizer establish this; matrix-based methods
    /// require it.
    pub fn has_dense_ids(&self) -> bool {
        self.inner
            .node_weights()
            .enumerate()
            .all(|(i, n)| n.id as usize == i)
    }

    /// Dense adjacency matrix, rows are sources.
    pub fn adjacency_matrix(&self) -> DMatrix<f64> {
        let n = self.node_count();
        let mut a = DMatrix::zeros(n, n);
        for (s, t, w) in self.edges() {
            a[(s as usize, t as usize)] = w;
        }
        a
    }

    /// Symmetrized adjacency: `max(A, A^T)` entrywise.
    ///
    /// The spectral methods operate on the undirected view of the graph.
    pub fn symmetric_adjacency(&self) -> DMatrix<f64> {
        let a = self.adjacency_matrix();
        let n = a.nrows();
        let mut s = a.clone();
        for i in 0..n {
            for j in 0..n {
                if a[(j, i)] > s[(i, j)] {
                    s[(i, j)] = a[(j, i)];
                }
            }
        }
        s
    }

    /// Summary statistics.
    pub fn stats(&self) -> GraphStats {
        let n = self.node_count();
        let m = self.edge_count();
        let max_edges = n.saturating_mul(n.saturating_sub(1));
        GraphStats {
            node_count: n,
            edge_count: m,
            density: if max_edges > 0 {
                m as f64 / max_edges as f64
            } else {
                0.0
            },
            average_degree: if n > 0 { m as f64 / n as f64 } else { 0.0 },
        }
    }
}
