use std::collections::BTreeSet;

use ahash::{AHashMap, AHashSet};

use crate::{
    edge::{Edge, VertexId, VertexPair},
    errors::CographError,
};

/// Undirected multigraph: an adjacency map plus the labelled edges between
/// each connected pair.
///
/// Invariants maintained by the mutators:
/// - every vertex of every edge is a key of `adjacency` and lists its partner;
/// - no self loops, and at most one edge per (pair, label).
///
/// A `Graph` is read-only while a search runs; workers borrow it shared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    adjacency: AHashMap<VertexId, AHashSet<VertexId>>,
    edges: AHashMap<VertexPair, BTreeSet<Edge>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertex_count: usize) -> Self {
        Self {
            adjacency: AHashMap::with_capacity(vertex_count),
            edges: AHashMap::with_capacity(vertex_count),
        }
    }

    /// Adds `vertex` with no neighbours. Returns `false` when the vertex is
    /// already present or the id is empty.
    pub fn add_vertex(&mut self, vertex: &str) -> bool {
        if vertex.is_empty() || self.adjacency.contains_key(vertex) {
            return false;
        }
        self.adjacency.insert(VertexId::from(vertex), AHashSet::new());
        true
    }

    /// Connects `v1` and `v2` with an edge labelled `label`, creating either
    /// vertex if needed. Re-adding an existing (pair, label) is a no-op that
    /// still reports `true`. Empty vertex ids report `false`.
    pub fn add_edge(&mut self, v1: &str, v2: &str, label: &str) -> Result<bool, CographError> {
        if v1.is_empty() || v2.is_empty() {
            return Ok(false);
        }
        if v1 == v2 {
            return Err(CographError::invalid_argument(format!(
                "self loop on {v1} is not supported"
            )));
        }
        let a = self.intern(v1);
        let b = self.intern(v2);
        let pair = VertexPair::new(a.clone(), b.clone())?;
        if let Some(neighbours) = self.adjacency.get_mut(&a) {
            neighbours.insert(b.clone());
        }
        if let Some(neighbours) = self.adjacency.get_mut(&b) {
            neighbours.insert(a);
        }
        self.edges
            .entry(pair.clone())
            .or_default()
            .insert(Edge::new(pair, label));
        Ok(true)
    }

    pub fn contains_vertex(&self, vertex: &str) -> bool {
        self.adjacency.contains_key(vertex)
    }

    /// The graph's stored id for `vertex`.
    pub fn vertex_id(&self, vertex: &str) -> Option<&VertexId> {
        self.adjacency.get_key_value(vertex).map(|(id, _)| id)
    }

    pub fn neighbours(&self, vertex: &str) -> Result<&AHashSet<VertexId>, CographError> {
        self.adjacency.get(vertex).ok_or_else(|| {
            CographError::invalid_argument(format!("vertex {vertex} is not in the graph"))
        })
    }

    /// Edges between an unordered pair, ordered by label.
    pub fn edges(&self, pair: &VertexPair) -> Result<&BTreeSet<Edge>, CographError> {
        self.edges
            .get(pair)
            .ok_or_else(|| CographError::invalid_argument(format!("no edges between {pair}")))
    }

    pub fn edges_between(&self, v1: &str, v2: &str) -> Result<&BTreeSet<Edge>, CographError> {
        self.edges(&VertexPair::new(v1, v2)?)
    }

    /// The lowest-labelled edge between two vertices.
    pub fn lowest_edge(&self, v1: &str, v2: &str) -> Result<&Edge, CographError> {
        let pair = VertexPair::new(v1, v2)?;
        self.edges(&pair)?
            .first()
            .ok_or_else(|| CographError::invalid_argument(format!("no edges between {pair}")))
    }

    pub fn vertices(&self) -> impl Iterator<Item = &VertexId> {
        self.adjacency.keys()
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    /// Returns the stored id for `vertex`, inserting it when missing.
    fn intern(&mut self, vertex: &str) -> VertexId {
        if let Some(existing) = self.vertex_id(vertex) {
            return existing.clone();
        }
        let id = VertexId::from(vertex);
        self.adjacency.insert(id.clone(), AHashSet::new());
        id
    }
}
