use std::{cmp::Ordering, fmt, sync::Arc};

use crate::errors::CographError;

/// Opaque vertex identifier. Shared between the adjacency map, the edge
/// relation and every search path, so clones are reference bumps.
pub type VertexId = Arc<str>;

/// Unordered pair of two distinct vertices, stored in sorted order so that
/// `{a, b}` and `{b, a}` hash and compare identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexPair {
    vertices: [VertexId; 2],
}

impl VertexPair {
    pub fn new(a: impl Into<VertexId>, b: impl Into<VertexId>) -> Result<Self, CographError> {
        Self::from_vertices([a.into(), b.into()])
    }

    /// Builds a pair from any collection of vertices. The collection must
    /// hold exactly two distinct members once duplicates are removed.
    pub fn from_vertices<I, V>(vertices: I) -> Result<Self, CographError>
    where
        I: IntoIterator<Item = V>,
        V: Into<VertexId>,
    {
        let mut members: Vec<VertexId> = vertices.into_iter().map(Into::into).collect();
        members.sort();
        members.dedup();
        match <[VertexId; 2]>::try_from(members) {
            Ok(vertices) => Ok(Self { vertices }),
            Err(members) => Err(CographError::invalid_argument(format!(
                "an edge needs exactly two distinct vertices, got {}",
                members.len()
            ))),
        }
    }

    pub fn first(&self) -> &VertexId {
        &self.vertices[0]
    }

    pub fn second(&self) -> &VertexId {
        &self.vertices[1]
    }

    pub fn contains(&self, vertex: &str) -> bool {
        self.vertices.iter().any(|v| &**v == vertex)
    }

    /// The member of the pair that is not `vertex`.
    pub fn partner(&self, vertex: &str) -> Result<&VertexId, CographError> {
        if &*self.vertices[0] == vertex {
            Ok(&self.vertices[1])
        } else if &*self.vertices[1] == vertex {
            Ok(&self.vertices[0])
        } else {
            Err(CographError::invalid_argument(format!(
                "vertex {vertex} is not part of {self}"
            )))
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &VertexId> {
        self.vertices.iter()
    }
}

impl fmt::Display for VertexPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {}}}", self.vertices[0], self.vertices[1])
    }
}

/// A labelled, undirected connection between two distinct vertices.
///
/// Edges order by label first. The pair only breaks ties so that the
/// ordering stays consistent with equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    pair: VertexPair,
    label: String,
}

impl Edge {
    pub fn new(pair: VertexPair, label: impl Into<String>) -> Self {
        Self {
            pair,
            label: label.into(),
        }
    }

    pub fn from_vertices<I, V>(vertices: I, label: impl Into<String>) -> Result<Self, CographError>
    where
        I: IntoIterator<Item = V>,
        V: Into<VertexId>,
    {
        Ok(Self::new(VertexPair::from_vertices(vertices)?, label))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn pair(&self) -> &VertexPair {
        &self.pair
    }

    pub fn partner(&self, vertex: &str) -> Result<&VertexId, CographError> {
        self.pair.partner(vertex)
    }
}

impl Ord for Edge {
    fn cmp(&self, other: &Self) -> Ordering {
        self.label
            .cmp(&other.label)
            .then_with(|| self.pair.cmp(&other.pair))
    }
}

impl PartialOrd for Edge {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
