use std::fmt;

use serde::Serialize;

use crate::{edge::VertexId, errors::CographError, graph::Graph};

/// One step of a rendered path: two adjacent vertices and the lowest label
/// connecting them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Hop {
    pub from: String,
    pub to: String,
    pub label: String,
}

impl fmt::Display for Hop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} and {} appear in {}",
            strip_quotes(&self.from),
            strip_quotes(&self.to),
            strip_quotes(&self.label)
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PathReport {
    pub start: String,
    pub end: String,
    pub workers: usize,
    pub path: Vec<String>,
    pub hops: Vec<Hop>,
}

impl PathReport {
    pub fn new(
        graph: &Graph,
        start: &str,
        end: &str,
        workers: usize,
        path: &[VertexId],
    ) -> Result<Self, CographError> {
        Ok(Self {
            start: start.to_string(),
            end: end.to_string(),
            workers,
            path: path.iter().map(|v| v.to_string()).collect(),
            hops: describe_path(graph, path)?,
        })
    }
}

/// Describes every consecutive pair of `path` by its lowest-labelled edge.
pub fn describe_path(graph: &Graph, path: &[VertexId]) -> Result<Vec<Hop>, CographError> {
    path.windows(2)
        .map(|pair| {
            let edge = graph.lowest_edge(&pair[0], &pair[1])?;
            Ok(Hop {
                from: pair[0].to_string(),
                to: pair[1].to_string(),
                label: edge.label().to_string(),
            })
        })
        .collect()
}

/// Drops one pair of enclosing double quotes, as used by the TSV datasets.
pub fn strip_quotes(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
