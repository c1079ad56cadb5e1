//! Co-appearance graphs with a deterministic, multi-threaded shortest-path
//! search.
//!
//! Vertices are opaque string ids; every pair of vertices may be joined by
//! several labelled edges. [`breadth_first_search`] returns the shortest path
//! between two vertices, breaking ties by the lexicographic order of the
//! vertex ids along the path, and returns the same path for any worker count.
//! Run Criterion benchmarks with `cargo bench` to inspect reports under `target/criterion`.

pub mod bench_utils;
pub mod bfs;
pub mod client;
pub mod config;
pub mod edge;
pub mod errors;
pub mod graph;
pub mod loader;
pub mod render;

pub use crate::bfs::{BfsEngine, CancelToken, Path, breadth_first_search};
pub use crate::config::SearchConfig;
pub use crate::edge::{Edge, VertexId, VertexPair};
pub use crate::errors::CographError;
pub use crate::graph::Graph;
pub use crate::render::{Hop, PathReport, describe_path};
