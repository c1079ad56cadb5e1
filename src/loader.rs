//! Builds a [`Graph`] from tab-separated `<entity>\t<group>` records.
//!
//! A reader thread splits lines and streams records over a bounded channel;
//! the calling thread consumes them and builds the graph. Records that share
//! a group must be consecutive: when the group changes, every pair of
//! entities collected for the previous group is connected by an edge labelled
//! with the group id. Dropping the sender ends the stream.

use std::{
    collections::BTreeSet,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    sync::mpsc,
    thread,
};

use log::{debug, info};

use crate::{errors::CographError, graph::Graph};

/// Records buffered between the reader and the builder.
pub const CHANNEL_CAPACITY: usize = 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub line: usize,
    pub entity: String,
    pub group: String,
}

/// Parses one line. Blank lines yield `Ok(None)`; trailing empty fields are
/// ignored.
pub fn parse_record(line_no: usize, line: &str) -> Result<Option<Record>, CographError> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    let mut fields = line.trim_end_matches('\t').split('\t');
    match (fields.next(), fields.next(), fields.next()) {
        (Some(entity), Some(group), None) if !entity.is_empty() && !group.is_empty() => {
            Ok(Some(Record {
                line: line_no,
                entity: entity.to_string(),
                group: group.to_string(),
            }))
        }
        _ => Err(CographError::ingest(
            line_no,
            "expected two non-empty tab-separated fields",
        )),
    }
}

pub fn load_path<P: AsRef<Path>>(path: P) -> Result<Graph, CographError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let graph = load_reader(BufReader::new(file))?;
    info!(
        "loaded {}: {} vertices, {} edges",
        path.display(),
        graph.vertex_count(),
        graph.edge_count()
    );
    Ok(graph)
}

pub fn load_reader<R: BufRead + Send>(reader: R) -> Result<Graph, CographError> {
    let (tx, rx) = mpsc::sync_channel::<Result<Record, CographError>>(CHANNEL_CAPACITY);
    thread::scope(|scope| {
        scope.spawn(move || {
            for (idx, line) in reader.lines().enumerate() {
                let record = match line
                    .map_err(CographError::from)
                    .and_then(|line| parse_record(idx + 1, &line))
                {
                    Ok(Some(record)) => Ok(record),
                    Ok(None) => continue,
                    Err(err) => Err(err),
                };
                let failed = record.is_err();
                if tx.send(record).is_err() || failed {
                    return;
                }
            }
        });

        let mut builder = GroupBuilder::default();
        for record in rx {
            builder.push(record?)?;
        }
        builder.finish()
    })
}

/// Accumulates consecutive records of one group before flushing them into
/// the graph.
#[derive(Default)]
struct GroupBuilder {
    graph: Graph,
    group: Option<String>,
    members: BTreeSet<String>,
}

impl GroupBuilder {
    fn push(&mut self, record: Record) -> Result<(), CographError> {
        if self.group.as_deref() != Some(record.group.as_str()) {
            self.flush()?;
            self.group = Some(record.group);
        }
        self.members.insert(record.entity);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), CographError> {
        let Some(group) = self.group.take() else {
            return Ok(());
        };
        let members: Vec<String> = std::mem::take(&mut self.members).into_iter().collect();
        debug!("group {group}: {} members", members.len());
        if let [only] = members.as_slice() {
            self.graph.add_vertex(only);
            return Ok(());
        }
        for (idx, a) in members.iter().enumerate() {
            for b in &members[idx + 1..] {
                self.graph.add_edge(a, b, &group)?;
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Graph, CographError> {
        self.flush()?;
        Ok(self.graph)
    }
}
