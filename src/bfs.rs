//! Level-synchronous, multi-threaded breadth-first search.
//!
//! A search owns a fixed pool of worker threads for its whole lifetime. Each
//! round the driver hands every worker the same [`Round`], workers pop
//! frontier vertices until the frontier is exhausted, and the driver waits for
//! all of them before it inspects the round's results. Within a round the
//! first path to reach a vertex is installed in the pending table and later
//! arrivals only replace it when they are lexicographically lower, so the
//! result does not depend on the worker count or on scheduling.

use std::{
    any::Any,
    collections::hash_map::Entry,
    iter,
    mem,
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
        mpsc::{self, Receiver, Sender},
    },
    thread,
};

use ahash::{AHashMap, RandomState};
use log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};

use crate::{config::SearchConfig, edge::VertexId, errors::CographError, graph::Graph};

/// Ordered vertices from the start of a search to its end, both inclusive.
pub type Path = Vec<VertexId>;

/// Cooperative cancellation flag shared between a caller and a running
/// search. Checked by the driver between rounds and by workers before each
/// frontier vertex.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Shortest, lexicographically least path from `start` to `end` using
/// `workers` threads.
pub fn breadth_first_search(
    graph: &Graph,
    start: &str,
    end: &str,
    workers: usize,
) -> Result<Path, CographError> {
    BfsEngine::new(graph, SearchConfig::new(workers)).search(start, end)
}

pub struct BfsEngine<'g> {
    graph: &'g Graph,
    config: SearchConfig,
}

impl<'g> BfsEngine<'g> {
    pub fn new(graph: &'g Graph, config: SearchConfig) -> Self {
        Self { graph, config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn search(&self, start: &str, end: &str) -> Result<Path, CographError> {
        self.search_with_cancel(start, end, &CancelToken::new())
    }

    pub fn search_with_cancel(
        &self,
        start: &str,
        end: &str,
        cancel: &CancelToken,
    ) -> Result<Path, CographError> {
        self.config.validate()?;
        let start_id = self.resolve(start)?;
        let end_id = self.resolve(end)?;
        if start_id == end_id {
            return Ok(vec![start_id]);
        }

        let mut settled = AHashMap::new();
        settled.insert(start_id.clone(), vec![start_id.clone()]);
        let state = SearchState {
            graph: self.graph,
            settled: RwLock::new(settled),
            pending: PendingTable::new(self.config.lock_shards),
            cancel,
        };

        let path = thread::scope(|scope| {
            let (done_tx, done_rx) = mpsc::channel();
            let mut pool = Vec::with_capacity(self.config.workers);
            for idx in 0..self.config.workers {
                let (job_tx, job_rx) = mpsc::channel();
                let done_tx = done_tx.clone();
                let state = &state;
                thread::Builder::new()
                    .name(format!("cograph-bfs-{idx}"))
                    .spawn_scoped(scope, move || run_worker(state, job_rx, done_tx))
                    .map_err(|e| {
                        CographError::worker_failed(format!("spawn worker {idx}: {e}"))
                    })?;
                pool.push(job_tx);
            }
            drop(done_tx);
            drive(&state, &pool, &done_rx, start_id, end_id)
        })?;

        info!(
            "path {start} -> {end}: {} hops, {} workers",
            path.len() - 1,
            self.config.workers
        );
        Ok(path)
    }

    /// The graph's own id for `vertex`, so every path shares its storage.
    fn resolve(&self, vertex: &str) -> Result<VertexId, CographError> {
        self.graph.vertex_id(vertex).cloned().ok_or_else(|| {
            CographError::invalid_argument(format!("vertex {vertex} is not in the graph"))
        })
    }
}

struct SearchState<'a> {
    graph: &'a Graph,
    /// Final paths. Written only by the driver, between rounds.
    settled: RwLock<AHashMap<VertexId, Path>>,
    /// Best path found so far this round, per vertex.
    pending: PendingTable,
    cancel: &'a CancelToken,
}

/// One frontier handed to every worker. The frontier itself is immutable;
/// workers claim vertices by bumping `cursor`.
struct Round {
    frontier: Vec<VertexId>,
    cursor: AtomicUsize,
    next: Mutex<Vec<VertexId>>,
    abort: AtomicBool,
}

impl Round {
    fn new(frontier: Vec<VertexId>) -> Self {
        Self {
            frontier,
            cursor: AtomicUsize::new(0),
            next: Mutex::new(Vec::new()),
            abort: AtomicBool::new(false),
        }
    }

    fn pop(&self) -> Option<&VertexId> {
        if self.abort.load(Ordering::Acquire) {
            return None;
        }
        let idx = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.frontier.get(idx)
    }
}

fn drive(
    state: &SearchState<'_>,
    pool: &[Sender<Arc<Round>>],
    done: &Receiver<Result<(), CographError>>,
    start: VertexId,
    end: VertexId,
) -> Result<Path, CographError> {
    let mut current = vec![start.clone()];
    let mut level = 0usize;
    while !current.is_empty() {
        if state.cancel.is_cancelled() {
            return Err(CographError::Cancelled);
        }
        level += 1;
        debug!("round {level}: expanding {} vertices", current.len());

        let round = Arc::new(Round::new(mem::take(&mut current)));
        for worker in pool {
            worker
                .send(Arc::clone(&round))
                .map_err(|_| CographError::worker_failed("worker pool shut down"))?;
        }
        let mut failure = None;
        for _ in 0..pool.len() {
            match done.recv() {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    failure.get_or_insert(err);
                }
                Err(_) => return Err(CographError::worker_failed("worker pool disconnected")),
            }
        }
        if let Some(err) = failure {
            return Err(err);
        }
        if state.cancel.is_cancelled() {
            return Err(CographError::Cancelled);
        }

        let reached = state.pending.drain();
        if let Some((_, path)) = reached.iter().find(|(vertex, _)| *vertex == end) {
            return Ok(path.clone());
        }
        state.settled.write().extend(reached);
        current = mem::take(&mut *round.next.lock());
    }
    Err(CographError::no_path(&*start, &*end))
}

fn run_worker(
    state: &SearchState<'_>,
    jobs: Receiver<Arc<Round>>,
    done: Sender<Result<(), CographError>>,
) {
    while let Ok(round) = jobs.recv() {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| expand(state, &round)))
            .unwrap_or_else(|payload| {
                Err(CographError::worker_failed(panic_message(&*payload)))
            });
        if let Err(err) = &outcome {
            warn!("search worker aborting round: {err}");
            round.abort.store(true, Ordering::Release);
        }
        drop(round);
        if done.send(outcome).is_err() {
            break;
        }
    }
}

fn expand(state: &SearchState<'_>, round: &Round) -> Result<(), CographError> {
    while let Some(vertex) = round.pop() {
        if state.cancel.is_cancelled() {
            return Ok(());
        }
        let settled = state.settled.read();
        let prefix = settled.get(vertex).ok_or_else(|| {
            CographError::worker_failed(format!("frontier vertex {vertex} has no settled path"))
        })?;
        for neighbour in state.graph.neighbours(vertex)? {
            if settled.contains_key(neighbour) {
                continue;
            }
            if state.pending.offer(neighbour, prefix) {
                round.next.lock().push(neighbour.clone());
            }
        }
    }
    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "worker panicked".to_string()
    }
}

/// Pending paths partitioned over independently locked shards. A vertex
/// always maps to the same shard, so the compare-and-replace for one vertex
/// is serialized while unrelated vertices proceed in parallel.
struct PendingTable {
    hasher: RandomState,
    shards: Box<[Mutex<AHashMap<VertexId, Path>>]>,
}

impl PendingTable {
    fn new(shard_count: usize) -> Self {
        let shards = (0..shard_count.max(1))
            .map(|_| Mutex::new(AHashMap::new()))
            .collect();
        Self {
            hasher: RandomState::new(),
            shards,
        }
    }

    fn shard(&self, vertex: &VertexId) -> &Mutex<AHashMap<VertexId, Path>> {
        let idx = self.hasher.hash_one(vertex) as usize % self.shards.len();
        &self.shards[idx]
    }

    /// Offers `prefix + [vertex]` as a path to `vertex`. Returns `true` only
    /// for the first offer of the round; later offers replace the stored path
    /// when they are strictly lower.
    fn offer(&self, vertex: &VertexId, prefix: &Path) -> bool {
        let mut shard = self.shard(vertex).lock();
        match shard.entry(vertex.clone()) {
            Entry::Vacant(slot) => {
                let mut path = Vec::with_capacity(prefix.len() + 1);
                path.extend(prefix.iter().cloned());
                path.push(vertex.clone());
                slot.insert(path);
                true
            }
            Entry::Occupied(mut slot) => {
                let candidate = prefix.iter().chain(iter::once(vertex));
                if candidate.cmp(slot.get().iter()).is_lt() {
                    let existing = slot.get_mut();
                    existing.clear();
                    existing.extend(prefix.iter().cloned());
                    existing.push(vertex.clone());
                }
                false
            }
        }
    }

    fn drain(&self) -> Vec<(VertexId, Path)> {
        let mut reached = Vec::new();
        for shard in self.shards.iter() {
            reached.extend(shard.lock().drain());
        }
        reached
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Path {
        names.iter().map(|n| VertexId::from(*n)).collect()
    }

    #[test]
    fn test_unsettled_frontier_vertex_fails_round() {
        let mut graph = Graph::new();
        graph.add_edge("a", "b", "x").expect("edge");
        graph.add_edge("b", "c", "x").expect("edge");
        let start = graph.vertex_id("a").cloned().expect("a");
        let end = graph.vertex_id("c").cloned().expect("c");
        let cancel = CancelToken::new();
        // "a" is handed out without a settled path
        let state = SearchState {
            graph: &graph,
            settled: RwLock::new(AHashMap::new()),
            pending: PendingTable::new(4),
            cancel: &cancel,
        };
        let workers = 3;

        thread::scope(|scope| {
            let (done_tx, done_rx) = mpsc::channel();
            let mut pool = Vec::with_capacity(workers);
            for _ in 0..workers {
                let (job_tx, job_rx) = mpsc::channel();
                let done_tx = done_tx.clone();
                let state = &state;
                scope.spawn(move || run_worker(state, job_rx, done_tx));
                pool.push(job_tx);
            }
            drop(done_tx);

            let err = drive(&state, &pool, &done_rx, start, end).unwrap_err();
            assert!(matches!(err, CographError::WorkerFailed(_)), "{err:?}");
            // one acknowledgement per worker was consumed, none is left over
            assert!(matches!(
                done_rx.try_recv(),
                Err(mpsc::TryRecvError::Empty)
            ));
            drop(pool);
            assert!(done_rx.recv().is_err());
        });
        assert!(state.pending.drain().is_empty());
    }

    #[test]
    fn test_aborted_round_stops_popping() {
        let round = Round::new(ids(&["a", "b", "c"]));
        assert_eq!(round.pop().map(|v| &**v), Some("a"));
        round.abort.store(true, Ordering::Release);
        assert!(round.pop().is_none());
    }

    #[test]
    fn test_round_pop_exhausts_frontier_once() {
        let round = Round::new(ids(&["a", "b"]));
        let popped: Vec<&str> = iter::from_fn(|| round.pop()).map(|v| &**v).collect();
        assert_eq!(popped, vec!["a", "b"]);
        assert!(round.pop().is_none());
    }

    #[test]
    fn test_pending_offer_keeps_lowest_path() {
        let table = PendingTable::new(2);
        let target = VertexId::from("t");
        assert!(table.offer(&target, &ids(&["s", "m2"])));
        assert!(!table.offer(&target, &ids(&["s", "m1"])));
        assert!(!table.offer(&target, &ids(&["s", "m3"])));

        let reached = table.drain();
        assert_eq!(reached.len(), 1);
        assert_eq!(reached[0].1, ids(&["s", "m1", "t"]));
        assert!(table.drain().is_empty());
    }

    #[test]
    fn test_single_shard_table_holds_every_vertex() {
        let table = PendingTable::new(1);
        for name in ["x", "y", "z"] {
            assert!(table.offer(&VertexId::from(name), &ids(&["s"])));
        }
        let mut reached: Vec<String> = table
            .drain()
            .into_iter()
            .map(|(vertex, _)| vertex.to_string())
            .collect();
        reached.sort();
        assert_eq!(reached, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_panic_message_reads_common_payloads() {
        assert_eq!(panic_message(&"boom"), "boom");
        assert_eq!(panic_message(&String::from("bang")), "bang");
        assert_eq!(panic_message(&7u32), "worker panicked");
    }
}
