//! Search configuration.
//!
//! A [`SearchConfig`] fixes the size of the worker pool used for every round
//! of a search and the number of shards in the pending-path lock table.

use std::{env, num::NonZeroUsize, thread};

use crate::errors::CographError;

pub const WORKERS_ENV: &str = "COGRAPH_WORKERS";
pub const LOCK_SHARDS_ENV: &str = "COGRAPH_LOCK_SHARDS";

/// Default number of lock-table shards.
pub const DEFAULT_LOCK_SHARDS: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    /// Number of worker threads expanding each frontier.
    ///
    /// **Must be positive.**
    pub workers: usize,
    /// Number of independently locked partitions of the pending-path map.
    /// Vertices hash to a shard; more shards means less contention.
    pub lock_shards: usize,
}

impl SearchConfig {
    pub fn new(workers: usize) -> Self {
        Self {
            workers,
            lock_shards: DEFAULT_LOCK_SHARDS,
        }
    }

    pub fn with_lock_shards(mut self, lock_shards: usize) -> Self {
        self.lock_shards = lock_shards;
        self
    }

    /// Defaults overridden by `COGRAPH_WORKERS` and `COGRAPH_LOCK_SHARDS`.
    pub fn from_env() -> Result<Self, CographError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`SearchConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CographError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(workers) = parse_var(WORKERS_ENV, lookup(WORKERS_ENV))? {
            config.workers = workers;
        }
        let config = config.with_lookup_lock_shards(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `COGRAPH_LOCK_SHARDS` only, keeping the worker count.
    pub fn with_env_lock_shards(self) -> Result<Self, CographError> {
        self.with_lookup_lock_shards(|key| env::var(key).ok())
    }

    pub fn with_lookup_lock_shards<F>(mut self, lookup: F) -> Result<Self, CographError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(shards) = parse_var(LOCK_SHARDS_ENV, lookup(LOCK_SHARDS_ENV))? {
            self.lock_shards = shards;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), CographError> {
        if self.workers == 0 {
            return Err(CographError::invalid_argument(
                "worker count must be positive",
            ));
        }
        if self.lock_shards == 0 {
            return Err(CographError::invalid_argument(
                "lock shard count must be positive",
            ));
        }
        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        let workers = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        Self::new(workers)
    }
}

fn parse_var(key: &str, raw: Option<String>) -> Result<Option<usize>, CographError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    raw.trim()
        .parse::<usize>()
        .map(Some)
        .map_err(|e| CographError::invalid_argument(format!("{key}={raw}: {e}")))
}
