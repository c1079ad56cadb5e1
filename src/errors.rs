use thiserror::Error;

#[derive(Debug, Error)]
pub enum CographError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("no path could be found between {start} and {end}")]
    NoPath { start: String, end: String },
    #[error("search cancelled")]
    Cancelled,
    #[error("search worker failed: {0}")]
    WorkerFailed(String),
    #[error("malformed record on line {line}: {reason}")]
    Ingest { line: usize, reason: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CographError {
    pub fn invalid_argument<T: Into<String>>(msg: T) -> Self {
        CographError::InvalidArgument(msg.into())
    }

    pub fn no_path<S: Into<String>, E: Into<String>>(start: S, end: E) -> Self {
        CographError::NoPath {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn worker_failed<T: Into<String>>(msg: T) -> Self {
        CographError::WorkerFailed(msg.into())
    }

    pub fn ingest<T: Into<String>>(line: usize, reason: T) -> Self {
        CographError::Ingest {
            line,
            reason: reason.into(),
        }
    }

    /// No-path is an expected outcome of a search, not a fault.
    pub fn is_no_path(&self) -> bool {
        matches!(self, CographError::NoPath { .. })
    }
}
