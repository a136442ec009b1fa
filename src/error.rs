//! Error types for history extraction.
//!
//! Parsing and format errors abort the specific operation they occur in;
//! command failures abort the specific external call. Decode failures are
//! not represented here at all: they are recovered locally with a lossy
//! fallback (see [`crate::encoding`]).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitError {
    /// The given path does not look like a git repository root.
    #[error("not a git repository: {0}")]
    RepositoryNotFound(PathBuf),

    /// The git subprocess exited non-zero, was killed, or timed out.
    /// `status` is `None` when no exit code is available (signal or
    /// timeout).
    #[error("git command failed (status {status:?}): {stderr}")]
    CommandFailed {
        status: Option<i32>,
        stderr: String,
    },

    /// An author/commit timestamp did not match `YYYY-MM-DD HH:MM:SS ±HHMM`.
    /// Aborts the whole listing: a partially parsed timeline cannot be
    /// trusted for chronological ordering.
    #[error("malformed timestamp: {0:?}")]
    MalformedTimestamp(String),

    /// A numstat line was neither the binary sentinel nor an integer pair.
    #[error("malformed numstat line: {0:?}")]
    MalformedStatLine(String),

    /// The requested path does not exist at the requested revision.
    /// Recoverable: callers may treat this as "file did not exist yet".
    #[error("path {path:?} not found at revision {revision}")]
    PathNotFoundAtRevision { revision: String, path: String },

    /// Tool output that must be machine-readable was not (e.g. a hash
    /// listing that is not valid UTF-8).
    #[error("unreadable git output: {0}")]
    Output(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GitError>;
