//! Git history mining library
//!
//! Extracts structured history data from an existing git checkout by
//! shelling out to the `git` executable and re-shaping its textual output:
//! chronological commit timelines, time-window queries, per-commit churn
//! totals, commit metadata, tag resolution, and file snapshots at arbitrary
//! revisions.
//!
//! # Features
//!
//! - Chronological (oldest-first) commit timeline with author timestamps
//! - Time-window queries over the timeline
//! - Per-commit added/deleted line totals (binary files skipped)
//! - Commit metadata: author, dates, full message, modified files
//! - Dereferenced tag resolution and glob tag listing
//! - File content at (or immediately before) a given commit
//! - Raw diff/show/blame blobs, sanitized for downstream storage
//!
//! Everything is recomputed per query; the library holds no caches and
//! issues no write operations against the repository.
//!
//! # Example
//!
//! ```no_run
//! use gitminer::{ChangeStatAggregator, HistoryIndexer, SystemGit};
//! use std::path::Path;
//!
//! let git = SystemGit::new();
//! let repo = Path::new("/path/to/repo");
//!
//! let history = HistoryIndexer::new(&git);
//! let timeline = history.timeline(repo).unwrap();
//!
//! let stats = ChangeStatAggregator::new(&git);
//! for entry in &timeline {
//!     let churn = stats.numstat(repo, &entry.hash).unwrap();
//!     println!("{} +{} -{}", entry.hash, churn.added, churn.deleted);
//! }
//! ```

pub mod config;
pub mod content;
pub mod encoding;
pub mod error;
pub mod history;
pub mod invoker;
pub mod metadata;
pub mod sanitize;
pub mod stats;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::MinerConfig;
pub use content::ContentRetriever;
pub use encoding::{DecodedText, FallbackReader, FileQuarantine, QuarantineSink};
pub use error::{GitError, Result};
pub use history::{HistoryIndexer, Timeline, TimelineEntry};
pub use invoker::{GitInvoker, SystemGit};
pub use metadata::{CommitRecord, MetadataRetriever, TagIndex, TagRecord};
pub use sanitize::sanitize;
pub use stats::{ChangeStat, ChangeStatAggregator};
