//! Chronological commit indexing and time-window queries.
//!
//! The timeline is the authoritative "time flow" for interval queries:
//! every commit reachable from any ref, ordered ascending by author date.
//! `git log` emits newest-first and author dates need not agree with
//! commit order (rebases, imports, clock skew), so the raw emission is
//! reversed and then stable-sorted — callers must never rely on git's
//! native emission order for chronology.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{GitError, Result};
use crate::invoker::GitInvoker;

/// Author/commit date format as emitted by `%ai`/`%ci`: an explicit UTC
/// offset, e.g. `2021-03-01 14:07:12 +0900`.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// One commit on the timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub hash: String,
    pub author_date: DateTime<FixedOffset>,
}

/// All known commits, ascending by author date. Ties keep encounter
/// order (the reversed tool emission) and are not otherwise meaningful.
pub type Timeline = Vec<TimelineEntry>;

/// Parse an author/commit date string carrying a UTC offset.
///
/// Fails with [`GitError::MalformedTimestamp`]; listing operations treat
/// that as fatal for the whole listing, since a timeline with one
/// unparseable date cannot be trusted for ordering.
pub fn parse_date(text: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_str(text.trim(), DATE_FORMAT)
        .map_err(|_| GitError::MalformedTimestamp(text.to_string()))
}

/// Lists commit hashes and answers interval queries.
pub struct HistoryIndexer<'a> {
    git: &'a dyn GitInvoker,
}

impl<'a> HistoryIndexer<'a> {
    pub fn new(git: &'a dyn GitInvoker) -> Self {
        Self { git }
    }

    /// Every commit reachable from any ref, oldest-first by author date.
    pub fn timeline(&self, repo: &Path) -> Result<Timeline> {
        let raw = self
            .git
            .run_utf8(repo, &["log", "--all", "--pretty=format:%H,%ai"])?;

        let mut entries: Vec<TimelineEntry> = Vec::new();
        for line in raw.lines().rev() {
            if line.is_empty() {
                continue;
            }
            let (hash, date) = line
                .split_once(',')
                .ok_or_else(|| GitError::MalformedTimestamp(line.to_string()))?;
            entries.push(TimelineEntry {
                hash: hash.to_string(),
                author_date: parse_date(date)?,
            });
        }

        // Stable, so equal author dates keep encounter order.
        entries.sort_by_key(|entry| entry.author_date);
        Ok(entries)
    }

    /// Every commit hash, tool-native order (newest-first), merges
    /// included.
    pub fn all_hashes(&self, repo: &Path) -> Result<Vec<String>> {
        self.hash_listing(repo, &["log", "--all", "--pretty=format:%H"])
    }

    /// Every non-merge commit hash, tool-native order (newest-first).
    pub fn all_hashes_no_merges(&self, repo: &Path) -> Result<Vec<String>> {
        self.hash_listing(repo, &["log", "--all", "--no-merges", "--pretty=format:%H"])
    }

    /// Hashes of commits with `min <= author_date <= max`, chronological.
    ///
    /// Both bounds are inclusive. An empty or inverted window yields an
    /// empty vec, not an error.
    pub fn hashes_in_interval(
        &self,
        repo: &Path,
        max: DateTime<FixedOffset>,
        min: DateTime<FixedOffset>,
    ) -> Result<Vec<String>> {
        Ok(self
            .timeline(repo)?
            .into_iter()
            .filter(|entry| entry.author_date >= min && entry.author_date <= max)
            .map(|entry| entry.hash)
            .collect())
    }

    fn hash_listing(&self, repo: &Path, args: &[&str]) -> Result<Vec<String>> {
        let raw = self.git.run_utf8(repo, args)?;
        Ok(raw
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| line.to_string())
            .collect())
    }
}
