//! Per-commit change-size aggregation from `--numstat` output.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::path::Path;

use crate::error::{GitError, Result};
use crate::invoker::GitInvoker;

/// Lines added and deleted by a commit, summed over all touched files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeStat {
    pub added: u64,
    pub deleted: u64,
}

impl ChangeStat {
    pub fn new(added: u64, deleted: u64) -> Self {
        Self { added, deleted }
    }

    /// Total churn: added plus deleted.
    pub fn total(&self) -> u64 {
        self.added + self.deleted
    }
}

impl Add for ChangeStat {
    type Output = ChangeStat;

    fn add(self, rhs: ChangeStat) -> ChangeStat {
        ChangeStat {
            added: self.added + rhs.added,
            deleted: self.deleted + rhs.deleted,
        }
    }
}

impl AddAssign for ChangeStat {
    fn add_assign(&mut self, rhs: ChangeStat) {
        self.added += rhs.added;
        self.deleted += rhs.deleted;
    }
}

impl Sum for ChangeStat {
    fn sum<I: Iterator<Item = ChangeStat>>(iter: I) -> ChangeStat {
        iter.fold(ChangeStat::default(), Add::add)
    }
}

/// Parse one `--numstat` line: `added\tdeleted\tpath`.
///
/// Binary files are reported as `-\t-\tpath` and contribute nothing.
/// Returns `None` for the sentinel, the parsed pair otherwise.
fn parse_stat_line(line: &str) -> Result<Option<ChangeStat>> {
    let mut fields = line.splitn(3, '\t');
    let (Some(added), Some(deleted), Some(_path)) = (fields.next(), fields.next(), fields.next())
    else {
        return Err(GitError::MalformedStatLine(line.to_string()));
    };

    if added == "-" && deleted == "-" {
        return Ok(None);
    }

    match (added.parse::<u64>(), deleted.parse::<u64>()) {
        (Ok(added), Ok(deleted)) => Ok(Some(ChangeStat { added, deleted })),
        _ => Err(GitError::MalformedStatLine(line.to_string())),
    }
}

/// Reduces per-file numstat lines to commit-level totals.
pub struct ChangeStatAggregator<'a> {
    git: &'a dyn GitInvoker,
}

impl<'a> ChangeStatAggregator<'a> {
    pub fn new(git: &'a dyn GitInvoker) -> Self {
        Self { git }
    }

    /// Total lines added/deleted by one commit.
    ///
    /// Binary files (numstat sentinel `-`) are skipped without error; any
    /// other non-numeric field fails the whole aggregation with
    /// [`GitError::MalformedStatLine`].
    pub fn numstat(&self, repo: &Path, commit_hash: &str) -> Result<ChangeStat> {
        let raw = self
            .git
            .run_utf8(repo, &["show", commit_hash, "--numstat", "--pretty="])?;

        let mut total = ChangeStat::default();
        for line in raw.lines().filter(|line| !line.is_empty()) {
            if let Some(stat) = parse_stat_line(line)? {
                total += stat;
            }
        }
        Ok(total)
    }

    /// Change stats for many commits, fetched in parallel.
    ///
    /// Commits are immutable and each query is read-only, so the fetches
    /// are independent; the result order matches `hashes`, never worker
    /// arrival order.
    pub fn numstat_many<S: AsRef<str> + Sync>(
        &self,
        repo: &Path,
        hashes: &[S],
    ) -> Result<Vec<(String, ChangeStat)>> {
        hashes
            .par_iter()
            .map(|hash| {
                let hash = hash.as_ref();
                self.numstat(repo, hash).map(|stat| (hash.to_string(), stat))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FakeInvoker;

    fn numstat_args(hash: &str) -> Vec<&str> {
        vec!["show", hash, "--numstat", "--pretty="]
    }

    #[test]
    fn sums_across_files() {
        let git = FakeInvoker::new().on(
            &numstat_args("abc"),
            "3\t1\tsrc/lib.rs\n10\t4\tsrc/main.rs\n",
        );
        let stat = ChangeStatAggregator::new(&git)
            .numstat(Path::new("/repo"), "abc")
            .unwrap();
        assert_eq!(stat, ChangeStat::new(13, 5));
    }

    #[test]
    fn binary_sentinel_contributes_nothing() {
        let git = FakeInvoker::new().on(
            &numstat_args("abc"),
            "5\t2\tREADME.md\n-\t-\tlogo.png\n",
        );
        let stat = ChangeStatAggregator::new(&git)
            .numstat(Path::new("/repo"), "abc")
            .unwrap();
        assert_eq!(stat, ChangeStat::new(5, 2));
    }

    #[test]
    fn empty_commit_is_zero() {
        let git = FakeInvoker::new().on(&numstat_args("abc"), "");
        let stat = ChangeStatAggregator::new(&git)
            .numstat(Path::new("/repo"), "abc")
            .unwrap();
        assert_eq!(stat, ChangeStat::default());
    }

    #[test]
    fn garbled_line_is_an_error() {
        let git = FakeInvoker::new().on(&numstat_args("abc"), "five\t2\tREADME.md\n");
        let err = ChangeStatAggregator::new(&git)
            .numstat(Path::new("/repo"), "abc")
            .unwrap_err();
        assert!(matches!(err, GitError::MalformedStatLine(_)));
    }

    #[test]
    fn half_binary_sentinel_is_an_error() {
        let git = FakeInvoker::new().on(&numstat_args("abc"), "-\t3\tweird\n");
        let err = ChangeStatAggregator::new(&git)
            .numstat(Path::new("/repo"), "abc")
            .unwrap_err();
        assert!(matches!(err, GitError::MalformedStatLine(_)));
    }

    #[test]
    fn addition_is_order_independent() {
        let stats = [
            ChangeStat::new(1, 2),
            ChangeStat::new(0, 0),
            ChangeStat::new(7, 3),
        ];
        let forward: ChangeStat = stats.iter().copied().sum();
        let backward: ChangeStat = stats.iter().rev().copied().sum();
        assert_eq!(forward, backward);
        assert_eq!(forward, ChangeStat::new(8, 5));
    }

    #[test]
    fn many_preserves_input_order() {
        let git = FakeInvoker::new()
            .on(&numstat_args("aaa"), "1\t0\ta\n")
            .on(&numstat_args("bbb"), "0\t2\tb\n");
        let stats = ChangeStatAggregator::new(&git)
            .numstat_many(Path::new("/repo"), &["aaa", "bbb"])
            .unwrap();
        assert_eq!(
            stats,
            vec![
                ("aaa".to_string(), ChangeStat::new(1, 0)),
                ("bbb".to_string(), ChangeStat::new(0, 2)),
            ]
        );
    }
}
