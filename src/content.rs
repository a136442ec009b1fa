//! File snapshots at a revision and sanitized raw history blobs.

use std::path::Path;

use crate::encoding::{DecodedText, FallbackReader};
use crate::error::{GitError, Result};
use crate::sanitize::sanitize;

/// Fetches file contents as of a commit and raw diff/show/blame output.
///
/// File snapshots are returned as decoded (possibly lossy) text, exactly
/// as stored. The blob operations (`show_commit`, `blame_file`,
/// `file_patch_log`, `log_all*`) are sanitized before they leave the
/// retriever: no `\r`, `\f`, or `\0` survives, regardless of source
/// encoding artifacts.
pub struct ContentRetriever<'a> {
    reader: FallbackReader<'a>,
}

impl<'a> ContentRetriever<'a> {
    pub fn new(reader: FallbackReader<'a>) -> Self {
        Self { reader }
    }

    /// Content of `path` as of `commit_hash`.
    ///
    /// A non-zero git exit means the path does not exist at that revision
    /// (or the revision itself is unknown) and surfaces as
    /// [`GitError::PathNotFoundAtRevision`].
    pub fn file_at_revision(
        &self,
        repo: &Path,
        commit_hash: &str,
        path: &str,
    ) -> Result<DecodedText> {
        let spec = format!("{commit_hash}:{path}");
        self.reader
            .read_text(repo, &["show", &spec], commit_hash)
            .map_err(|err| not_found(err, commit_hash, path))
    }

    /// Content of `path` immediately before `commit_hash`, i.e. as of its
    /// first parent (`<hash>^`). For a merge commit this is the first
    /// parent; callers needing another parent must pass that revision to
    /// [`Self::file_at_revision`] themselves.
    pub fn file_before_revision(
        &self,
        repo: &Path,
        commit_hash: &str,
        path: &str,
    ) -> Result<DecodedText> {
        let spec = format!("{commit_hash}^:{path}");
        self.reader
            .read_text(repo, &["show", &spec], commit_hash)
            .map_err(|err| not_found(err, commit_hash, path))
    }

    /// Full `git show` of a commit (metadata plus diff), sanitized.
    pub fn show_commit(&self, repo: &Path, commit_hash: &str) -> Result<String> {
        self.blob(repo, &["show", commit_hash], commit_hash)
    }

    /// `git show --unified=<n>` of a commit, sanitized. `context = 0`
    /// yields changed lines only.
    pub fn show_commit_with_context(
        &self,
        repo: &Path,
        commit_hash: &str,
        context: u32,
    ) -> Result<String> {
        let unified = format!("--unified={context}");
        self.blob(repo, &["show", &unified, commit_hash], commit_hash)
    }

    /// Line-by-line blame of `path` as of `commit_hash` (long hashes,
    /// original line numbers), sanitized. Requires the commit to exist
    /// and the path to be tracked there.
    pub fn blame_file(&self, repo: &Path, commit_hash: &str, path: &str) -> Result<String> {
        self.blob(repo, &["blame", "-l", "-n", commit_hash, "--", path], commit_hash)
            .map_err(|err| not_found(err, commit_hash, path))
    }

    /// Whole patch history of one file (`git log -p -- <path>`),
    /// sanitized.
    pub fn file_patch_log(&self, repo: &Path, path: &str) -> Result<String> {
        self.blob(repo, &["log", "-p", "--", path], path)
    }

    /// Full log of every ref in `--pretty=fuller` format (author and
    /// committer lines both), sanitized.
    pub fn log_all(&self, repo: &Path) -> Result<String> {
        self.blob(repo, &["log", "--all", "--pretty=fuller"], "log --all")
    }

    /// Same as [`Self::log_all`] with merge commits excluded.
    pub fn log_all_no_merges(&self, repo: &Path) -> Result<String> {
        self.blob(
            repo,
            &["log", "--all", "--pretty=fuller", "--no-merges"],
            "log --all --no-merges",
        )
    }

    fn blob(&self, repo: &Path, args: &[&str], subject: &str) -> Result<String> {
        let decoded = self.reader.read_text(repo, args, subject)?;
        Ok(sanitize(&decoded.text))
    }
}

/// Collapse a git exit failure into the typed not-found error. A failure
/// without an exit status (timeout, killed by signal) is not evidence
/// about the path and passes through, as do spawn failures and missing
/// repositories.
fn not_found(err: GitError, revision: &str, path: &str) -> GitError {
    match err {
        GitError::CommandFailed {
            status: Some(_), ..
        } => GitError::PathNotFoundAtRevision {
            revision: revision.to_string(),
            path: path.to_string(),
        },
        other => other,
    }
}
