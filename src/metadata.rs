//! Single-value commit facts, modified-file lists, and tag resolution.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::encoding::{DecodedText, FallbackReader};
use crate::error::{GitError, Result};
use crate::history::parse_date;

/// Metadata of one commit.
///
/// `lossy` is set when the author name or message required lossy decoding;
/// the record is usable but not byte-faithful.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub hash: String,
    pub author: String,
    pub author_date: DateTime<FixedOffset>,
    pub commit_date: DateTime<FixedOffset>,
    pub message: String,
    pub lossy: bool,
}

/// One tag, resolved to the commit it ultimately points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    pub tag_name: String,
    pub target_hash: String,
}

/// All tags of a repository, dereferenced to commit hashes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagIndex {
    pub records: Vec<TagRecord>,
}

impl TagIndex {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Target hashes, in ref order.
    pub fn hashes(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.target_hash.as_str()).collect()
    }

    /// Tag names, in ref order.
    pub fn names(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.tag_name.as_str()).collect()
    }

    /// Hash-to-tag map. When several tags target one commit the last in
    /// ref order wins.
    pub fn by_hash(&self) -> HashMap<&str, &str> {
        self.records
            .iter()
            .map(|r| (r.target_hash.as_str(), r.tag_name.as_str()))
            .collect()
    }
}

/// Fetches single-value facts about commits and tags.
///
/// Author names and messages are free text in arbitrary encodings and go
/// through the fallback reader; dates, hashes, and paths are fetched with
/// strict decoding.
pub struct MetadataRetriever<'a> {
    reader: FallbackReader<'a>,
}

impl<'a> MetadataRetriever<'a> {
    pub fn new(reader: FallbackReader<'a>) -> Self {
        Self { reader }
    }

    /// Author date of a commit, formatted with its UTC offset
    /// (`YYYY-MM-DD HH:MM:SS ±HHMM`).
    pub fn author_date(&self, repo: &Path, commit_hash: &str) -> Result<String> {
        self.single_line(repo, &["show", commit_hash, "-s", "--format=%ai"])
    }

    /// Committer date of a commit, same format as [`Self::author_date`].
    /// Differs from the author date after rebase or amend.
    pub fn commit_date(&self, repo: &Path, commit_hash: &str) -> Result<String> {
        self.single_line(repo, &["show", commit_hash, "-s", "--format=%ci"])
    }

    /// Author display name; first line only.
    pub fn author(&self, repo: &Path, commit_hash: &str) -> Result<DecodedText> {
        let decoded = self.reader.read_text(
            repo,
            &["show", commit_hash, "-s", "--format=%an"],
            commit_hash,
        )?;
        Ok(DecodedText {
            text: first_line(&decoded.text).to_string(),
            lossy: decoded.lossy,
        })
    }

    /// Full commit message, lines re-joined with `\n`.
    pub fn message(&self, repo: &Path, commit_hash: &str) -> Result<DecodedText> {
        let decoded = self.reader.read_text(
            repo,
            &["log", "--format=%B", "-n", "1", commit_hash],
            commit_hash,
        )?;
        Ok(DecodedText {
            text: decoded.text.lines().collect::<Vec<_>>().join("\n"),
            lossy: decoded.lossy,
        })
    }

    /// Assemble the full metadata record for one commit.
    pub fn commit(&self, repo: &Path, commit_hash: &str) -> Result<CommitRecord> {
        let author = self.author(repo, commit_hash)?;
        let message = self.message(repo, commit_hash)?;
        let author_date = parse_date(&self.author_date(repo, commit_hash)?)?;
        let commit_date = parse_date(&self.commit_date(repo, commit_hash)?)?;
        Ok(CommitRecord {
            hash: commit_hash.to_string(),
            lossy: author.lossy || message.lossy,
            author: author.text,
            author_date,
            commit_date,
            message: message.text,
        })
    }

    /// Paths added, copied, modified, renamed, retyped, unmerged, or of
    /// unknown status in a commit. Deletions are excluded by design:
    /// callers reconstructing state handle them via the revision diff.
    pub fn modified_files(&self, repo: &Path, commit_hash: &str) -> Result<Vec<String>> {
        let raw = self.reader.invoker().run_utf8(
            repo,
            &[
                "diff-tree",
                "--no-commit-id",
                "--name-only",
                "-r",
                commit_hash,
                "--diff-filter=ACMRTUX",
            ],
        )?;
        Ok(raw
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| line.to_string())
            .collect())
    }

    /// Every tag, dereferenced to the commit it points at.
    ///
    /// `show-ref --dereference` emits a plain row per tag plus a `^{}`
    /// row for annotated tags; the dereferenced row wins, so annotated
    /// and lightweight tags both resolve to commits. Rows that do not
    /// parse are skipped. A repository without tags yields an empty
    /// index (show-ref signals that with exit status 1).
    pub fn all_tags(&self, repo: &Path) -> Result<TagIndex> {
        let raw = match self
            .reader
            .invoker()
            .run_utf8(repo, &["show-ref", "--dereference", "--tags"])
        {
            Ok(raw) => raw,
            Err(GitError::CommandFailed {
                status: Some(1),
                stderr,
            }) if stderr.is_empty() => return Ok(TagIndex::default()),
            Err(err) => return Err(err),
        };

        let mut records: Vec<TagRecord> = Vec::new();
        for line in raw.lines() {
            let mut fields = line.split_whitespace();
            let (Some(hash), Some(refname), None) = (fields.next(), fields.next(), fields.next())
            else {
                continue;
            };
            let Some(name) = refname.strip_prefix("refs/tags/") else {
                continue;
            };
            if let Some(base) = name.strip_suffix("^{}") {
                // Dereferenced row for an annotated tag; replace the tag
                // object hash from the plain row with the commit hash.
                match records.iter_mut().rev().find(|r| r.tag_name == base) {
                    Some(record) => record.target_hash = hash.to_string(),
                    None => records.push(TagRecord {
                        tag_name: base.to_string(),
                        target_hash: hash.to_string(),
                    }),
                }
            } else {
                records.push(TagRecord {
                    tag_name: name.to_string(),
                    target_hash: hash.to_string(),
                });
            }
        }
        Ok(TagIndex { records })
    }

    /// Tag names matching a glob pattern (e.g. `*.*.*`); git does the
    /// matching.
    pub fn tags_matching(&self, repo: &Path, pattern: &str) -> Result<Vec<String>> {
        let raw = self
            .reader
            .invoker()
            .run_utf8(repo, &["tag", "--list", pattern])?;
        Ok(raw
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| line.to_string())
            .collect())
    }

    fn single_line(&self, repo: &Path, args: &[&str]) -> Result<String> {
        let raw = self.reader.invoker().run_utf8(repo, args)?;
        Ok(first_line(&raw).to_string())
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}
