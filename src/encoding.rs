//! UTF-8 decoding with lossy fallback.
//!
//! Commit messages, author names, and file contents are arbitrary bytes as
//! far as git is concerned. A bulk history scan must not abort because one
//! commit from 2009 has a Latin-1 author name, so decoding degrades instead
//! of failing: strict UTF-8 first, then replacement-character decoding with
//! the result explicitly tagged as lossy. Affected subjects can be recorded
//! with an injected [`QuarantineSink`] for later inspection; that recording
//! is best-effort and never fails the caller.

use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::Result;
use crate::invoker::GitInvoker;

/// Decoded text, tagged with whether the bytes survived strict UTF-8.
///
/// `lossy` means undecodable sequences were replaced with U+FFFD; the text
/// is usable but not byte-faithful to the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub lossy: bool,
}

impl DecodedText {
    /// Consume, keeping only the text.
    pub fn into_text(self) -> String {
        self.text
    }
}

/// Decode bytes as UTF-8, falling back to replacement-character decoding.
pub fn decode(bytes: Vec<u8>) -> DecodedText {
    match String::from_utf8(bytes) {
        Ok(text) => DecodedText { text, lossy: false },
        Err(err) => DecodedText {
            text: String::from_utf8_lossy(err.as_bytes()).into_owned(),
            lossy: true,
        },
    }
}

/// Records subjects (commit hashes) whose output required lossy decoding.
///
/// Implementations must absorb their own failures: quarantine is a side
/// channel, not part of any operation's contract.
pub trait QuarantineSink: Send + Sync {
    fn record(&self, subject: &str, detail: &str);
}

/// Appends quarantine records to a JSON-lines file.
#[derive(Debug, Clone)]
pub struct FileQuarantine {
    path: PathBuf,
}

#[derive(Serialize)]
struct QuarantineEntry<'a> {
    subject: &'a str,
    detail: &'a str,
}

impl FileQuarantine {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl QuarantineSink for FileQuarantine {
    fn record(&self, subject: &str, detail: &str) {
        let Ok(line) = serde_json::to_string(&QuarantineEntry { subject, detail }) else {
            return;
        };
        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| writeln!(file, "{line}"));
        if let Err(err) = written {
            warn!(path = %self.path.display(), %err, "failed to write quarantine record");
        }
    }
}

/// Invoker wrapper for operations whose output may not be valid UTF-8.
#[derive(Clone, Copy)]
pub struct FallbackReader<'a> {
    git: &'a dyn GitInvoker,
    quarantine: Option<&'a dyn QuarantineSink>,
}

impl<'a> FallbackReader<'a> {
    pub fn new(git: &'a dyn GitInvoker) -> Self {
        Self {
            git,
            quarantine: None,
        }
    }

    pub fn with_quarantine(mut self, sink: &'a dyn QuarantineSink) -> Self {
        self.quarantine = Some(sink);
        self
    }

    /// The wrapped invoker, for sibling operations with clean output.
    pub fn invoker(&self) -> &'a dyn GitInvoker {
        self.git
    }

    /// Run a git command and decode stdout, degrading to lossy decoding
    /// instead of failing. `subject` identifies what was being read
    /// (a commit hash) in logs and quarantine records.
    pub fn read_text(&self, repo: &Path, args: &[&str], subject: &str) -> Result<DecodedText> {
        let bytes = self.git.run(repo, args)?;
        let decoded = decode(bytes);
        if decoded.lossy {
            warn!(subject, "git output was not valid UTF-8, decoded lossily");
            if let Some(sink) = self.quarantine {
                sink.record(subject, &args.join(" "));
            }
        }
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FakeInvoker;
    use std::sync::Mutex;

    #[test]
    fn clean_bytes_decode_strict() {
        let decoded = decode(b"hello".to_vec());
        assert_eq!(decoded.text, "hello");
        assert!(!decoded.lossy);
    }

    #[test]
    fn invalid_bytes_decode_lossy() {
        let decoded = decode(vec![b'a', 0xFF, b'b']);
        assert_eq!(decoded.text, "a\u{FFFD}b");
        assert!(decoded.lossy);
    }

    struct CapturingSink(Mutex<Vec<String>>);

    impl QuarantineSink for CapturingSink {
        fn record(&self, subject: &str, _detail: &str) {
            self.0.lock().unwrap().push(subject.to_string());
        }
    }

    #[test]
    fn lossy_read_records_subject() {
        let git = FakeInvoker::new().on(&["show", "abc", "-s", "--format=%an"], vec![0xE9, b'\n']);
        let sink = CapturingSink(Mutex::new(Vec::new()));
        let reader = FallbackReader::new(&git).with_quarantine(&sink);

        let decoded = reader
            .read_text(Path::new("/repo"), &["show", "abc", "-s", "--format=%an"], "abc")
            .unwrap();
        assert!(decoded.lossy);
        assert_eq!(*sink.0.lock().unwrap(), vec!["abc".to_string()]);
    }

    #[test]
    fn clean_read_skips_quarantine() {
        let git = FakeInvoker::new().on(&["log"], b"fine\n".to_vec());
        let sink = CapturingSink(Mutex::new(Vec::new()));
        let reader = FallbackReader::new(&git).with_quarantine(&sink);

        let decoded = reader.read_text(Path::new("/repo"), &["log"], "x").unwrap();
        assert!(!decoded.lossy);
        assert!(sink.0.lock().unwrap().is_empty());
    }

    #[test]
    fn file_quarantine_appends_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quarantine.jsonl");
        let sink = FileQuarantine::new(&path);
        sink.record("abc123", "show abc123");
        sink.record("def456", "show def456");

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["subject"], "abc123");
    }

    #[test]
    fn unwritable_quarantine_never_fails_the_caller() {
        let dir = tempfile::tempdir().unwrap();
        // Parent directory does not exist, so the append open fails.
        let sink = FileQuarantine::new(dir.path().join("missing").join("q.jsonl"));
        sink.record("abc123", "show abc123");
    }

    #[test]
    fn lossy_read_still_returns_text_without_a_sink() {
        let git = FakeInvoker::new().on(&["show", "abc"], vec![b'x', 0xFF]);
        let reader = FallbackReader::new(&git);
        let decoded = reader
            .read_text(Path::new("/repo"), &["show", "abc"], "abc")
            .unwrap();
        assert!(decoded.lossy);
        assert_eq!(decoded.text, "x\u{FFFD}");
    }
}
