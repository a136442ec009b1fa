//! Test doubles shared across unit tests.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{GitError, Result};
use crate::invoker::GitInvoker;

/// A [`GitInvoker`] returning canned bytes per argument vector.
///
/// Unmatched invocations fail like git does on a bad revision: non-zero
/// exit with a fatal message on stderr.
pub(crate) struct FakeInvoker {
    responses: HashMap<Vec<String>, Vec<u8>>,
    failures: HashMap<Vec<String>, (i32, String)>,
}

fn key_of(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}

impl FakeInvoker {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            failures: HashMap::new(),
        }
    }

    pub fn on(mut self, args: &[&str], output: impl Into<Vec<u8>>) -> Self {
        self.responses.insert(key_of(args), output.into());
        self
    }

    pub fn failing(mut self, args: &[&str], status: i32, stderr: &str) -> Self {
        self.failures.insert(key_of(args), (status, stderr.to_string()));
        self
    }
}

impl GitInvoker for FakeInvoker {
    fn run(&self, _repo: &Path, args: &[&str]) -> Result<Vec<u8>> {
        let key = key_of(args);
        if let Some((status, stderr)) = self.failures.get(&key) {
            return Err(GitError::CommandFailed {
                status: Some(*status),
                stderr: stderr.clone(),
            });
        }
        self.responses
            .get(&key)
            .cloned()
            .ok_or_else(|| GitError::CommandFailed {
                status: Some(128),
                stderr: format!("fatal: no canned output for `git {}`", args.join(" ")),
            })
    }
}
