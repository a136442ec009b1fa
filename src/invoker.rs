//! Subprocess execution of git commands.
//!
//! Every other module in this crate talks to git through the [`GitInvoker`]
//! trait, so the parsing and aggregation layers can be tested against a
//! fake invoker returning canned bytes instead of a real repository.
//!
//! [`SystemGit`] is the production implementation: it spawns
//! `git -C <repo> <args...>`, drains stdout and stderr on dedicated
//! threads, and enforces a bounded per-invocation timeout. Failed
//! invocations are never retried.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::MinerConfig;
use crate::error::{GitError, Result};

/// Default per-invocation timeout. Large diffs on big repositories can
/// legitimately take a while; this only guards against a hung subprocess.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Capability to run a git subcommand in a repository and capture its
/// standard output as raw bytes.
///
/// Implementations must be usable from multiple threads: bulk operations
/// fan independent read-only queries out with rayon.
pub trait GitInvoker: Send + Sync {
    /// Run `git <args...>` against the repository at `repo` and return
    /// captured stdout. Non-zero exit is an error, never empty output.
    fn run(&self, repo: &Path, args: &[&str]) -> Result<Vec<u8>>;

    /// Run and decode stdout as strict UTF-8.
    ///
    /// For machine-oriented listings (hash lists, numstat, show-ref) which
    /// are ASCII by construction; anything else indicates garbled output
    /// and surfaces as [`GitError::Output`]. Free-text fields (messages,
    /// author names) go through [`crate::encoding::FallbackReader`]
    /// instead.
    fn run_utf8(&self, repo: &Path, args: &[&str]) -> Result<String> {
        let bytes = self.run(repo, args)?;
        String::from_utf8(bytes)
            .map_err(|_| GitError::Output(format!("non-UTF-8 output from `git {}`", args.join(" "))))
    }
}

/// Runs the real `git` executable.
#[derive(Debug, Clone)]
pub struct SystemGit {
    binary: String,
    timeout: Option<Duration>,
}

impl Default for SystemGit {
    fn default() -> Self {
        Self {
            binary: "git".to_string(),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

impl SystemGit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &MinerConfig) -> Self {
        Self {
            binary: config.git_binary.clone(),
            timeout: config.timeout(),
        }
    }

    /// Override the git executable (e.g. an absolute path).
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Override the per-invocation timeout. `None` blocks indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn wait(&self, child: &mut Child, args: &[&str]) -> Result<ExitStatus> {
        let Some(timeout) = self.timeout else {
            return Ok(child.wait()?);
        };
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                child.kill().ok();
                child.wait().ok();
                return Err(GitError::CommandFailed {
                    status: None,
                    stderr: format!(
                        "`git {}` timed out after {}s",
                        args.join(" "),
                        timeout.as_secs()
                    ),
                });
            }
            thread::sleep(Duration::from_millis(10));
        }
    }
}

/// Read a child pipe to the end on its own thread so a full pipe buffer
/// cannot deadlock against `wait`.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf).ok();
        }
        buf
    })
}

impl GitInvoker for SystemGit {
    fn run(&self, repo: &Path, args: &[&str]) -> Result<Vec<u8>> {
        // `.git` is a directory in a normal checkout and a file in a
        // linked worktree; either counts.
        if !repo.join(".git").exists() {
            return Err(GitError::RepositoryNotFound(repo.to_path_buf()));
        }

        debug!(repo = %repo.display(), ?args, "running git");

        let mut child = Command::new(&self.binary)
            .arg("-C")
            .arg(repo)
            .arg("--no-pager")
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = self.wait(&mut child, args)?;

        let out = stdout.join().unwrap_or_default();
        let err = stderr.join().unwrap_or_default();

        if status.success() {
            Ok(out)
        } else {
            Err(GitError::CommandFailed {
                status: status.code(),
                stderr: String::from_utf8_lossy(&err).trim().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_repository_path() {
        let dir = tempfile::tempdir().unwrap();
        let git = SystemGit::new();
        let err = git.run(dir.path(), &["status"]).unwrap_err();
        assert!(matches!(err, GitError::RepositoryNotFound(_)));
    }

    #[test]
    fn nonzero_exit_carries_status_and_stderr() {
        let dir = tempfile::tempdir().unwrap();
        std::process::Command::new("git")
            .arg("-C")
            .arg(dir.path())
            .args(["init", "--quiet"])
            .status()
            .unwrap();

        let git = SystemGit::new();
        let err = git
            .run(dir.path(), &["rev-parse", "no-such-ref-anywhere"])
            .unwrap_err();
        match err {
            GitError::CommandFailed { status, stderr } => {
                assert!(status.is_some());
                assert!(!stderr.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
