// src/exec/backend.rs

//! Pluggable command-runner abstraction.
//!
//! Workers talk to a `CommandRunner` instead of spawning processes directly.
//! This makes it easy to swap in a fake runner in tests while keeping the
//! production implementation in [`command`](super::command).
//!
//! - [`ShellRunner`](super::ShellRunner) is the default implementation used
//!   by `branchdrive`. It shells out once per invocation and reports the
//!   exit status.
//! - Tests can provide their own `CommandRunner` that records rendered
//!   command lines and simulates exit codes and durations.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::config::TargetPath;

/// One concrete invocation, fully rendered from the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub target: TargetPath,
    pub branch_index: i64,
    pub command: String,
}

/// How an invocation ended, as seen by the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationStatus {
    /// The process ran to completion with this exit code (`-1` when the
    /// platform reports no code, e.g. killed by a signal).
    Exited(i32),
    /// The configured per-invocation timeout elapsed and the process was
    /// killed.
    TimedOut,
}

/// Errors the runner itself can hit. These are worker-fatal: the remaining
/// iterations of that worker are meaningless, while other workers proceed
/// unaffected.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("target path does not exist: {0}")]
    TargetMissing(TargetPath),

    #[error("failed to spawn shell for '{command}': {source}")]
    SpawnFailed {
        command: String,
        source: std::io::Error,
    },

    #[error("waiting for command '{command}': {source}")]
    Wait {
        command: String,
        source: std::io::Error,
    },
}

/// Trait abstracting how invocations are executed.
///
/// Production code uses [`ShellRunner`](super::ShellRunner); tests provide
/// implementations that don't spawn real processes.
pub trait CommandRunner: Send + Sync {
    /// Verify the target is usable before the worker enters its loop.
    ///
    /// The production runner checks existence on disk; fakes can simulate a
    /// vanished target.
    fn probe_target(&self, target: &TargetPath) -> Result<(), ExecError>;

    /// Execute one invocation and report how it ended.
    ///
    /// The implementation is free to:
    /// - spawn an OS process and block on it (production)
    /// - simulate completion after a delay (tests)
    fn run(
        &self,
        invocation: Invocation,
    ) -> Pin<Box<dyn Future<Output = Result<InvocationStatus, ExecError>> + Send + '_>>;
}
