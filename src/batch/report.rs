// src/batch/report.rs

//! Per-invocation results, per-worker reports and the final run summary.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::config::{BatchConfig, TargetPath};

/// Outcome of one external command execution.
///
/// Produced by each invocation, consumed only for the summary; never
/// persisted beyond the process lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationResult {
    pub target: TargetPath,
    pub branch_index: i64,
    /// Process exit code; `-1` when none was reported (signal, timeout).
    pub exit_status: i32,
    pub duration: Duration,
}

impl InvocationResult {
    pub fn is_success(&self) -> bool {
        self.exit_status == 0
    }
}

/// Why an iteration (or a whole worker) is counted as failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    /// The command ran but exited non-zero. Never aborts the worker loop.
    NonZeroExit(i32),
    /// The configured invocation timeout elapsed. Never aborts the loop.
    TimedOut,
    /// The shell itself could not be spawned or awaited. Worker-fatal.
    SpawnFailed(String),
    /// The target path is gone. Worker-fatal, detected before the loop.
    TargetMissing,
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCause::NonZeroExit(code) => write!(f, "exit code {}", code),
            FailureCause::TimedOut => write!(f, "invocation timed out"),
            FailureCause::SpawnFailed(msg) => write!(f, "spawn failed: {}", msg),
            FailureCause::TargetMissing => write!(f, "target path does not exist"),
        }
    }
}

/// One failed iteration, attributed to a target and branch index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub target: TargetPath,
    pub branch_index: i64,
    pub cause: FailureCause,
}

/// Terminal state of one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerOutcome {
    /// The worker drove its full branch range.
    Completed,
    /// Cancellation was observed between iterations; `next_index` is the
    /// first index that did not run.
    Cancelled { next_index: i64 },
    /// A worker-fatal condition stopped the loop at `at_index`.
    Fatal { at_index: i64, cause: FailureCause },
}

/// Everything one worker produced.
#[derive(Debug, Clone)]
pub struct WorkerReport {
    pub target: TargetPath,
    pub results: Vec<InvocationResult>,
    pub failures: Vec<Failure>,
    pub outcome: WorkerOutcome,
}

/// Aggregated outcome of a whole run, merged from all worker reports.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Per-target invocation results, in per-worker execution order.
    pub per_target: BTreeMap<TargetPath, Vec<InvocationResult>>,
    /// Every recorded failure across all targets.
    pub failures: Vec<Failure>,
    /// Terminal state of each worker.
    pub outcomes: BTreeMap<TargetPath, WorkerOutcome>,
}

impl RunSummary {
    pub fn from_reports(reports: Vec<WorkerReport>) -> Self {
        let mut per_target = BTreeMap::new();
        let mut failures = Vec::new();
        let mut outcomes = BTreeMap::new();

        for report in reports {
            failures.extend(report.failures);
            outcomes.insert(report.target.clone(), report.outcome);
            per_target.insert(report.target, report.results);
        }

        Self {
            per_target,
            failures,
            outcomes,
        }
    }

    /// True when every worker drove its full range, regardless of
    /// individual invocation exit statuses.
    pub fn all_completed(&self) -> bool {
        self.outcomes
            .values()
            .all(|o| matches!(o, WorkerOutcome::Completed))
    }

    fn failure_count(&self, target: &TargetPath) -> usize {
        self.failures.iter().filter(|f| &f.target == target).count()
    }
}

/// Print the final human-readable summary: per target, completed iteration
/// count and failure count. No retry of failed invocations happens here or
/// anywhere else.
pub fn print_summary(cfg: &BatchConfig, summary: &RunSummary) {
    println!("branchdrive run summary");

    let expected = cfg.range.count();
    for (target, results) in summary.per_target.iter() {
        let failed = summary.failure_count(target);
        print!(
            "  {}: {}/{} completed, {} failed",
            target,
            results.len(),
            expected,
            failed
        );
        match summary.outcomes.get(target) {
            Some(WorkerOutcome::Cancelled { next_index }) => {
                println!(" (cancelled before index {})", next_index);
            }
            Some(WorkerOutcome::Fatal { at_index, cause }) => {
                println!(" (aborted at index {}: {})", at_index, cause);
            }
            _ => println!(),
        }
    }

    let total: usize = summary.per_target.values().map(|r| r.len()).sum();
    println!(
        "  total: {} invocations across {} targets, {} failures",
        total,
        summary.per_target.len(),
        summary.failures.len()
    );
}
