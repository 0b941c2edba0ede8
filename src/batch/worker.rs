// src/batch/worker.rs

//! The sequential per-target command loop.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};

use crate::batch::cancel::CancelToken;
use crate::batch::report::{
    Failure, FailureCause, InvocationResult, WorkerOutcome, WorkerReport,
};
use crate::config::{BatchConfig, TargetPath};
use crate::exec::{CommandRunner, ExecError, Invocation, InvocationStatus};
use crate::template;

/// Drive one target through the whole branch range, strictly sequentially.
///
/// Iterations run in increasing branch-index order, one at a time: every
/// invocation may mutate target-local state the next one depends on, so
/// there is no pipelining within a worker.
///
/// A non-zero exit status (or a timeout) is recorded and the loop keeps
/// driving the remaining indices. Only worker-fatal conditions (a missing
/// target path, a shell that cannot be spawned) stop this worker; other
/// workers are unaffected.
pub async fn run_loop(
    target: TargetPath,
    config: Arc<BatchConfig>,
    runner: Arc<dyn CommandRunner>,
    cancel: CancelToken,
) -> WorkerReport {
    if let Err(err) = runner.probe_target(&target) {
        error!(path = %target, error = %err, "worker aborting before loop start");
        let cause = fatal_cause(&err);
        return WorkerReport {
            failures: vec![Failure {
                target: target.clone(),
                branch_index: config.range.start,
                cause: cause.clone(),
            }],
            outcome: WorkerOutcome::Fatal {
                at_index: config.range.start,
                cause,
            },
            target,
            results: Vec::new(),
        };
    }

    // Capacity hint only; a valid range can be far larger than any
    // allocation (or any realistic run), so it is clamped.
    let mut results = Vec::with_capacity(config.range.count().min(1024) as usize);
    let mut failures = Vec::new();

    for index in config.range.iter() {
        // Checked between iterations only; an in-flight command is never
        // preempted.
        if cancel.is_cancelled() {
            info!(path = %target, next_index = index, "worker stopping on cancellation");
            return WorkerReport {
                target,
                results,
                failures,
                outcome: WorkerOutcome::Cancelled { next_index: index },
            };
        }

        println!("{}", progress_line(index, config.range.end, &target));

        let command =
            template::render(&config.template, target.as_str(), index, &config.params);
        let started = Instant::now();

        let status = runner
            .run(Invocation {
                target: target.clone(),
                branch_index: index,
                command,
            })
            .await;

        match status {
            Ok(InvocationStatus::Exited(code)) => {
                results.push(InvocationResult {
                    target: target.clone(),
                    branch_index: index,
                    exit_status: code,
                    duration: started.elapsed(),
                });
                if code != 0 {
                    warn!(path = %target, branch_index = index, exit_code = code, "invocation failed");
                    failures.push(Failure {
                        target: target.clone(),
                        branch_index: index,
                        cause: FailureCause::NonZeroExit(code),
                    });
                }
            }
            Ok(InvocationStatus::TimedOut) => {
                results.push(InvocationResult {
                    target: target.clone(),
                    branch_index: index,
                    exit_status: -1,
                    duration: started.elapsed(),
                });
                failures.push(Failure {
                    target: target.clone(),
                    branch_index: index,
                    cause: FailureCause::TimedOut,
                });
            }
            Err(err) => {
                error!(path = %target, branch_index = index, error = %err, "worker-fatal execution error");
                let cause = fatal_cause(&err);
                failures.push(Failure {
                    target: target.clone(),
                    branch_index: index,
                    cause: cause.clone(),
                });
                return WorkerReport {
                    target,
                    results,
                    failures,
                    outcome: WorkerOutcome::Fatal {
                        at_index: index,
                        cause,
                    },
                };
            }
        }
    }

    info!(path = %target, invocations = results.len(), "worker completed full range");
    WorkerReport {
        target,
        results,
        failures,
        outcome: WorkerOutcome::Completed,
    }
}

/// The human-readable progress line emitted on stdout before each
/// invocation: `"<index>/<end> of <target>"`. Interleaved with subprocess
/// output, never machine-parsed.
pub fn progress_line(index: i64, end: i64, target: &TargetPath) -> String {
    format!("{}/{} of {}", index, end, target)
}

fn fatal_cause(err: &ExecError) -> FailureCause {
    match err {
        ExecError::TargetMissing(_) => FailureCause::TargetMissing,
        other => FailureCause::SpawnFailed(other.to_string()),
    }
}
