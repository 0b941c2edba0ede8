use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use branchdrive::config::TargetPath;
use branchdrive::exec::{CommandRunner, ExecError, Invocation, InvocationStatus};

/// A fake runner that:
/// - records every invocation it was asked to run
/// - completes after an optional simulated delay, without spawning anything
/// - can be programmed with per-(target, index) exit codes, timeouts,
///   spawn failures and missing targets.
///
/// Recording order across workers is scheduler-dependent; tests should
/// assert per-target order via [`FakeRunner::commands_for`], not the global
/// list.
pub struct FakeRunner {
    recorded: Arc<Mutex<Vec<Invocation>>>,
    exit_codes: HashMap<(String, i64), i32>,
    target_delays: HashMap<String, Duration>,
    timeouts_at: HashSet<(String, i64)>,
    spawn_failures_at: HashSet<(String, i64)>,
    missing_targets: HashSet<String>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self {
            recorded: Arc::new(Mutex::new(Vec::new())),
            exit_codes: HashMap::new(),
            target_delays: HashMap::new(),
            timeouts_at: HashSet::new(),
            spawn_failures_at: HashSet::new(),
            missing_targets: HashSet::new(),
        }
    }

    /// Simulate a non-zero (or any specific) exit code for one iteration.
    pub fn with_exit_code(mut self, target: &str, index: i64, code: i32) -> Self {
        self.exit_codes.insert((target.to_string(), index), code);
        self
    }

    /// Simulate per-invocation duration for one target.
    pub fn with_target_delay(mut self, target: &str, delay: Duration) -> Self {
        self.target_delays.insert(target.to_string(), delay);
        self
    }

    /// Simulate a timed-out invocation at one iteration.
    pub fn with_timeout_at(mut self, target: &str, index: i64) -> Self {
        self.timeouts_at.insert((target.to_string(), index));
        self
    }

    /// Simulate a worker-fatal spawn failure at one iteration.
    pub fn with_spawn_failure_at(mut self, target: &str, index: i64) -> Self {
        self.spawn_failures_at.insert((target.to_string(), index));
        self
    }

    /// Make `probe_target` fail for this target, as if the path vanished.
    pub fn with_missing_target(mut self, target: &str) -> Self {
        self.missing_targets.insert(target.to_string());
        self
    }

    /// Every invocation recorded so far, across all workers.
    pub fn recorded(&self) -> Vec<Invocation> {
        self.recorded.lock().unwrap().clone()
    }

    /// Rendered command lines for one target, in execution order.
    pub fn commands_for(&self, target: &str) -> Vec<String> {
        self.recorded
            .lock()
            .unwrap()
            .iter()
            .filter(|inv| inv.target.as_str() == target)
            .map(|inv| inv.command.clone())
            .collect()
    }
}

impl Default for FakeRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for FakeRunner {
    fn probe_target(&self, target: &TargetPath) -> Result<(), ExecError> {
        if self.missing_targets.contains(target.as_str()) {
            Err(ExecError::TargetMissing(target.clone()))
        } else {
            Ok(())
        }
    }

    fn run(
        &self,
        invocation: Invocation,
    ) -> Pin<Box<dyn Future<Output = Result<InvocationStatus, ExecError>> + Send + '_>> {
        let key = (invocation.target.as_str().to_string(), invocation.branch_index);
        let delay = self.target_delays.get(invocation.target.as_str()).copied();

        Box::pin(async move {
            {
                let mut guard = self.recorded.lock().unwrap();
                guard.push(invocation.clone());
            }

            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            if self.spawn_failures_at.contains(&key) {
                return Err(ExecError::SpawnFailed {
                    command: invocation.command,
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "simulated spawn failure",
                    ),
                });
            }

            if self.timeouts_at.contains(&key) {
                return Ok(InvocationStatus::TimedOut);
            }

            let code = self.exit_codes.get(&key).copied().unwrap_or(0);
            Ok(InvocationStatus::Exited(code))
        })
    }
}
