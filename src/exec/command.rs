// src/exec/command.rs

//! Production command runner that shells out once per invocation.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::config::TargetPath;
use crate::exec::backend::{CommandRunner, ExecError, Invocation, InvocationStatus};

/// Runs each rendered command line through the platform shell.
///
/// stdout/stderr are inherited, not captured: subprocess output passes
/// through to the orchestrator's own streams, interleaved with the workers'
/// progress lines. Only the exit status enters the data model.
pub struct ShellRunner {
    /// Upper bound on one invocation's wall-clock time. `None` waits
    /// forever, which matches the historical behaviour of the batch scripts
    /// this replaces.
    invocation_timeout: Option<Duration>,
}

impl ShellRunner {
    pub fn new(invocation_timeout: Option<Duration>) -> Self {
        Self { invocation_timeout }
    }
}

impl CommandRunner for ShellRunner {
    fn probe_target(&self, target: &TargetPath) -> Result<(), ExecError> {
        if Path::new(target.as_str()).exists() {
            Ok(())
        } else {
            Err(ExecError::TargetMissing(target.clone()))
        }
    }

    fn run(
        &self,
        invocation: Invocation,
    ) -> Pin<Box<dyn Future<Output = Result<InvocationStatus, ExecError>> + Send + '_>> {
        Box::pin(async move {
            info!(
                path = %invocation.target,
                branch_index = invocation.branch_index,
                cmd = %invocation.command,
                "starting invocation process"
            );

            // Build a shell command appropriate for the platform.
            let mut cmd = if cfg!(windows) {
                let mut c = Command::new("cmd");
                c.arg("/C").arg(&invocation.command);
                c
            } else {
                let mut c = Command::new("sh");
                c.arg("-c").arg(&invocation.command);
                c
            };

            cmd.stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .kill_on_drop(true);

            let mut child = cmd.spawn().map_err(|source| ExecError::SpawnFailed {
                command: invocation.command.clone(),
                source,
            })?;

            let status = match self.invocation_timeout {
                None => child.wait().await.map_err(|source| ExecError::Wait {
                    command: invocation.command.clone(),
                    source,
                })?,
                Some(limit) => match timeout(limit, child.wait()).await {
                    Ok(waited) => waited.map_err(|source| ExecError::Wait {
                        command: invocation.command.clone(),
                        source,
                    })?,
                    Err(_elapsed) => {
                        warn!(
                            path = %invocation.target,
                            branch_index = invocation.branch_index,
                            timeout_secs = limit.as_secs(),
                            "invocation timed out; killing process"
                        );
                        if let Err(e) = child.kill().await {
                            warn!(
                                path = %invocation.target,
                                branch_index = invocation.branch_index,
                                error = %e,
                                "failed to kill timed-out process"
                            );
                        }
                        return Ok(InvocationStatus::TimedOut);
                    }
                },
            };

            let code = status.code().unwrap_or(-1);
            info!(
                path = %invocation.target,
                branch_index = invocation.branch_index,
                exit_code = code,
                success = status.success(),
                "invocation process exited"
            );

            Ok(InvocationStatus::Exited(code))
        })
    }
}
