// src/batch/orchestrator.rs

//! The run lifecycle: spawn one worker per target, join them all, merge.

use std::sync::Arc;

use anyhow::anyhow;
use tracing::{debug, info};

use crate::batch::cancel::CancelToken;
use crate::batch::report::RunSummary;
use crate::batch::worker::run_loop;
use crate::config::BatchConfig;
use crate::errors::Result;
use crate::exec::CommandRunner;

/// Owns a full batch run.
///
/// Spawns exactly one tokio task per configured target, with no staggering, no
/// internal cap on simultaneous processes. Keeping the target count within
/// the host's CPU/process budget is the operator's job (the config file
/// says as much next to `targets`).
pub struct Orchestrator {
    config: Arc<BatchConfig>,
    runner: Arc<dyn CommandRunner>,
    cancel: CancelToken,
}

impl Orchestrator {
    /// `config` is already validated by construction (`BatchConfig` can
    /// only be built through `TryFrom<RawBatchFile>`), so no worker can be
    /// spawned from an invalid configuration.
    pub fn new(
        config: BatchConfig,
        runner: Arc<dyn CommandRunner>,
        cancel: CancelToken,
    ) -> Self {
        Self {
            config: Arc::new(config),
            runner,
            cancel,
        }
    }

    /// Run the whole batch and block until every worker has reached a
    /// terminal state (completed, cancelled or fatally aborted). One
    /// worker's failure never short-circuits the others.
    pub async fn run(self) -> Result<RunSummary> {
        info!(
            targets = self.config.targets.len(),
            start = self.config.range.start,
            end = self.config.range.end,
            "starting batch run"
        );

        let mut handles = Vec::with_capacity(self.config.targets.len());
        for target in self.config.targets.iter().cloned() {
            debug!(path = %target, "spawning worker");
            let config = Arc::clone(&self.config);
            let runner = Arc::clone(&self.runner);
            let cancel = self.cancel.clone();
            handles.push(tokio::spawn(run_loop(target, config, runner, cancel)));
        }

        // Join barrier: await every worker, in spawn order. Awaiting
        // sequentially still waits for all of them; workers keep running
        // concurrently regardless of the order we join in.
        let mut reports = Vec::with_capacity(handles.len());
        for handle in handles {
            let report = handle
                .await
                .map_err(|e| anyhow!("worker task failed to join: {e}"))?;
            reports.push(report);
        }

        let summary = RunSummary::from_reports(reports);
        info!(
            targets = summary.per_target.len(),
            failures = summary.failures.len(),
            complete = summary.all_completed(),
            "batch run finished"
        );
        Ok(summary)
    }
}
