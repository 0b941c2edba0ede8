// src/batch/mod.rs

pub mod cancel;
pub mod orchestrator;
pub mod report;
pub mod worker;

pub use cancel::{cancel_pair, CancelHandle, CancelToken};
pub use orchestrator::Orchestrator;
pub use report::{
    print_summary, Failure, FailureCause, InvocationResult, RunSummary, WorkerOutcome,
    WorkerReport,
};
pub use worker::run_loop;
