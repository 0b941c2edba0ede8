// tests/worker_loop.rs

use std::error::Error;
use std::sync::Arc;

use branchdrive::batch::{cancel_pair, run_loop, FailureCause, WorkerOutcome};
use branchdrive::config::TargetPath;
use branchdrive::exec::CommandRunner;
use branchdrive_test_utils::builders::BatchConfigBuilder;
use branchdrive_test_utils::fake_runner::FakeRunner;
use branchdrive_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

fn single_target_config(start: i64, end: i64) -> branchdrive::config::BatchConfig {
    BatchConfigBuilder::new("scan --branch={branchIndex} --path={targetPath}")
        .target("/proj/a")
        .range(start, end)
        .build()
}

#[tokio::test]
async fn loop_produces_one_result_per_index_in_order() -> TestResult {
    init_tracing();

    let cfg = Arc::new(single_target_config(3, 7));
    let fake = Arc::new(FakeRunner::new());
    let runner: Arc<dyn CommandRunner> = fake.clone();
    let (_handle, token) = cancel_pair();

    let report = with_timeout(run_loop(
        TargetPath::from("/proj/a"),
        cfg,
        runner,
        token,
    ))
    .await;

    assert_eq!(report.outcome, WorkerOutcome::Completed);
    assert_eq!(report.results.len(), 5);

    let indices: Vec<i64> = report.results.iter().map(|r| r.branch_index).collect();
    assert_eq!(indices, vec![3, 4, 5, 6, 7]);
    assert!(report.results.iter().all(|r| r.is_success()));
    assert!(report.failures.is_empty());

    Ok(())
}

#[tokio::test]
async fn non_zero_exit_does_not_abort_remaining_iterations() -> TestResult {
    init_tracing();

    // 3rd of 5 iterations fails; 4 and 5 must still run.
    let cfg = Arc::new(single_target_config(1, 5));
    let fake = Arc::new(FakeRunner::new().with_exit_code("/proj/a", 3, 1));
    let runner: Arc<dyn CommandRunner> = fake.clone();
    let (_handle, token) = cancel_pair();

    let report = with_timeout(run_loop(
        TargetPath::from("/proj/a"),
        cfg,
        runner,
        token,
    ))
    .await;

    assert_eq!(report.outcome, WorkerOutcome::Completed);
    assert_eq!(report.results.len(), 5);
    assert_eq!(report.results[2].branch_index, 3);
    assert_eq!(report.results[2].exit_status, 1);
    assert!(!report.results[2].is_success());

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].branch_index, 3);
    assert_eq!(report.failures[0].cause, FailureCause::NonZeroExit(1));

    Ok(())
}

#[tokio::test]
async fn timed_out_invocation_is_recorded_and_loop_continues() -> TestResult {
    init_tracing();

    let cfg = Arc::new(single_target_config(1, 3));
    let fake = Arc::new(FakeRunner::new().with_timeout_at("/proj/a", 2));
    let runner: Arc<dyn CommandRunner> = fake.clone();
    let (_handle, token) = cancel_pair();

    let report = with_timeout(run_loop(
        TargetPath::from("/proj/a"),
        cfg,
        runner,
        token,
    ))
    .await;

    assert_eq!(report.outcome, WorkerOutcome::Completed);
    assert_eq!(report.results.len(), 3);
    assert_eq!(report.results[1].exit_status, -1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].cause, FailureCause::TimedOut);

    Ok(())
}

#[tokio::test]
async fn spawn_failure_aborts_only_remaining_iterations() -> TestResult {
    init_tracing();

    let cfg = Arc::new(single_target_config(1, 5));
    let fake = Arc::new(FakeRunner::new().with_spawn_failure_at("/proj/a", 2));
    let runner: Arc<dyn CommandRunner> = fake.clone();
    let (_handle, token) = cancel_pair();

    let report = with_timeout(run_loop(
        TargetPath::from("/proj/a"),
        cfg,
        runner,
        token,
    ))
    .await;

    // Iteration 1 completed; the fatal error at 2 stops the loop there.
    assert_eq!(report.results.len(), 1);
    match &report.outcome {
        WorkerOutcome::Fatal { at_index, cause } => {
            assert_eq!(*at_index, 2);
            assert!(matches!(cause, FailureCause::SpawnFailed(_)));
        }
        other => panic!("expected fatal outcome, got {other:?}"),
    }
    assert_eq!(fake.recorded().len(), 2);

    Ok(())
}

#[tokio::test]
async fn huge_valid_range_starts_without_allocating_for_it() -> TestResult {
    init_tracing();

    // start <= end holds, so this config is valid; the worker must not try
    // to pre-allocate room for the whole range. Cancelled up front, it
    // returns a clean report with zero results.
    let cfg = Arc::new(single_target_config(1, i64::MAX));
    let fake = Arc::new(FakeRunner::new());
    let runner: Arc<dyn CommandRunner> = fake.clone();
    let (handle, token) = cancel_pair();
    handle.cancel();

    let report = with_timeout(run_loop(
        TargetPath::from("/proj/a"),
        cfg,
        runner,
        token,
    ))
    .await;

    assert_eq!(report.outcome, WorkerOutcome::Cancelled { next_index: 1 });
    assert!(report.results.is_empty());
    assert!(fake.recorded().is_empty());

    Ok(())
}

#[tokio::test]
async fn missing_target_aborts_before_any_invocation() -> TestResult {
    init_tracing();

    let cfg = Arc::new(single_target_config(1, 5));
    let fake = Arc::new(FakeRunner::new().with_missing_target("/proj/a"));
    let runner: Arc<dyn CommandRunner> = fake.clone();
    let (_handle, token) = cancel_pair();

    let report = with_timeout(run_loop(
        TargetPath::from("/proj/a"),
        cfg,
        runner,
        token,
    ))
    .await;

    assert!(report.results.is_empty());
    assert!(fake.recorded().is_empty());
    assert!(matches!(
        report.outcome,
        WorkerOutcome::Fatal {
            at_index: 1,
            cause: FailureCause::TargetMissing,
        }
    ));

    Ok(())
}
