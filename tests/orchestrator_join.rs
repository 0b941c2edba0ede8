// tests/orchestrator_join.rs

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use branchdrive::batch::{cancel_pair, Orchestrator, WorkerOutcome};
use branchdrive::config::TargetPath;
use branchdrive::exec::CommandRunner;
use branchdrive_test_utils::builders::BatchConfigBuilder;
use branchdrive_test_utils::fake_runner::FakeRunner;
use branchdrive_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn join_barrier_waits_for_all_workers() -> TestResult {
    init_tracing();

    // Three workers with deliberately different per-invocation durations;
    // run() must only return once the slowest has finished its range.
    let cfg = BatchConfigBuilder::new("scan --branch={branchIndex} --path={targetPath}")
        .target("/proj/fast")
        .target("/proj/medium")
        .target("/proj/slow")
        .range(1, 4)
        .build();

    let fake = Arc::new(
        FakeRunner::new()
            .with_target_delay("/proj/fast", Duration::from_millis(1))
            .with_target_delay("/proj/medium", Duration::from_millis(5))
            .with_target_delay("/proj/slow", Duration::from_millis(20)),
    );
    let runner: Arc<dyn CommandRunner> = fake.clone();
    let (_handle, token) = cancel_pair();

    let summary = with_timeout(Orchestrator::new(cfg, runner, token).run()).await?;

    // Exactly one worker per target reached a terminal state.
    assert_eq!(summary.per_target.len(), 3);
    assert!(summary.all_completed());
    for results in summary.per_target.values() {
        assert_eq!(results.len(), 4);
    }
    assert_eq!(fake.recorded().len(), 12);

    Ok(())
}

#[tokio::test]
async fn per_worker_order_is_sequential_despite_interleaving() -> TestResult {
    init_tracing();

    let cfg = BatchConfigBuilder::new("scan --branch={branchIndex} --path={targetPath}")
        .target("/proj/a")
        .target("/proj/b")
        .range(1, 10)
        .build();

    let fake = Arc::new(
        FakeRunner::new()
            .with_target_delay("/proj/a", Duration::from_millis(1))
            .with_target_delay("/proj/b", Duration::from_millis(2)),
    );
    let runner: Arc<dyn CommandRunner> = fake.clone();
    let (_handle, token) = cancel_pair();

    let summary = with_timeout(Orchestrator::new(cfg, runner, token).run()).await?;

    // No cross-worker ordering is guaranteed, but within each worker the
    // branch indices must be strictly increasing and contiguous.
    for target in ["/proj/a", "/proj/b"] {
        let indices: Vec<i64> = summary.per_target[&TargetPath::from(target)]
            .iter()
            .map(|r| r.branch_index)
            .collect();
        assert_eq!(indices, (1..=10).collect::<Vec<i64>>());
    }

    Ok(())
}

#[tokio::test]
async fn one_fatal_worker_does_not_disturb_the_others() -> TestResult {
    init_tracing();

    let cfg = BatchConfigBuilder::new("scan --branch={branchIndex} --path={targetPath}")
        .target("/proj/gone")
        .target("/proj/ok")
        .range(1, 3)
        .build();

    let fake = Arc::new(FakeRunner::new().with_missing_target("/proj/gone"));
    let runner: Arc<dyn CommandRunner> = fake.clone();
    let (_handle, token) = cancel_pair();

    let summary = with_timeout(Orchestrator::new(cfg, runner, token).run()).await?;

    assert!(!summary.all_completed());
    assert!(summary.per_target[&TargetPath::from("/proj/gone")].is_empty());
    assert_eq!(summary.per_target[&TargetPath::from("/proj/ok")].len(), 3);
    assert_eq!(
        summary.outcomes[&TargetPath::from("/proj/ok")],
        WorkerOutcome::Completed
    );
    assert_eq!(summary.failures.len(), 1);

    Ok(())
}
