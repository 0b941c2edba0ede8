// src/lib.rs

pub mod batch;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod template;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::batch::{cancel_pair, print_summary, Orchestrator};
use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::BatchConfig;
use crate::errors::Result;
use crate::exec::ShellRunner;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading + validation
/// - the optional `--target` subset filter
/// - the shell runner
/// - Ctrl-C handling (cancellation between iterations)
/// - the orchestrator and the final summary
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;
    let cfg = cfg.retain_targets(&args.target)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let runner = Arc::new(ShellRunner::new(cfg.invocation_timeout));

    // Ctrl-C → request cancellation; workers stop between iterations, an
    // in-flight command is left to finish.
    let (cancel_handle, cancel_token) = cancel_pair();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        info!("Ctrl-C received; workers will stop after their current invocation");
        cancel_handle.cancel();
    });

    let orchestrator = Orchestrator::new(cfg.clone(), runner, cancel_token);
    let summary = orchestrator.run().await?;

    print_summary(&cfg, &summary);

    // Individual invocation failures and worker aborts are carried by the
    // summary, not the exit code; only config/startup errors exit non-zero.
    Ok(())
}

/// Simple dry-run output: print targets, range and a sample command.
fn print_dry_run(cfg: &BatchConfig) {
    println!("branchdrive dry-run");
    println!(
        "  range: {}..{} ({} invocations per target)",
        cfg.range.start,
        cfg.range.end,
        cfg.range.count()
    );
    if let Some(timeout) = cfg.invocation_timeout {
        println!("  invocation timeout: {}s", timeout.as_secs());
    }
    println!();

    println!("targets ({}):", cfg.targets.len());
    for target in cfg.targets.iter() {
        println!("  - {target}");
        println!(
            "      first command: {}",
            template::render(&cfg.template, target.as_str(), cfg.range.start, &cfg.params)
        );
    }

    debug!("dry-run complete (no execution)");
}
