//! Periodic Sync CLI Binary
//!
//! Validates the configuration, sets up logging, then runs reconciliation
//! passes on a fixed interval until interrupted with Ctrl+C.

use clap::Parser;
use periodic_sync::cli::Cli;
use periodic_sync::logging::init_logging;
use periodic_sync::scheduler::Scheduler;
use periodic_sync::sync::Reconciler;
use std::process;
use tracing::{error, info};

fn main() {
    println!("=== Periodic one-way synchronization ===");

    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[ERROR] {}\nTerminating.", e);
            process::exit(1);
        }
    };

    let log_guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("[ERROR] {}\nTerminating.", e);
            process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start runtime: {}", e);
            drop(log_guard);
            process::exit(1);
        }
    };

    let scheduler = Scheduler::new(config.interval());
    let mut reconciler =
        Reconciler::with_options(&config.source, &config.target, config.reconcile_options());

    info!(
        source = %reconciler.source().display(),
        target = %reconciler.target().display(),
        interval_secs = scheduler.interval().as_secs(),
        "Running one-way folder synchronization periodically every {} second(s)",
        scheduler.interval().as_secs()
    );

    let stats = runtime.block_on(scheduler.run(&mut reconciler, shutdown_signal()));

    info!(
        passes = stats.passes,
        failed_passes = stats.failed_passes,
        "=== Received SIGINT, exiting. ==="
    );
    log_guard.flush();
}

/// Resolves on Ctrl+C. If the handler cannot be installed, never resolves.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
