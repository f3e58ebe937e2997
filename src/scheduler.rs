//! Fixed-rate pass scheduler
//!
//! Runs one pass at a time on the current thread. Each pass is due
//! `interval` after the previous pass started; a pass that overruns is
//! followed immediately by the next one. Shutdown is only observed while
//! idle, so a pass that has started always runs to completion.

use crate::error::SyncError;
use crate::sync::{PassReport, Reconciler};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tracing::{error, info, warn};

/// Deadline used when `started + interval` does not fit in an `Instant`
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Something that can run a single reconciliation pass
pub trait PassRunner {
    fn run_pass(&mut self) -> Result<PassReport, SyncError>;
}

impl PassRunner for Reconciler {
    fn run_pass(&mut self) -> Result<PassReport, SyncError> {
        Reconciler::run_pass(self)
    }
}

/// Counters for a scheduler run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub passes: u64,
    /// Passes abandoned because of a pass-level error
    pub failed_passes: u64,
    /// Passes that completed with at least one isolated path failure
    pub passes_with_failures: u64,
}

pub struct Scheduler {
    interval: Duration,
}

impl Scheduler {
    /// A zero interval is clamped to one second.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_secs(1)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run passes until `shutdown` resolves
    ///
    /// The first pass starts immediately. A pass error is logged and counted,
    /// then the next pass runs on schedule. Panics are not caught here: the
    /// reconciler reports every filesystem failure as a [`SyncError`] and
    /// does not unwrap.
    pub async fn run<R, F>(&self, runner: &mut R, shutdown: F) -> SchedulerStats
    where
        R: PassRunner,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut stats = SchedulerStats::default();
        let mut next_start = Instant::now();

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!(passes = stats.passes, "Scheduler stopping");
                    break;
                }
                _ = sleep_until(next_start) => {}
            }

            let started = Instant::now();
            next_start = started
                .checked_add(self.interval)
                .unwrap_or_else(|| started + FAR_FUTURE);
            stats.passes += 1;

            info!(
                pass = stats.passes,
                interval_secs = self.interval.as_secs(),
                "Running sync every {} second(s)...",
                self.interval.as_secs()
            );

            match runner.run_pass() {
                Ok(report) => {
                    if report.failures.is_empty() {
                        info!(pass = stats.passes, "Pass complete: {}", report);
                    } else {
                        stats.passes_with_failures += 1;
                        warn!(pass = stats.passes, "Pass complete with failures: {}", report);
                    }
                }
                Err(e) => {
                    stats.failed_passes += 1;
                    error!(pass = stats.passes, error = %e, "Pass abandoned");
                }
            }

            if started.elapsed() >= self.interval {
                warn!(
                    pass = stats.passes,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Pass took longer than the interval, starting the next one immediately"
                );
            }
        }

        stats
    }
}
