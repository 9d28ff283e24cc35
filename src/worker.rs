// Periodic cycle task: collect, broadcast, pause, repeat until shutdown.
// The pause is measured from the end of one cycle, so a slow cycle never overlaps the next.

use crate::broadcaster::{Broadcaster, CycleReport};
use crate::error::CycleError;
use futures_util::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::Instrument;
use tokio::time::{Duration, interval, sleep};

pub struct WorkerConfig {
    pub sample_interval_ms: u64,
    /// How often to log app stats (real seconds).
    pub stats_log_interval_secs: u64,
}

/// Awaits one cycle, turning a panic inside it into a `CycleError` so the loop survives.
pub async fn guard_cycle<F>(cycle: F) -> Result<CycleReport, CycleError>
where
    F: Future<Output = Result<CycleReport, CycleError>>,
{
    match AssertUnwindSafe(cycle).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => Err(CycleError::Panicked(panic_message(panic.as_ref()))),
    }
}

pub async fn run_guarded_cycle(broadcaster: &Broadcaster) -> Result<CycleReport, CycleError> {
    guard_cycle(broadcaster.run_periodic_cycle()).await
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Spawns the broadcaster's periodic cycle.
pub fn spawn(
    broadcaster: Arc<Broadcaster>,
    config: WorkerConfig,
    shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    spawn_cycles(
        move || {
            let broadcaster = broadcaster.clone();
            async move { broadcaster.run_periodic_cycle().await }
        },
        config,
        shutdown_rx,
    )
}

/// Drives `cycle` on the worker cadence. A cycle that fails or panics is logged and
/// counted; the next one still runs.
pub fn spawn_cycles<C, Fut>(
    mut cycle: C,
    config: WorkerConfig,
    mut shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<()>
where
    C: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<CycleReport, CycleError>> + Send,
{
    let WorkerConfig {
        sample_interval_ms,
        stats_log_interval_secs,
    } = config;
    let pause = Duration::from_millis(sample_interval_ms);
    let stats_log_interval = Duration::from_secs(stats_log_interval_secs);

    tokio::spawn(async move {
        let mut stats_log_tick = interval(stats_log_interval);
        stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut cycles_total: u64 = 0;
        let mut cycle_errors_total: u64 = 0;
        let mut observers_pruned_total: u64 = 0;
        let mut observers: usize = 0;

        loop {
            match guard_cycle(cycle()).await {
                Ok(report) => {
                    observers = report.delivered;
                    observers_pruned_total += report.pruned.len() as u64;
                }
                Err(e) => {
                    cycle_errors_total += 1;
                    tracing::error!(error = %e, cycle_errors_total, operation = "periodic_cycle", "Error collecting metrics");
                }
            }
            cycles_total += 1;

            let next_cycle = sleep(pause);
            tokio::pin!(next_cycle);
            loop {
                tokio::select! {
                    _ = &mut next_cycle => break,
                    _ = &mut shutdown_rx => {
                        tracing::debug!("Worker shutting down");
                        return;
                    }
                    _ = stats_log_tick.tick() => {
                        tracing::info!(
                            observers,
                            cycles_total,
                            cycle_errors_total,
                            observers_pruned_total,
                            "app stats"
                        );
                    }
                }
            }
        }
    }
    .instrument(tracing::debug_span!("worker", sample_interval_ms)))
}
