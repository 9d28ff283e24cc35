// Metrics collector: samples the source, folds results into bounded history,
// answers history and summary queries.

use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use chrono::SecondsFormat;

use crate::error::SourceError;
use crate::history::HistoryStore;
use crate::metrics_source::MetricsSource;
use crate::models::{CpuStats, DiskStats, HistoryView, MemoryStats, Section, Snapshot, Summary};

pub struct MetricsCollector {
    source: Arc<dyn MetricsSource>,
    history: RwLock<HistoryStore>,
}

impl MetricsCollector {
    /// Partitions visible at startup get an empty series right away; later ones are
    /// picked up on their first successful sample.
    pub fn new(source: Arc<dyn MetricsSource>, history_capacity: usize) -> Self {
        let mut history = HistoryStore::new(history_capacity);
        match source.partitions() {
            Ok(partitions) => {
                for p in &partitions {
                    history.track_partition(&p.mountpoint);
                }
            }
            Err(e) => {
                tracing::error!(error = %e, operation = "init_disk_history", "Error initializing disk history");
            }
        }
        tracing::info!(history_capacity, "MetricsCollector initialized");
        Self {
            source,
            history: RwLock::new(history),
        }
    }

    /// Samples every category and appends the successful ones to history.
    /// Never fails: a category that could not be read carries an `error` field instead.
    pub async fn collect(&self) -> Snapshot {
        let now = chrono::Local::now();
        let source = self.source.clone();
        let (cpu, memory, disk) =
            match tokio::task::spawn_blocking(move || sample_all(source.as_ref())).await {
                Ok(sections) => sections,
                Err(e) => {
                    tracing::error!(error = %e, operation = "collect", "metrics source task failed");
                    let message = format!("metrics source task failed: {}", e);
                    (
                        Section::error(message.clone()),
                        Section::error(message.clone()),
                        Section::error(message),
                    )
                }
            };

        let snapshot = Snapshot {
            timestamp: now.to_rfc3339_opts(SecondsFormat::Secs, false),
            cpu,
            memory,
            disk,
        };
        // One write lock for the whole cycle: readers see all of it or none of it.
        // The label is taken under the lock so concurrent collects append in order.
        let mut history = self.write_history();
        let label = chrono::Local::now().format("%H:%M:%S").to_string();
        history.push_cycle(label, &snapshot);
        drop(history);
        snapshot
    }

    /// Point-in-time copy of every series, oldest first.
    pub fn history(&self) -> HistoryView {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .view()
    }

    pub fn summary(&self) -> Summary {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .summary()
    }

    fn write_history(&self) -> RwLockWriteGuard<'_, HistoryStore> {
        self.history.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn sample_all(
    source: &dyn MetricsSource,
) -> (
    Section<CpuStats>,
    Section<MemoryStats>,
    Section<DiskStats>,
) {
    (
        isolated("cpu", || sample_cpu(source)),
        isolated("memory", || sample_memory(source)),
        isolated("disk", || sample_disk(source)),
    )
}

/// Runs one category's sampling so that a panic inside it only blanks that category.
fn isolated<T>(category: &'static str, sample: impl FnOnce() -> Section<T>) -> Section<T> {
    match std::panic::catch_unwind(AssertUnwindSafe(sample)) {
        Ok(section) => section,
        Err(panic) => {
            let message = match panic.downcast_ref::<&str>() {
                Some(s) => (*s).to_string(),
                None => panic
                    .downcast_ref::<String>()
                    .cloned()
                    .unwrap_or_else(|| "unknown panic".to_string()),
            };
            tracing::error!(category, error = %message, operation = "collect", "metrics source panicked");
            Section::error(format!("{} sampling panicked: {}", category, message))
        }
    }
}

fn sample_cpu(source: &dyn MetricsSource) -> Section<CpuStats> {
    source
        .cpu()
        .inspect_err(|e| tracing::error!(error = %e, operation = "collect_cpu", "Error collecting CPU metrics"))
        .into()
}

fn sample_memory(source: &dyn MetricsSource) -> Section<MemoryStats> {
    source
        .virtual_memory()
        .and_then(|virtual_memory| {
            source.swap_memory().map(|swap| MemoryStats {
                virtual_memory,
                swap,
            })
        })
        .inspect_err(|e| tracing::error!(error = %e, operation = "collect_memory", "Error collecting memory metrics"))
        .into()
}

/// Each partition is read on its own; one failing mount point is logged and left out
/// of this cycle without affecting the rest.
fn sample_disk(source: &dyn MetricsSource) -> Section<DiskStats> {
    let listed = match source.partitions() {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = %e, operation = "collect_disk", "Error collecting disk metrics");
            return Section::error(e.to_string());
        }
    };

    let mut partitions = BTreeMap::new();
    for info in listed {
        match source.partition_usage(&info.mountpoint) {
            Ok(usage) => {
                partitions.insert(info.mountpoint.clone(), info.with_usage(usage));
            }
            Err(SourceError::PermissionDenied(_)) => {
                tracing::warn!(mountpoint = %info.mountpoint, "Permission denied when accessing partition");
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    mountpoint = %info.mountpoint,
                    operation = "collect_partition",
                    "Error collecting partition metrics"
                );
            }
        }
    }

    let io_counters = source
        .io_counters()
        .inspect_err(|e| tracing::warn!(error = %e, operation = "collect_io_counters", "Error collecting disk IO counters"))
        .into();

    Section::Ok(DiskStats {
        partitions,
        io_counters,
    })
}
