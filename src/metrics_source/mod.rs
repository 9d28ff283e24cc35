// Metrics source: raw OS readings behind a trait, with a sysinfo-backed implementation

mod linux;

use crate::error::SourceError;
use crate::models::*;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Instant;
use sysinfo::{Disks, System};
use tracing::instrument;

/// Identity of a mounted partition, as enumerated by the source.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionInfo {
    pub device: String,
    pub mountpoint: String,
    pub fstype: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartitionUsage {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub percent: f64,
}

impl PartitionInfo {
    pub fn with_usage(&self, usage: PartitionUsage) -> PartitionStat {
        PartitionStat {
            device: self.device.clone(),
            mountpoint: self.mountpoint.clone(),
            fstype: self.fstype.clone(),
            total: usage.total,
            used: usage.used,
            free: usage.free,
            percent: usage.percent,
        }
    }
}

/// Provider of raw host readings. Every call is fallible on its own and may block,
/// so callers run it off the async executor.
pub trait MetricsSource: Send + Sync + 'static {
    fn cpu(&self) -> Result<CpuStats, SourceError>;
    fn virtual_memory(&self) -> Result<VirtualMemory, SourceError>;
    fn swap_memory(&self) -> Result<SwapMemory, SourceError>;
    fn partitions(&self) -> Result<Vec<PartitionInfo>, SourceError>;
    fn partition_usage(&self, mountpoint: &str) -> Result<PartitionUsage, SourceError>;
    fn io_counters(&self) -> Result<BTreeMap<String, IoCounters>, SourceError>;
}

fn percent_of(part: u64, total: u64) -> f64 {
    if total > 0 {
        ((part as f64 / total as f64) * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> SourceError {
    SourceError::Poisoned(e.to_string())
}

pub struct SysinfoSource {
    sys: Mutex<System>,
    disks: Mutex<Disks>,
    last_cpu_refresh: Mutex<Instant>,
}

impl Default for SysinfoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoSource {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_all();
        sys.refresh_memory();
        let disks = Disks::new_with_refreshed_list();
        Self {
            sys: Mutex::new(sys),
            disks: Mutex::new(disks),
            last_cpu_refresh: Mutex::new(Instant::now()),
        }
    }
}

impl MetricsSource for SysinfoSource {
    #[instrument(skip(self), fields(source = "sysinfo", operation = "cpu"))]
    fn cpu(&self) -> Result<CpuStats, SourceError> {
        let mut sys = self.sys.lock().map_err(poisoned)?;
        let mut last = self.last_cpu_refresh.lock().map_err(poisoned)?;

        // Usage is a delta between two refreshes; wait out the minimum window if needed.
        let elapsed = last.elapsed();
        if elapsed < sysinfo::MINIMUM_CPU_UPDATE_INTERVAL {
            std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL - elapsed);
        }
        sys.refresh_cpu_all();
        *last = Instant::now();

        let per_cpu_percent: Vec<f64> = sys
            .cpus()
            .iter()
            .map(|c| (c.cpu_usage() as f64).clamp(0.0, 100.0))
            .collect();
        let load = System::load_average();
        let physical = System::physical_core_count().unwrap_or(1).max(1) as u32;
        let logical = per_cpu_percent.len().max(1) as u32;

        Ok(CpuStats {
            percent: (sys.global_cpu_usage() as f64).clamp(0.0, 100.0),
            per_cpu_percent,
            load_avg: LoadAverage {
                one: load.one.max(0.0),
                five: load.five.max(0.0),
                fifteen: load.fifteen.max(0.0),
            },
            count: CoreCount { physical, logical },
        })
    }

    #[instrument(skip(self), fields(source = "sysinfo", operation = "virtual_memory"))]
    fn virtual_memory(&self) -> Result<VirtualMemory, SourceError> {
        let mut sys = self.sys.lock().map_err(poisoned)?;
        sys.refresh_memory();
        let total = sys.total_memory();
        if total == 0 {
            return Err(SourceError::Unavailable("total memory reported as 0".into()));
        }
        let available = sys.available_memory();
        Ok(VirtualMemory {
            total,
            available,
            used: sys.used_memory(),
            free: sys.free_memory(),
            percent: percent_of(total.saturating_sub(available), total),
        })
    }

    #[instrument(skip(self), fields(source = "sysinfo", operation = "swap_memory"))]
    fn swap_memory(&self) -> Result<SwapMemory, SourceError> {
        let mut sys = self.sys.lock().map_err(poisoned)?;
        sys.refresh_memory();
        let total = sys.total_swap();
        let used = sys.used_swap();
        Ok(SwapMemory {
            total,
            used,
            free: sys.free_swap(),
            percent: percent_of(used, total),
        })
    }

    #[instrument(skip(self), fields(source = "sysinfo", operation = "partitions"))]
    fn partitions(&self) -> Result<Vec<PartitionInfo>, SourceError> {
        let mut disks = self.disks.lock().map_err(poisoned)?;
        disks.refresh(true);
        Ok(disks
            .list()
            .iter()
            .map(|d| PartitionInfo {
                device: d.name().to_string_lossy().into_owned(),
                mountpoint: d.mount_point().to_string_lossy().into_owned(),
                fstype: d.file_system().to_string_lossy().into_owned(),
            })
            .collect())
    }

    #[instrument(skip(self), fields(source = "sysinfo", operation = "partition_usage"))]
    fn partition_usage(&self, mountpoint: &str) -> Result<PartitionUsage, SourceError> {
        if let Err(e) = std::fs::metadata(mountpoint) {
            return Err(match e.kind() {
                std::io::ErrorKind::PermissionDenied => {
                    SourceError::PermissionDenied(mountpoint.to_string())
                }
                _ => SourceError::Unavailable(format!("{}: {}", mountpoint, e)),
            });
        }
        let disks = self.disks.lock().map_err(poisoned)?;
        let disk = disks
            .list()
            .iter()
            .find(|d| d.mount_point().to_string_lossy() == mountpoint)
            .ok_or_else(|| SourceError::Unavailable(format!("{} is no longer mounted", mountpoint)))?;
        let total = disk.total_space();
        let free = disk.available_space();
        let used = total.saturating_sub(free);
        Ok(PartitionUsage {
            total,
            used,
            free,
            percent: percent_of(used, total),
        })
    }

    #[instrument(skip(self), fields(source = "sysinfo", operation = "io_counters"))]
    fn io_counters(&self) -> Result<BTreeMap<String, IoCounters>, SourceError> {
        linux::read_disk_io_counters()
    }
}
