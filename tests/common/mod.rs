// Shared test helpers: a scripted metrics source

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use sysview::collector::MetricsCollector;
use sysview::error::SourceError;
use sysview::metrics_source::{MetricsSource, PartitionInfo, PartitionUsage};
use sysview::models::*;

#[derive(Default)]
struct FakeState {
    cpu_percents: VecDeque<f64>,
    memory_percents: VecDeque<f64>,
    last_cpu: f64,
    last_memory: f64,
    partitions: Vec<PartitionInfo>,
    disk_percents: HashMap<String, f64>,
    failing_partitions: HashSet<String>,
    cpu_fails: bool,
    memory_fails: bool,
    partition_list_fails: bool,
    io_fails: bool,
    cpu_panics: usize,
}

/// Metrics source whose readings and failures are scripted by the test.
#[derive(Default)]
pub struct FakeSource {
    state: Mutex<FakeState>,
}

pub fn partition(mountpoint: &str) -> PartitionInfo {
    PartitionInfo {
        device: format!("/dev/fake{}", mountpoint.replace('/', "_")),
        mountpoint: mountpoint.to_string(),
        fstype: "ext4".to_string(),
    }
}

impl FakeSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_partitions(mounts: &[&str]) -> Arc<Self> {
        let source = Self::default();
        source.state.lock().unwrap().partitions = mounts.iter().map(|m| partition(m)).collect();
        Arc::new(source)
    }

    /// Queues CPU readings; once drained the last one repeats.
    pub fn push_cpu(&self, percents: &[f64]) {
        self.state.lock().unwrap().cpu_percents.extend(percents);
    }

    pub fn push_memory(&self, percents: &[f64]) {
        self.state.lock().unwrap().memory_percents.extend(percents);
    }

    pub fn set_disk_percent(&self, mountpoint: &str, percent: f64) {
        self.state
            .lock()
            .unwrap()
            .disk_percents
            .insert(mountpoint.to_string(), percent);
    }

    pub fn add_partition(&self, mountpoint: &str) {
        self.state.lock().unwrap().partitions.push(partition(mountpoint));
    }

    pub fn remove_partition(&self, mountpoint: &str) {
        self.state
            .lock()
            .unwrap()
            .partitions
            .retain(|p| p.mountpoint != mountpoint);
    }

    pub fn fail_partition(&self, mountpoint: &str, fail: bool) {
        let mut state = self.state.lock().unwrap();
        if fail {
            state.failing_partitions.insert(mountpoint.to_string());
        } else {
            state.failing_partitions.remove(mountpoint);
        }
    }

    pub fn fail_cpu(&self, fail: bool) {
        self.state.lock().unwrap().cpu_fails = fail;
    }

    pub fn fail_memory(&self, fail: bool) {
        self.state.lock().unwrap().memory_fails = fail;
    }

    pub fn fail_partition_list(&self, fail: bool) {
        self.state.lock().unwrap().partition_list_fails = fail;
    }

    pub fn fail_io(&self, fail: bool) {
        self.state.lock().unwrap().io_fails = fail;
    }

    /// The next `n` CPU reads panic instead of returning.
    pub fn panic_on_cpu(&self, n: usize) {
        self.state.lock().unwrap().cpu_panics = n;
    }
}

impl MetricsSource for FakeSource {
    fn cpu(&self) -> Result<CpuStats, SourceError> {
        let percent = {
            let mut state = self.state.lock().unwrap();
            if state.cpu_fails {
                return Err(SourceError::Unavailable("cpu counters".into()));
            }
            let panic_now = state.cpu_panics > 0;
            if panic_now {
                state.cpu_panics -= 1;
            }
            if let Some(p) = state.cpu_percents.pop_front() {
                state.last_cpu = p;
            }
            if panic_now {
                drop(state);
                panic!("scripted cpu panic");
            }
            state.last_cpu
        };
        Ok(CpuStats {
            percent,
            per_cpu_percent: vec![percent, percent],
            load_avg: LoadAverage {
                one: percent / 100.0,
                five: 0.5,
                fifteen: 0.25,
            },
            count: CoreCount {
                physical: 1,
                logical: 2,
            },
        })
    }

    fn virtual_memory(&self) -> Result<VirtualMemory, SourceError> {
        let mut state = self.state.lock().unwrap();
        if state.memory_fails {
            return Err(SourceError::PermissionDenied("/proc/meminfo".into()));
        }
        if let Some(p) = state.memory_percents.pop_front() {
            state.last_memory = p;
        }
        let total = 1000;
        let used = (state.last_memory * 10.0) as u64;
        Ok(VirtualMemory {
            total,
            available: total - used,
            used,
            free: total - used,
            percent: state.last_memory,
        })
    }

    fn swap_memory(&self) -> Result<SwapMemory, SourceError> {
        Ok(SwapMemory {
            total: 100,
            used: 0,
            free: 100,
            percent: 0.0,
        })
    }

    fn partitions(&self) -> Result<Vec<PartitionInfo>, SourceError> {
        let state = self.state.lock().unwrap();
        if state.partition_list_fails {
            return Err(SourceError::Unavailable("mount table".into()));
        }
        Ok(state.partitions.clone())
    }

    fn partition_usage(&self, mountpoint: &str) -> Result<PartitionUsage, SourceError> {
        let state = self.state.lock().unwrap();
        if state.failing_partitions.contains(mountpoint) {
            return Err(SourceError::PermissionDenied(mountpoint.to_string()));
        }
        let percent = state.disk_percents.get(mountpoint).copied().unwrap_or(40.0);
        let total = 1000;
        let used = (percent * 10.0) as u64;
        Ok(PartitionUsage {
            total,
            used,
            free: total - used,
            percent,
        })
    }

    fn io_counters(&self) -> Result<BTreeMap<String, IoCounters>, SourceError> {
        let state = self.state.lock().unwrap();
        if state.io_fails {
            return Err(SourceError::Unsupported("disk io counters"));
        }
        let mut counters = BTreeMap::new();
        counters.insert(
            "fake0".to_string(),
            IoCounters {
                read_count: 10,
                write_count: 5,
                read_bytes: 4096,
                write_bytes: 2048,
                read_time: 3,
                write_time: 2,
            },
        );
        Ok(counters)
    }
}

pub fn collector(source: Arc<FakeSource>, capacity: usize) -> Arc<MetricsCollector> {
    Arc::new(MetricsCollector::new(source, capacity))
}
