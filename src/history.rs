// Bounded in-memory history: one fixed-capacity ring buffer per series.

use std::collections::{BTreeMap, VecDeque};

use crate::models::{
    CpuHistory, HistoryView, LoadAverage, PartitionStat, Snapshot, Summary, VirtualMemory,
};

/// Default capacity: 60 samples, about 5 minutes at a 5 second cadence.
pub const DEFAULT_HISTORY_CAPACITY: usize = 60;

/// Fixed-capacity FIFO. Pushing at capacity evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// A zero capacity is bumped to 1 so `push` always retains the newest entry.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, item: T) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Oldest first.
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

/// All history series. Single writer (the collector), guarded by the collector's lock.
#[derive(Debug)]
pub struct HistoryStore {
    capacity: usize,
    timestamps: RingBuffer<String>,
    cpu_percent: RingBuffer<f64>,
    cpu_load: RingBuffer<LoadAverage>,
    memory: RingBuffer<VirtualMemory>,
    disk: BTreeMap<String, RingBuffer<PartitionStat>>,
}

impl HistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            timestamps: RingBuffer::new(capacity),
            cpu_percent: RingBuffer::new(capacity),
            cpu_load: RingBuffer::new(capacity),
            memory: RingBuffer::new(capacity),
            disk: BTreeMap::new(),
        }
    }

    /// Creates an empty series for a mount point if none exists yet.
    pub fn track_partition(&mut self, mountpoint: &str) {
        if !self.disk.contains_key(mountpoint) {
            self.disk
                .insert(mountpoint.to_string(), RingBuffer::new(self.capacity));
        }
    }

    /// Folds one cycle into history. Only sections that sampled successfully are appended;
    /// partitions missing from this snapshot keep their series untouched.
    pub fn push_cycle(&mut self, label: String, snapshot: &Snapshot) {
        self.timestamps.push(label);
        if let Some(cpu) = snapshot.cpu.as_ok() {
            self.cpu_percent.push(cpu.percent);
            self.cpu_load.push(cpu.load_avg);
        }
        if let Some(memory) = snapshot.memory.as_ok() {
            self.memory.push(memory.virtual_memory.clone());
        }
        if let Some(disk) = snapshot.disk.as_ok() {
            for (mountpoint, partition) in &disk.partitions {
                self.track_partition(mountpoint);
                if let Some(series) = self.disk.get_mut(mountpoint) {
                    series.push(partition.clone());
                }
            }
        }
    }

    pub fn view(&self) -> HistoryView {
        HistoryView {
            timestamps: self.timestamps.to_vec(),
            cpu: CpuHistory {
                percent: self.cpu_percent.to_vec(),
                load_avg: self.cpu_load.to_vec(),
            },
            memory: self.memory.to_vec(),
            disk: self
                .disk
                .iter()
                .map(|(mount, series)| (mount.clone(), series.to_vec()))
                .collect(),
        }
    }

    /// Latest CPU/memory percent and per-partition disk percent.
    pub fn summary(&self) -> Summary {
        let (Some(cpu_percent), Some(memory)) = (self.cpu_percent.latest(), self.memory.latest())
        else {
            return Summary::no_data();
        };
        let disk_usage = self
            .disk
            .iter()
            .filter_map(|(mount, series)| series.latest().map(|p| (mount.clone(), p.percent)))
            .collect();
        Summary::Latest {
            cpu_percent: *cpu_percent,
            memory_percent: memory.percent,
            disk_usage,
        }
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
