// Storage / disk models

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Section;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionStat {
    pub device: String,
    pub mountpoint: String,
    pub fstype: String,
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub percent: f64,
}

/// Cumulative per-device IO counters (times in milliseconds).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IoCounters {
    pub read_count: u64,
    pub write_count: u64,
    pub read_bytes: u64,
    pub write_bytes: u64,
    pub read_time: u64,
    pub write_time: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskStats {
    /// Keyed by mount point; partitions that failed this cycle are absent.
    pub partitions: BTreeMap<String, PartitionStat>,
    pub io_counters: Section<BTreeMap<String, IoCounters>>,
}
