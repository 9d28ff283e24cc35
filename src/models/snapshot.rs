// One collection cycle's readings

use serde::{Deserialize, Serialize};

use super::{CpuStats, DiskStats, MemoryStats, Section};

/// Point-in-time bundle of all readings. Built once per cycle and never mutated after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// RFC 3339, second precision, local offset.
    pub timestamp: String,
    pub cpu: Section<CpuStats>,
    pub memory: Section<MemoryStats>,
    pub disk: Section<DiskStats>,
}
