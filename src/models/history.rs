// History view (charting) and latest-value summary

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{LoadAverage, PartitionStat, VirtualMemory};

pub const NO_DATA_STATUS: &str = "No data collected yet";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuHistory {
    pub percent: Vec<f64>,
    pub load_avg: Vec<LoadAverage>,
}

/// Copy of every history series, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryView {
    /// `HH:MM:SS` chart labels, one per cycle.
    pub timestamps: Vec<String>,
    pub cpu: CpuHistory,
    pub memory: Vec<VirtualMemory>,
    pub disk: BTreeMap<String, Vec<PartitionStat>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Summary {
    Latest {
        cpu_percent: f64,
        memory_percent: f64,
        disk_usage: BTreeMap<String, f64>,
    },
    NoData {
        status: String,
    },
}

impl Summary {
    pub fn no_data() -> Self {
        Summary::NoData {
            status: NO_DATA_STATUS.to_string(),
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Summary::NoData { .. })
    }

    pub fn cpu_percent(&self) -> Option<f64> {
        match self {
            Summary::Latest { cpu_percent, .. } => Some(*cpu_percent),
            Summary::NoData { .. } => None,
        }
    }

    pub fn memory_percent(&self) -> Option<f64> {
        match self {
            Summary::Latest { memory_percent, .. } => Some(*memory_percent),
            Summary::NoData { .. } => None,
        }
    }

    pub fn disk_usage(&self) -> Option<&BTreeMap<String, f64>> {
        match self {
            Summary::Latest { disk_usage, .. } => Some(disk_usage),
            Summary::NoData { .. } => None,
        }
    }
}
