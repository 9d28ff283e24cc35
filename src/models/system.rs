// CPU and memory models

use serde::{Deserialize, Serialize};

/// 1/5/15-minute load averages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadAverage {
    #[serde(rename = "1min")]
    pub one: f64,
    #[serde(rename = "5min")]
    pub five: f64,
    #[serde(rename = "15min")]
    pub fifteen: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoreCount {
    pub physical: u32,
    pub logical: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuStats {
    /// Overall utilization, 0-100.
    pub percent: f64,
    pub per_cpu_percent: Vec<f64>,
    pub load_avg: LoadAverage,
    pub count: CoreCount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualMemory {
    pub total: u64,
    pub available: u64,
    pub used: u64,
    pub free: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapMemory {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    #[serde(rename = "virtual")]
    pub virtual_memory: VirtualMemory,
    pub swap: SwapMemory,
}
