// Domain models: snapshot sections, history view, summary

mod history;
mod section;
mod snapshot;
mod storage;
mod system;

pub use history::{CpuHistory, HistoryView, NO_DATA_STATUS, Summary};
pub use section::Section;
pub use snapshot::Snapshot;
pub use storage::{DiskStats, IoCounters, PartitionStat};
pub use system::{CoreCount, CpuStats, LoadAverage, MemoryStats, SwapMemory, VirtualMemory};
