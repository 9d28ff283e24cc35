// Model serialization tests (wire shape of snapshot, history and summary)

use std::collections::BTreeMap;
use sysview::error::SourceError;
use sysview::models::*;

fn cpu() -> CpuStats {
    CpuStats {
        percent: 12.5,
        per_cpu_percent: vec![10.0, 15.0],
        load_avg: LoadAverage {
            one: 0.5,
            five: 0.25,
            fifteen: 0.125,
        },
        count: CoreCount {
            physical: 1,
            logical: 2,
        },
    }
}

#[test]
fn test_cpu_stats_wire_keys() {
    let json = serde_json::to_value(cpu()).unwrap();
    assert_eq!(json["percent"], 12.5);
    assert_eq!(json["per_cpu_percent"][1], 15.0);
    assert_eq!(json["load_avg"]["1min"], 0.5);
    assert_eq!(json["load_avg"]["5min"], 0.25);
    assert_eq!(json["load_avg"]["15min"], 0.125);
    assert_eq!(json["count"]["logical"], 2);
}

#[test]
fn test_memory_virtual_key() {
    let memory = MemoryStats {
        virtual_memory: VirtualMemory {
            total: 1024,
            available: 512,
            used: 512,
            free: 256,
            percent: 50.0,
        },
        swap: SwapMemory {
            total: 0,
            used: 0,
            free: 0,
            percent: 0.0,
        },
    };
    let json = serde_json::to_value(&memory).unwrap();
    assert_eq!(json["virtual"]["available"], 512);
    assert_eq!(json["swap"]["percent"], 0.0);
}

#[test]
fn test_section_error_serializes_as_error_field() {
    let section = Section::from(Err::<CpuStats, _>(SourceError::PermissionDenied(
        "/proc/stat".into(),
    )));
    let json = serde_json::to_value(&section).unwrap();
    assert_eq!(json, serde_json::json!({ "error": "permission denied: /proc/stat" }));
}

#[test]
fn test_snapshot_with_error_sections_roundtrips() {
    let snapshot = Snapshot {
        timestamp: "2026-10-19T12:00:00+00:00".into(),
        cpu: Section::Ok(cpu()),
        memory: Section::error("unavailable: meminfo"),
        disk: Section::Ok(DiskStats {
            partitions: BTreeMap::new(),
            io_counters: Section::error("not supported on this platform: disk io counters"),
        }),
    };
    let json = serde_json::to_string(&snapshot).unwrap();
    let back: Snapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snapshot);
    assert!(back.memory.error_message().is_some());
    assert!(back.disk.as_ok().unwrap().io_counters.error_message().is_some());
}

#[test]
fn test_summary_shapes() {
    let no_data = serde_json::to_value(Summary::no_data()).unwrap();
    assert_eq!(no_data, serde_json::json!({ "status": NO_DATA_STATUS }));

    let mut disk_usage = BTreeMap::new();
    disk_usage.insert("/".to_string(), 33.0);
    let latest = Summary::Latest {
        cpu_percent: 90.0,
        memory_percent: 22.0,
        disk_usage,
    };
    let json = serde_json::to_value(&latest).unwrap();
    assert_eq!(json["cpu_percent"], 90.0);
    assert_eq!(json["memory_percent"], 22.0);
    assert_eq!(json["disk_usage"]["/"], 33.0);
}

#[test]
fn test_history_view_shape() {
    let view = HistoryView::default();
    let json = serde_json::to_value(&view).unwrap();
    assert!(json["timestamps"].as_array().unwrap().is_empty());
    assert!(json["cpu"]["percent"].as_array().unwrap().is_empty());
    assert!(json["cpu"]["load_avg"].as_array().unwrap().is_empty());
    assert!(json["memory"].as_array().unwrap().is_empty());
    assert!(json["disk"].as_object().unwrap().is_empty());
}
