// Linux-specific helpers: /proc/diskstats IO counters.

use std::collections::BTreeMap;

use crate::error::SourceError;
use crate::models::IoCounters;

const SECTOR_SIZE: u64 = 512;

/// Per-device cumulative IO counters from /proc/diskstats (Linux).
pub(super) fn read_disk_io_counters() -> Result<BTreeMap<String, IoCounters>, SourceError> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/proc/diskstats").map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => {
                SourceError::PermissionDenied("/proc/diskstats".into())
            }
            _ => SourceError::Unavailable(format!("/proc/diskstats: {}", e)),
        })?;
        Ok(parse_diskstats(&content))
    }
    #[cfg(not(target_os = "linux"))]
    Err(SourceError::Unsupported("disk io counters"))
}

/// Parses the /proc/diskstats layout: `major minor name reads merged sectors ms writes merged sectors ms ...`.
/// Malformed lines are skipped.
pub(super) fn parse_diskstats(content: &str) -> BTreeMap<String, IoCounters> {
    let mut out = BTreeMap::new();
    for line in content.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 11 {
            continue;
        }
        let num = |i: usize| fields[i].parse::<u64>().ok();
        let (
            Some(read_count),
            Some(sectors_read),
            Some(read_time),
            Some(write_count),
            Some(sectors_written),
            Some(write_time),
        ) = (num(3), num(5), num(6), num(7), num(9), num(10))
        else {
            continue;
        };
        out.insert(
            fields[2].to_string(),
            IoCounters {
                read_count,
                write_count,
                read_bytes: sectors_read.saturating_mul(SECTOR_SIZE),
                write_bytes: sectors_written.saturating_mul(SECTOR_SIZE),
                read_time,
                write_time,
            },
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_diskstats_lines() {
        let content = "\
   8       0 sda 1200 10 48000 300 800 5 16000 250 0 400 550 0 0 0 0
   8       1 sda1 100 0 2000 20 50 0 1000 10 0 30 30
 garbage line
";
        let counters = parse_diskstats(content);
        assert_eq!(counters.len(), 2);
        let sda = &counters["sda"];
        assert_eq!(sda.read_count, 1200);
        assert_eq!(sda.read_bytes, 48000 * 512);
        assert_eq!(sda.write_count, 800);
        assert_eq!(sda.write_bytes, 16000 * 512);
        assert_eq!(sda.read_time, 300);
        assert_eq!(sda.write_time, 250);
        assert_eq!(counters["sda1"].write_count, 50);
    }
}
