use chrono::{DateTime, Local};
use serde::Serialize;

/// One complete capture of host state. Built once, then only read.
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub timestamp: DateTime<Local>,
    pub host: HostInfo,
    pub cpu: CpuStats,
    pub memory: MemoryStats,
    pub disks: Vec<DiskStats>,
    pub processes: Vec<ProcessStats>,
    pub process_totals: ProcessTotals,
    /// Size of the filtered process set the totals were computed over.
    pub process_count: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HostInfo {
    pub os: Option<String>,
    pub hostname: Option<String>,
    pub arch: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CpuStats {
    pub usage_percent: Option<f64>,
    pub logical_cores: usize,
    pub physical_cores: usize,
    pub frequency_mhz: Option<f64>,
    pub temperature_c: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MemoryStats {
    pub total_bytes: Option<u64>,
    pub available_bytes: Option<u64>,
    pub used_bytes: Option<u64>,
    pub percent: Option<f64>,
    pub swap_total_bytes: Option<u64>,
    pub swap_used_bytes: Option<u64>,
    pub swap_percent: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DiskStats {
    pub device: String,
    pub mountpoint: String,
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
    pub percent: f64,
}

impl DiskStats {
    pub fn new(device: String, mountpoint: String, total_bytes: u64, free_bytes: u64) -> Self {
        let free_bytes = free_bytes.min(total_bytes);
        let used_bytes = total_bytes - free_bytes;
        let percent = if total_bytes > 0 {
            used_bytes as f64 / total_bytes as f64 * 100.0
        } else {
            0.0
        };
        DiskStats {
            device,
            mountpoint,
            total_bytes,
            used_bytes,
            free_bytes,
            percent,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProcessStats {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f64,
    pub memory_mb: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ProcessTotals {
    pub cpu_percent: f64,
    pub memory_mb: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disk_stats_derive_used_and_percent() {
        let disk = DiskStats::new("/dev/sda1".into(), "/".into(), 1000, 250);
        assert_eq!(disk.used_bytes, 750);
        assert_eq!(disk.free_bytes, 250);
        assert!((disk.percent - 75.0).abs() < 1e-9);
    }

    #[test]
    fn disk_stats_tolerate_empty_and_inconsistent_volumes() {
        let empty = DiskStats::new("tmpfs".into(), "/run".into(), 0, 0);
        assert_eq!(empty.percent, 0.0);

        let odd = DiskStats::new("odd".into(), "/odd".into(), 100, 400);
        assert_eq!(odd.free_bytes, 100);
        assert_eq!(odd.used_bytes, 0);
    }
}
