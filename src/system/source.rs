//! The OS-facing boundary the engine reads from.
//!
//! Every method is fallible on its own so one failing fact never hides the
//! others. [`SysinfoHost`](super::collector::SysinfoHost) is the production
//! implementation and [`FallbackHost`] covers hosts without a process table.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::error::ProbeError;
use super::platform;
use super::snapshot::HostInfo;

/// Cumulative CPU ticks for the whole machine. Units are host-defined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuTicks {
    pub busy: u64,
    pub total: u64,
}

/// One read of the process table's CPU counters.
#[derive(Clone, Debug, Default)]
pub struct CpuPass {
    /// Accumulated busy time per visible pid.
    pub busy: HashMap<u32, Duration>,
    pub global: Option<CpuTicks>,
}

/// A visible process after the second pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: String,
    pub rss_bytes: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemoryReading {
    pub total: u64,
    pub available: u64,
    pub used: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SwapReading {
    pub total: u64,
    pub used: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mount {
    pub device: String,
    pub mountpoint: PathBuf,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VolumeUsage {
    pub total: u64,
    pub free: u64,
}

pub trait HostSource: Send {
    /// Refreshes the process table and reads per-process busy time.
    fn cpu_pass(&mut self) -> Result<CpuPass, ProbeError>;

    /// Global usage over the window since the previous `cpu_pass`, as the host computes it.
    fn global_usage_since_last_pass(&mut self) -> Result<f64, ProbeError> {
        Err(ProbeError::unavailable("global cpu usage"))
    }

    /// Processes seen by the most recent `cpu_pass`. Entries that could not be read are left out.
    fn processes(&mut self) -> Result<Vec<ProcessEntry>, ProbeError>;

    fn logical_cores(&mut self) -> Result<usize, ProbeError>;
    fn physical_cores(&mut self) -> Result<usize, ProbeError>;
    fn memory(&mut self) -> Result<MemoryReading, ProbeError>;
    fn swap(&mut self) -> Result<SwapReading, ProbeError>;
    fn mounts(&mut self) -> Result<Vec<Mount>, ProbeError>;
    fn mount_usage(&mut self, mount: &Mount) -> Result<VolumeUsage, ProbeError>;

    /// Usage of whatever volume holds `path`.
    fn volume_at(&mut self, path: &Path) -> Result<VolumeUsage, ProbeError> {
        platform::volume_usage(path)
    }

    fn host_info(&mut self) -> HostInfo {
        HostInfo {
            os: None,
            hostname: None,
            arch: std::env::consts::ARCH.to_string(),
        }
    }
}

/// Host without a usable probing facility: only the OS core count and
/// per-path volume usage are offered.
#[derive(Debug, Default)]
pub struct FallbackHost;

impl HostSource for FallbackHost {
    fn cpu_pass(&mut self) -> Result<CpuPass, ProbeError> {
        Err(ProbeError::unavailable("process table"))
    }

    fn processes(&mut self) -> Result<Vec<ProcessEntry>, ProbeError> {
        Err(ProbeError::unavailable("process table"))
    }

    fn logical_cores(&mut self) -> Result<usize, ProbeError> {
        os_logical_cores()
    }

    fn physical_cores(&mut self) -> Result<usize, ProbeError> {
        Err(ProbeError::unavailable("physical cores"))
    }

    fn memory(&mut self) -> Result<MemoryReading, ProbeError> {
        Err(ProbeError::unavailable("memory"))
    }

    fn swap(&mut self) -> Result<SwapReading, ProbeError> {
        Err(ProbeError::unavailable("swap"))
    }

    fn mounts(&mut self) -> Result<Vec<Mount>, ProbeError> {
        Err(ProbeError::unavailable("mounts"))
    }

    fn mount_usage(&mut self, _mount: &Mount) -> Result<VolumeUsage, ProbeError> {
        Err(ProbeError::unavailable("mounts"))
    }
}

pub fn os_logical_cores() -> Result<usize, ProbeError> {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .map_err(|e| ProbeError::io("logical cores", &e))
}
