use std::path::Path;
use std::time::Duration;

use sysinfo::{Disks, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System};
use tracing::debug;

use super::error::ProbeError;
use super::platform;
use super::snapshot::HostInfo;
use super::source::{
    CpuPass, HostSource, MemoryReading, Mount, ProcessEntry, SwapReading, VolumeUsage,
    os_logical_cores,
};

/// [`HostSource`] backed by `sysinfo`.
pub struct SysinfoHost {
    sys: System,
    passes: u32,
}

impl Default for SysinfoHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoHost {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu_usage();
        SysinfoHost { sys, passes: 0 }
    }
}

impl HostSource for SysinfoHost {
    fn cpu_pass(&mut self) -> Result<CpuPass, ProbeError> {
        let _span = tracing::debug_span!("collector.cpu_pass").entered();

        self.sys.refresh_cpu_usage();
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_memory().with_cpu(),
        );
        self.passes = self.passes.saturating_add(1);

        let busy = self
            .sys
            .processes()
            .iter()
            .map(|(pid, process)| {
                (
                    pid.as_u32(),
                    Duration::from_millis(process.accumulated_cpu_time()),
                )
            })
            .collect();

        let global = match platform::global_cpu_ticks() {
            Ok(ticks) => Some(ticks),
            Err(err) => {
                debug!(%err, "global cpu ticks unavailable");
                None
            }
        };

        Ok(CpuPass { busy, global })
    }

    fn global_usage_since_last_pass(&mut self) -> Result<f64, ProbeError> {
        // sysinfo diffs its own counters between the last two refreshes
        if self.passes < 2 {
            return Err(ProbeError::unavailable("global cpu usage"));
        }
        Ok(f64::from(self.sys.global_cpu_usage()))
    }

    fn processes(&mut self) -> Result<Vec<ProcessEntry>, ProbeError> {
        if self.passes == 0 {
            return Err(ProbeError::partial("process table", "not refreshed yet"));
        }
        let entries = self
            .sys
            .processes()
            .iter()
            .filter(|(_, process)| {
                !matches!(process.status(), ProcessStatus::Zombie | ProcessStatus::Dead)
            })
            .map(|(pid, process)| ProcessEntry {
                pid: pid.as_u32(),
                name: process.name().to_string_lossy().to_string(),
                rss_bytes: process.memory(),
            })
            .collect();
        Ok(entries)
    }

    fn logical_cores(&mut self) -> Result<usize, ProbeError> {
        match self.sys.cpus().len() {
            0 => os_logical_cores(),
            n => Ok(n),
        }
    }

    fn physical_cores(&mut self) -> Result<usize, ProbeError> {
        System::physical_core_count().ok_or_else(|| ProbeError::unavailable("physical cores"))
    }

    fn memory(&mut self) -> Result<MemoryReading, ProbeError> {
        self.sys.refresh_memory();
        let total = self.sys.total_memory();
        if total == 0 {
            return Err(ProbeError::partial("memory", "host reported zero total memory"));
        }
        Ok(MemoryReading {
            total,
            available: self.sys.available_memory(),
            used: self.sys.used_memory(),
        })
    }

    fn swap(&mut self) -> Result<SwapReading, ProbeError> {
        Ok(SwapReading {
            total: self.sys.total_swap(),
            used: self.sys.used_swap(),
        })
    }

    fn mounts(&mut self) -> Result<Vec<Mount>, ProbeError> {
        let disks = Disks::new_with_refreshed_list();
        Ok(disks
            .iter()
            .map(|disk| Mount {
                device: disk.name().to_string_lossy().to_string(),
                mountpoint: disk.mount_point().to_path_buf(),
            })
            .collect())
    }

    fn mount_usage(&mut self, mount: &Mount) -> Result<VolumeUsage, ProbeError> {
        platform::volume_usage(&mount.mountpoint)
    }

    fn volume_at(&mut self, path: &Path) -> Result<VolumeUsage, ProbeError> {
        platform::volume_usage(path)
    }

    fn host_info(&mut self) -> HostInfo {
        HostInfo {
            os: System::long_os_version(),
            hostname: System::host_name(),
            arch: std::env::consts::ARCH.to_string(),
        }
    }
}
