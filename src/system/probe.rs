//! Point-in-time facts about CPU, memory and disks.
//!
//! Each fact is collected on its own. A failure degrades only the field it
//! affects and is logged at `debug`; nothing here returns an error.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::error::ProbeError;
use super::sensor::SensorChain;
use super::snapshot::{CpuStats, DiskStats, MemoryStats};
use super::source::{HostSource, MemoryReading, SwapReading, os_logical_cores};

/// What the host can offer, detected once at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    /// Process table, memory and mount enumeration are all supported.
    pub full_probe: bool,
}

impl Capabilities {
    pub fn full() -> Self {
        Capabilities { full_probe: true }
    }

    pub fn reduced() -> Self {
        Capabilities { full_probe: false }
    }
}

pub struct ResourceProbe {
    capabilities: Capabilities,
    frequency: SensorChain,
    temperature: SensorChain,
}

impl ResourceProbe {
    pub fn new(capabilities: Capabilities, frequency: SensorChain, temperature: SensorChain) -> Self {
        if !capabilities.full_probe {
            info!("host probing facility unavailable, using reduced fact set");
        }
        ResourceProbe {
            capabilities,
            frequency,
            temperature,
        }
    }

    /// Probe with the platform's native sensor chains.
    pub fn with_host_sensors(capabilities: Capabilities) -> Self {
        if capabilities.full_probe {
            Self::new(capabilities, SensorChain::frequency(), SensorChain::temperature())
        } else {
            Self::without_sensors(capabilities)
        }
    }

    pub fn without_sensors(capabilities: Capabilities) -> Self {
        Self::new(
            capabilities,
            SensorChain::empty("cpu frequency"),
            SensorChain::empty("cpu temperature"),
        )
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Static CPU facts. Usage is left unknown; it only exists over a sampling window.
    pub fn cpu_snapshot(&mut self, host: &mut dyn HostSource) -> CpuStats {
        let logical = if self.capabilities.full_probe {
            host.logical_cores().or_else(|err| {
                debug!(%err, "logical core count unavailable from host");
                os_logical_cores()
            })
        } else {
            os_logical_cores()
        };
        let logical_cores = absorb(logical).unwrap_or(1).max(1);

        let physical = if self.capabilities.full_probe {
            absorb(host.physical_cores())
        } else {
            None
        };
        let physical_cores = physical
            .filter(|&n| n > 0)
            .unwrap_or(logical_cores)
            .min(logical_cores);

        CpuStats {
            usage_percent: None,
            logical_cores,
            physical_cores,
            frequency_mhz: self.frequency.read(),
            temperature_c: self.temperature.read(),
        }
    }

    pub fn memory_snapshot(&mut self, host: &mut dyn HostSource) -> MemoryStats {
        if !self.capabilities.full_probe {
            return MemoryStats::default();
        }
        memory_stats(absorb(host.memory()), absorb(host.swap()))
    }

    /// One entry per mount that answered. Falls back to the working directory's volume.
    pub fn disk_snapshot(&mut self, host: &mut dyn HostSource) -> Vec<DiskStats> {
        let mut disks = Vec::new();

        if self.capabilities.full_probe {
            match host.mounts() {
                Ok(mounts) => {
                    for mount in mounts {
                        match host.mount_usage(&mount) {
                            Ok(usage) => disks.push(DiskStats::new(
                                mount.device,
                                mount.mountpoint.display().to_string(),
                                usage.total,
                                usage.free,
                            )),
                            Err(err) => {
                                debug!(mount = %mount.mountpoint.display(), %err, "skipping mount");
                            }
                        }
                    }
                }
                Err(err) => debug!(%err, "mount enumeration failed"),
            }
        }

        if disks.is_empty()
            && let Some(disk) = working_dir_volume(host)
        {
            disks.push(disk);
        }
        disks
    }
}

fn working_dir_volume(host: &mut dyn HostSource) -> Option<DiskStats> {
    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(err) => {
            debug!(%err, "working directory unavailable");
            return None;
        }
    };
    let usage = absorb(host.volume_at(&cwd))?;
    Some(DiskStats::new(
        volume_root(&cwd).display().to_string(),
        cwd.display().to_string(),
        usage.total,
        usage.free,
    ))
}

fn volume_root(path: &Path) -> PathBuf {
    path.ancestors()
        .last()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| path.to_path_buf())
}

/// Builds memory stats, clamping used to total.
pub fn memory_stats(memory: Option<MemoryReading>, swap: Option<SwapReading>) -> MemoryStats {
    let memory = memory.filter(|m| m.total > 0);
    let used = memory.map(|m| m.used.min(m.total));
    let swap_used = swap.map(|s| s.used.min(s.total));

    MemoryStats {
        total_bytes: memory.map(|m| m.total),
        available_bytes: memory.map(|m| m.available.min(m.total)),
        used_bytes: used,
        percent: memory
            .zip(used)
            .map(|(m, used)| used as f64 / m.total as f64 * 100.0),
        swap_total_bytes: swap.map(|s| s.total),
        swap_used_bytes: swap_used,
        swap_percent: swap.zip(swap_used).map(|(s, used)| {
            if s.total == 0 {
                0.0
            } else {
                used as f64 / s.total as f64 * 100.0
            }
        }),
    }
}

fn absorb<T>(result: Result<T, ProbeError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            debug!(%err, "fact unavailable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn used_memory_never_exceeds_total() {
        let stats = memory_stats(
            Some(MemoryReading {
                total: 1000,
                available: 1200,
                used: 1500,
            }),
            Some(SwapReading { total: 0, used: 0 }),
        );
        assert_eq!(stats.used_bytes, Some(1000));
        assert_eq!(stats.available_bytes, Some(1000));
        assert_eq!(stats.percent, Some(100.0));
        assert_eq!(stats.swap_percent, Some(0.0));
    }

    #[test]
    fn percentages_follow_readings() {
        let stats = memory_stats(
            Some(MemoryReading {
                total: 8 << 30,
                available: 6 << 30,
                used: 2 << 30,
            }),
            Some(SwapReading {
                total: 4 << 30,
                used: 1 << 30,
            }),
        );
        assert_eq!(stats.percent, Some(25.0));
        assert_eq!(stats.swap_percent, Some(25.0));
    }

    #[test]
    fn missing_or_empty_readings_are_unknown() {
        let stats = memory_stats(
            Some(MemoryReading {
                total: 0,
                available: 0,
                used: 0,
            }),
            None,
        );
        assert_eq!(stats, MemoryStats::default());
    }

    #[test]
    fn volume_root_is_the_top_ancestor() {
        let cwd = std::env::current_dir().unwrap();
        let root = volume_root(&cwd);
        assert!(cwd.starts_with(&root));
        assert_eq!(root.parent(), None);
    }

    #[test]
    fn reduced_probe_skips_host_sensors() {
        let mut probe = ResourceProbe::with_host_sensors(Capabilities::reduced());
        assert_eq!(probe.capabilities(), Capabilities::reduced());

        let mut host = crate::system::source::FallbackHost;
        let cpu = probe.cpu_snapshot(&mut host);
        assert!(cpu.logical_cores >= 1);
        assert_eq!(cpu.physical_cores, cpu.logical_cores);
        assert_eq!(cpu.frequency_mhz, None);
        assert_eq!(cpu.temperature_c, None);
        assert_eq!(probe.memory_snapshot(&mut host), MemoryStats::default());
    }
}
