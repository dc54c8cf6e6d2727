#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::time::Duration;

use hostwatch::system::error::ProbeError;
use hostwatch::system::snapshot::HostInfo;
use hostwatch::system::source::{
    CpuPass, CpuTicks, HostSource, MemoryReading, Mount, ProcessEntry, SwapReading, VolumeUsage,
};

pub const GIB: u64 = 1 << 30;

/// Deterministic host fed from scripted passes.
#[derive(Default)]
pub struct FakeHost {
    pub passes: VecDeque<CpuPass>,
    pub processes: Vec<ProcessEntry>,
    pub logical_cores: Option<usize>,
    pub physical_cores: Option<usize>,
    pub memory: Option<MemoryReading>,
    pub swap: Option<SwapReading>,
    pub mounts: Vec<(Mount, VolumeUsage)>,
    pub failing_mounts: HashSet<PathBuf>,
    pub working_volume: Option<VolumeUsage>,
    pub info: HostInfo,
    pub pass_reads: usize,
}

impl FakeHost {
    pub fn new() -> Self {
        FakeHost {
            logical_cores: Some(2),
            physical_cores: Some(1),
            info: HostInfo {
                os: Some("TestOS 1.0".to_string()),
                hostname: Some("testbox".to_string()),
                arch: "x86_64".to_string(),
            },
            ..FakeHost::default()
        }
    }

    pub fn with_pass(mut self, busy_ms: &[(u32, u64)], ticks: Option<(u64, u64)>) -> Self {
        self.passes.push_back(CpuPass {
            busy: busy_ms
                .iter()
                .map(|&(pid, ms)| (pid, Duration::from_millis(ms)))
                .collect::<HashMap<_, _>>(),
            global: ticks.map(|(busy, total)| CpuTicks { busy, total }),
        });
        self
    }

    pub fn with_process(mut self, pid: u32, name: &str, rss_bytes: u64) -> Self {
        self.processes.push(ProcessEntry {
            pid,
            name: name.to_string(),
            rss_bytes,
        });
        self
    }

    pub fn with_mount(mut self, device: &str, mountpoint: &str, total: u64, free: u64) -> Self {
        self.mounts.push((
            Mount {
                device: device.to_string(),
                mountpoint: PathBuf::from(mountpoint),
            },
            VolumeUsage { total, free },
        ));
        self
    }

    pub fn failing_mount(mut self, mountpoint: &str) -> Self {
        self.failing_mounts.insert(PathBuf::from(mountpoint));
        self
    }
}

impl HostSource for FakeHost {
    fn cpu_pass(&mut self) -> Result<CpuPass, ProbeError> {
        self.pass_reads += 1;
        self.passes
            .pop_front()
            .ok_or_else(|| ProbeError::partial("process table", "no scripted pass"))
    }

    fn processes(&mut self) -> Result<Vec<ProcessEntry>, ProbeError> {
        Ok(self.processes.clone())
    }

    fn logical_cores(&mut self) -> Result<usize, ProbeError> {
        self.logical_cores
            .ok_or_else(|| ProbeError::unavailable("logical cores"))
    }

    fn physical_cores(&mut self) -> Result<usize, ProbeError> {
        self.physical_cores
            .ok_or_else(|| ProbeError::unavailable("physical cores"))
    }

    fn memory(&mut self) -> Result<MemoryReading, ProbeError> {
        self.memory.ok_or_else(|| ProbeError::unavailable("memory"))
    }

    fn swap(&mut self) -> Result<SwapReading, ProbeError> {
        self.swap.ok_or_else(|| ProbeError::unavailable("swap"))
    }

    fn mounts(&mut self) -> Result<Vec<Mount>, ProbeError> {
        Ok(self.mounts.iter().map(|(m, _)| m.clone()).collect())
    }

    fn mount_usage(&mut self, mount: &Mount) -> Result<VolumeUsage, ProbeError> {
        if self.failing_mounts.contains(&mount.mountpoint) {
            return Err(ProbeError::partial("disk usage", "permission denied"));
        }
        self.mounts
            .iter()
            .find(|(m, _)| m == mount)
            .map(|(_, usage)| *usage)
            .ok_or_else(|| ProbeError::partial("disk usage", "unknown mount"))
    }

    fn volume_at(&mut self, _path: &Path) -> Result<VolumeUsage, ProbeError> {
        self.working_volume
            .ok_or_else(|| ProbeError::unavailable("working directory volume"))
    }

    fn host_info(&mut self) -> HostInfo {
        self.info.clone()
    }
}

/// The two-core scenario: A busy for half the window, B idle, plus the idle
/// pseudo-process that must never be shown.
pub fn two_core_host() -> FakeHost {
    FakeHost::new()
        .with_pass(&[(100, 0), (200, 0), (0, 0)], Some((0, 0)))
        .with_pass(&[(100, 500), (200, 0), (0, 1_000)], Some((500, 2_000)))
        .with_process(100, "A", 200 * 1_048_576)
        .with_process(200, "B", 50 * 1_048_576)
        .with_process(0, "System Idle Process", 0)
}
