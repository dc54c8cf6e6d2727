use std::ffi::CString;
use std::path::Path;

use super::PlatformExtensions;
use crate::system::error::ProbeError;
use crate::system::sensor::Sensor;
use crate::system::source::{CpuTicks, VolumeUsage};

pub struct Platform;

impl PlatformExtensions for Platform {
    fn global_cpu_ticks() -> Result<CpuTicks, ProbeError> {
        // host_statistics ticks are not exposed here; sysinfo's global usage covers macOS
        Err(ProbeError::unavailable("global cpu ticks"))
    }

    fn volume_usage(path: &Path) -> Result<VolumeUsage, ProbeError> {
        super::unix::statvfs_usage(path)
    }

    fn frequency_sensors() -> Vec<Box<dyn Sensor>> {
        vec![Box::new(SysctlFrequency)]
    }

    fn temperature_sensors() -> Vec<Box<dyn Sensor>> {
        Vec::new()
    }
}

/// `hw.cpufrequency`, only present on Intel Macs.
struct SysctlFrequency;

impl Sensor for SysctlFrequency {
    fn label(&self) -> &'static str {
        "sysctl"
    }

    fn read(&mut self) -> Result<f64, ProbeError> {
        let name = CString::new("hw.cpufrequency")
            .map_err(|e| ProbeError::partial("sysctl", e.to_string()))?;
        let mut hz: u64 = 0;
        let mut len = std::mem::size_of::<u64>();
        // SAFETY: `hz` and `len` describe a writable buffer of the advertised size.
        let rc = unsafe {
            libc::sysctlbyname(
                name.as_ptr(),
                (&mut hz as *mut u64).cast(),
                &mut len,
                std::ptr::null_mut(),
                0,
            )
        };
        if rc != 0 {
            return Err(ProbeError::unavailable("hw.cpufrequency"));
        }
        Ok(hz as f64 / 1_000_000.0)
    }
}
