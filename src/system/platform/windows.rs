use std::os::windows::ffi::OsStrExt;
use std::path::Path;

use windows_sys::Win32::Storage::FileSystem::GetDiskFreeSpaceExW;
use windows_sys::Win32::System::Power::{
    CallNtPowerInformation, PROCESSOR_POWER_INFORMATION, ProcessorInformation,
};

use super::PlatformExtensions;
use crate::system::error::ProbeError;
use crate::system::sensor::Sensor;
use crate::system::source::{CpuTicks, VolumeUsage};

pub struct Platform;

impl PlatformExtensions for Platform {
    fn global_cpu_ticks() -> Result<CpuTicks, ProbeError> {
        Err(ProbeError::unavailable("global cpu ticks"))
    }

    fn volume_usage(path: &Path) -> Result<VolumeUsage, ProbeError> {
        let wide: Vec<u16> = path
            .as_os_str()
            .encode_wide()
            .chain(std::iter::once(0))
            .collect();
        let mut free_to_caller: u64 = 0;
        let mut total: u64 = 0;
        let mut total_free: u64 = 0;
        // SAFETY: `wide` is NUL-terminated and the out pointers are valid for writes.
        let ok = unsafe {
            GetDiskFreeSpaceExW(
                wide.as_ptr(),
                &mut free_to_caller,
                &mut total,
                &mut total_free,
            )
        };
        if ok == 0 {
            return Err(ProbeError::io(
                "volume usage",
                &std::io::Error::last_os_error(),
            ));
        }
        Ok(VolumeUsage {
            total,
            free: free_to_caller,
        })
    }

    fn frequency_sensors() -> Vec<Box<dyn Sensor>> {
        vec![Box::new(PowerInformationFrequency)]
    }

    fn temperature_sensors() -> Vec<Box<dyn Sensor>> {
        Vec::new()
    }
}

/// Current MHz per processor from the power manager, averaged.
struct PowerInformationFrequency;

impl Sensor for PowerInformationFrequency {
    fn label(&self) -> &'static str {
        "power_information"
    }

    fn read(&mut self) -> Result<f64, ProbeError> {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let mut info: Vec<PROCESSOR_POWER_INFORMATION> =
            vec![unsafe { std::mem::zeroed() }; cores];
        let len = (std::mem::size_of::<PROCESSOR_POWER_INFORMATION>() * cores) as u32;
        // SAFETY: the output buffer holds `cores` entries and `len` matches its size.
        let status = unsafe {
            CallNtPowerInformation(
                ProcessorInformation,
                std::ptr::null(),
                0,
                info.as_mut_ptr().cast(),
                len,
            )
        };
        if status != 0 {
            return Err(ProbeError::partial(
                "power information",
                format!("NTSTATUS {status:#x}"),
            ));
        }
        let sum: u64 = info.iter().map(|p| u64::from(p.CurrentMhz)).sum();
        Ok(sum as f64 / cores as f64)
    }
}
