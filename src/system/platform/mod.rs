use std::path::Path;

use super::error::ProbeError;
use super::sensor::Sensor;
use super::source::{CpuTicks, VolumeUsage};

pub trait PlatformExtensions {
    /// Machine-wide cumulative busy/total CPU ticks.
    fn global_cpu_ticks() -> Result<CpuTicks, ProbeError>;
    /// Size and free space of the volume holding `path`.
    fn volume_usage(path: &Path) -> Result<VolumeUsage, ProbeError>;
    /// Native frequency sources in MHz, most precise first.
    fn frequency_sensors() -> Vec<Box<dyn Sensor>>;
    /// Native temperature sources in °C, consulted after sysinfo's components.
    fn temperature_sensors() -> Vec<Box<dyn Sensor>>;
}

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(unix)]
mod unix;
#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(target_os = "macos")]
use macos as platform_impl;
#[cfg(target_os = "windows")]
use windows as platform_impl;

pub fn global_cpu_ticks() -> Result<CpuTicks, ProbeError> {
    platform_impl::Platform::global_cpu_ticks()
}

pub fn volume_usage(path: &Path) -> Result<VolumeUsage, ProbeError> {
    platform_impl::Platform::volume_usage(path)
}

pub fn frequency_sensors() -> Vec<Box<dyn Sensor>> {
    platform_impl::Platform::frequency_sensors()
}

pub fn temperature_sensors() -> Vec<Box<dyn Sensor>> {
    platform_impl::Platform::temperature_sensors()
}
