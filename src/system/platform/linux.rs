use std::fs;
use std::path::Path;

use super::PlatformExtensions;
use crate::system::error::ProbeError;
use crate::system::sensor::Sensor;
use crate::system::source::{CpuTicks, VolumeUsage};

pub struct Platform;

impl PlatformExtensions for Platform {
    fn global_cpu_ticks() -> Result<CpuTicks, ProbeError> {
        let contents =
            fs::read_to_string("/proc/stat").map_err(|e| ProbeError::io("/proc/stat", &e))?;
        parse_proc_stat(&contents).ok_or_else(|| ProbeError::partial("/proc/stat", "no cpu line"))
    }

    fn volume_usage(path: &Path) -> Result<VolumeUsage, ProbeError> {
        super::unix::statvfs_usage(path)
    }

    fn frequency_sensors() -> Vec<Box<dyn Sensor>> {
        vec![Box::new(ScalingFrequency), Box::new(CpuinfoFrequency)]
    }

    fn temperature_sensors() -> Vec<Box<dyn Sensor>> {
        vec![Box::new(ThermalZones)]
    }
}

/// Parses the aggregate `cpu` line of `/proc/stat`.
fn parse_proc_stat(contents: &str) -> Option<CpuTicks> {
    let line = contents.lines().find(|l| l.starts_with("cpu "))?;
    // user nice system idle iowait irq softirq steal [guest guest_nice]
    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .map(|f| f.parse().ok())
        .collect::<Option<Vec<_>>>()?;
    if fields.len() < 4 {
        return None;
    }
    // guest time is already counted in user/nice
    let total: u64 = fields.iter().take(8).sum();
    let idle = fields[3] + fields.get(4).copied().unwrap_or(0);
    Some(CpuTicks {
        busy: total.saturating_sub(idle),
        total,
    })
}

/// Average of `scaling_cur_freq` across all CPUs.
struct ScalingFrequency;

impl Sensor for ScalingFrequency {
    fn label(&self) -> &'static str {
        "cpufreq"
    }

    fn read(&mut self) -> Result<f64, ProbeError> {
        let entries = fs::read_dir("/sys/devices/system/cpu")
            .map_err(|e| ProbeError::io("cpufreq", &e))?;
        let mut khz = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let is_cpu_dir = name
                .strip_prefix("cpu")
                .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()));
            if !is_cpu_dir {
                continue;
            }
            let path = entry.path().join("cpufreq/scaling_cur_freq");
            if let Ok(raw) = fs::read_to_string(path)
                && let Ok(value) = raw.trim().parse::<f64>()
            {
                khz.push(value);
            }
        }
        if khz.is_empty() {
            return Err(ProbeError::unavailable("cpufreq"));
        }
        Ok(khz.iter().sum::<f64>() / khz.len() as f64 / 1000.0)
    }
}

/// `cpu MHz` lines of `/proc/cpuinfo`, averaged.
struct CpuinfoFrequency;

impl Sensor for CpuinfoFrequency {
    fn label(&self) -> &'static str {
        "cpuinfo"
    }

    fn read(&mut self) -> Result<f64, ProbeError> {
        let contents = fs::read_to_string("/proc/cpuinfo")
            .map_err(|e| ProbeError::io("/proc/cpuinfo", &e))?;
        parse_cpuinfo_mhz(&contents).ok_or_else(|| ProbeError::unavailable("/proc/cpuinfo"))
    }
}

fn parse_cpuinfo_mhz(contents: &str) -> Option<f64> {
    let values: Vec<f64> = contents
        .lines()
        .filter(|l| l.starts_with("cpu MHz"))
        .filter_map(|l| l.split(':').nth(1)?.trim().parse().ok())
        .collect();
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// `/sys/class/thermal/thermal_zone*/temp`, preferring CPU package zones.
struct ThermalZones;

impl Sensor for ThermalZones {
    fn label(&self) -> &'static str {
        "thermal_zone"
    }

    fn read(&mut self) -> Result<f64, ProbeError> {
        let entries = fs::read_dir("/sys/class/thermal")
            .map_err(|e| ProbeError::io("thermal zones", &e))?;
        let mut readings = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !entry
                .file_name()
                .to_str()
                .is_some_and(|n| n.starts_with("thermal_zone"))
            {
                continue;
            }
            let kind = fs::read_to_string(path.join("type")).unwrap_or_default();
            let Ok(raw) = fs::read_to_string(path.join("temp")) else {
                continue;
            };
            let Ok(millidegrees) = raw.trim().parse::<f64>() else {
                continue;
            };
            readings.push((kind.trim().to_string(), millidegrees / 1000.0));
        }
        crate::system::sensor::pick_cpu_temperature(&readings)
            .ok_or_else(|| ProbeError::unavailable("thermal zones"))
    }
}
