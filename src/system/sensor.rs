//! Prioritized fallback chains for optional CPU sensors.
//!
//! Each fact (frequency, temperature) is served by a list of [`Sensor`]
//! strategies. The chain returns the first plausible reading and swallows every
//! failure, so callers only ever see a value or `None`.

use sysinfo::{Components, CpuRefreshKind, RefreshKind, System};
use tracing::debug;

use super::error::ProbeError;

/// Temperatures outside this range are treated as bogus sensor output.
const PLAUSIBLE_TEMP_C: std::ops::RangeInclusive<f64> = 0.1..=150.0;

pub trait Sensor: Send {
    fn label(&self) -> &'static str;
    fn read(&mut self) -> Result<f64, ProbeError>;
}

pub struct SensorChain {
    fact: &'static str,
    sensors: Vec<Box<dyn Sensor>>,
}

impl SensorChain {
    pub fn new(fact: &'static str, sensors: Vec<Box<dyn Sensor>>) -> Self {
        Self { fact, sensors }
    }

    pub fn empty(fact: &'static str) -> Self {
        Self::new(fact, Vec::new())
    }

    /// CPU frequency in MHz: platform sources first, then sysinfo.
    pub fn frequency() -> Self {
        let mut sensors = super::platform::frequency_sensors();
        sensors.push(Box::new(SysinfoFrequency::new()));
        Self::new("cpu frequency", sensors)
    }

    /// CPU temperature in °C: sysinfo components first, then platform sources.
    pub fn temperature() -> Self {
        let mut sensors: Vec<Box<dyn Sensor>> = vec![Box::new(ComponentTemperature::new())];
        sensors.extend(super::platform::temperature_sensors());
        Self::new("cpu temperature", sensors)
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.sensors.iter().map(|s| s.label()).collect()
    }

    pub fn read(&mut self) -> Option<f64> {
        for sensor in &mut self.sensors {
            match sensor.read() {
                Ok(value) if value.is_finite() && value > 0.0 => return Some(value),
                Ok(value) => {
                    debug!(fact = self.fact, sensor = sensor.label(), value, "discarding reading");
                }
                Err(err) => {
                    debug!(fact = self.fact, sensor = sensor.label(), %err, "sensor failed");
                }
            }
        }
        None
    }
}

/// Mean frequency across logical CPUs as reported by sysinfo.
pub struct SysinfoFrequency {
    sys: System,
}

impl SysinfoFrequency {
    pub fn new() -> Self {
        let sys = System::new_with_specifics(
            RefreshKind::nothing().with_cpu(CpuRefreshKind::nothing().with_frequency()),
        );
        Self { sys }
    }
}

impl Default for SysinfoFrequency {
    fn default() -> Self {
        Self::new()
    }
}

impl Sensor for SysinfoFrequency {
    fn label(&self) -> &'static str {
        "sysinfo"
    }

    fn read(&mut self) -> Result<f64, ProbeError> {
        self.sys
            .refresh_cpu_specifics(CpuRefreshKind::nothing().with_frequency());
        let cpus = self.sys.cpus();
        if cpus.is_empty() {
            return Err(ProbeError::unavailable("cpu frequency"));
        }
        let sum: u64 = cpus.iter().map(|c| c.frequency()).sum();
        Ok(sum as f64 / cpus.len() as f64)
    }
}

/// Hardware sensors exposed through sysinfo's component list.
pub struct ComponentTemperature {
    components: Components,
}

impl ComponentTemperature {
    pub fn new() -> Self {
        Self {
            components: Components::new_with_refreshed_list(),
        }
    }
}

impl Default for ComponentTemperature {
    fn default() -> Self {
        Self::new()
    }
}

impl Sensor for ComponentTemperature {
    fn label(&self) -> &'static str {
        "components"
    }

    fn read(&mut self) -> Result<f64, ProbeError> {
        self.components.refresh(false);
        let readings: Vec<(String, f64)> = self
            .components
            .iter()
            .filter_map(|c| Some((c.label().to_string(), f64::from(c.temperature()?))))
            .collect();
        pick_cpu_temperature(&readings)
            .ok_or_else(|| ProbeError::unavailable("cpu temperature"))
    }
}

/// Averages CPU-labelled sensors, otherwise takes the hottest plausible one.
pub fn pick_cpu_temperature(readings: &[(String, f64)]) -> Option<f64> {
    let plausible: Vec<&(String, f64)> = readings
        .iter()
        .filter(|(_, t)| PLAUSIBLE_TEMP_C.contains(t))
        .collect();

    let cpu: Vec<f64> = plausible
        .iter()
        .filter(|(label, _)| is_cpu_label(label))
        .map(|(_, t)| *t)
        .collect();
    if !cpu.is_empty() {
        return Some(cpu.iter().sum::<f64>() / cpu.len() as f64);
    }

    plausible.iter().map(|(_, t)| *t).reduce(f64::max)
}

fn is_cpu_label(label: &str) -> bool {
    let lower = label.to_lowercase();
    ["cpu", "package", "tdie", "tctl", "core", "x86_pkg_temp"]
        .iter()
        .any(|needle| lower.contains(needle))
}
