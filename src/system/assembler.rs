use std::time::Duration;

use chrono::Local;
use tracing::debug;

use super::error::CaptureError;
use super::probe::{Capabilities, ResourceProbe};
use super::ranker::{ProcessRanker, RawProcess};
use super::sampler::{CpuSample, DeltaSampler, StopSignal};
use super::snapshot::{CpuStats, Snapshot};
use super::source::HostSource;

/// Validated per-capture parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureOptions {
    limit: usize,
    sample_interval: Duration,
}

impl CaptureOptions {
    pub const DEFAULT_LIMIT: usize = 10;
    pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(500);

    /// Rejects negative limits and negative or non-finite intervals.
    pub fn new(limit: i64, sample_interval_secs: f64) -> Result<Self, CaptureError> {
        let limit = usize::try_from(limit).map_err(|_| CaptureError::invalid("limit", limit))?;
        let sample_interval = Duration::try_from_secs_f64(sample_interval_secs)
            .map_err(|_| CaptureError::invalid("sample_interval", sample_interval_secs))?;
        Ok(CaptureOptions {
            limit,
            sample_interval,
        })
    }

    pub fn with_interval(limit: usize, sample_interval: Duration) -> Self {
        CaptureOptions {
            limit,
            sample_interval,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn sample_interval(&self) -> Duration {
        self.sample_interval
    }
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self::with_interval(Self::DEFAULT_LIMIT, Self::DEFAULT_SAMPLE_INTERVAL)
    }
}

/// Runs probe, sampler and ranker against one host and assembles the result.
///
/// `capture` takes `&mut self`, so captures on one assembler never overlap.
pub struct SnapshotAssembler {
    host: Box<dyn HostSource>,
    probe: ResourceProbe,
    sampler: DeltaSampler,
    ranker: ProcessRanker,
}

impl SnapshotAssembler {
    pub fn new(host: Box<dyn HostSource>, probe: ResourceProbe, ranker: ProcessRanker) -> Self {
        SnapshotAssembler {
            host,
            probe,
            sampler: DeltaSampler::new(),
            ranker,
        }
    }

    /// Assembler for the machine this process runs on.
    pub fn for_this_host(capabilities: Capabilities, ranker: ProcessRanker) -> Self {
        Self::new(
            super::host_for(capabilities),
            ResourceProbe::with_host_sensors(capabilities),
            ranker,
        )
    }

    #[tracing::instrument(name = "assembler.capture", level = "debug", skip_all)]
    pub async fn capture(
        &mut self,
        options: &CaptureOptions,
        stop: &mut StopSignal,
    ) -> Result<Snapshot, CaptureError> {
        let started = std::time::Instant::now();
        let host = self.host.as_mut();

        let cpu = self.probe.cpu_snapshot(host);
        let memory = self.probe.memory_snapshot(host);
        let disks = self.probe.disk_snapshot(host);

        let sample = self
            .sampler
            .sample(host, cpu.logical_cores, options.sample_interval(), stop)
            .await?;

        let raw = join_processes(host, &sample);
        let ranking = self.ranker.rank(raw, options.limit());

        let snapshot = Snapshot {
            timestamp: Local::now(),
            host: host.host_info(),
            cpu: CpuStats {
                usage_percent: sample.global_percent,
                ..cpu
            },
            memory,
            disks,
            processes: ranking.top,
            process_totals: ranking.totals,
            process_count: ranking.considered,
        };

        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            ranked = snapshot.process_count,
            disks = snapshot.disks.len(),
            "capture complete"
        );
        Ok(snapshot)
    }
}

/// Pairs the second pass's process list with sampled CPU. Processes without a
/// valid delta (spawned mid-window) are left out.
fn join_processes(host: &mut dyn HostSource, sample: &CpuSample) -> Vec<RawProcess> {
    let entries = match host.processes() {
        Ok(entries) => entries,
        Err(err) => {
            debug!(%err, "process list unavailable");
            return Vec::new();
        }
    };
    entries
        .into_iter()
        .filter_map(|entry| {
            let cpu = sample.per_process.get(&entry.pid)?;
            Some(RawProcess {
                pid: entry.pid,
                name: entry.name,
                cpu_busy_percent: *cpu,
                rss_bytes: entry.rss_bytes,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_reject_caller_contract_violations() {
        assert_eq!(
            CaptureOptions::new(-1, 0.5),
            Err(CaptureError::invalid("limit", -1))
        );
        assert!(CaptureOptions::new(10, -0.5).is_err());
        assert!(CaptureOptions::new(10, f64::NAN).is_err());
        assert!(CaptureOptions::new(10, f64::INFINITY).is_err());
    }

    #[test]
    fn options_accept_zero_values() {
        let options = CaptureOptions::new(0, 0.0).unwrap();
        assert_eq!(options.limit(), 0);
        assert_eq!(options.sample_interval(), Duration::ZERO);
    }

    #[test]
    fn default_options_match_documented_values() {
        let options = CaptureOptions::default();
        assert_eq!(options.limit(), 10);
        assert_eq!(options.sample_interval(), Duration::from_millis(500));
    }
}
