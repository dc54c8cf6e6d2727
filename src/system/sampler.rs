//! Two-pass CPU sampling.
//!
//! CPU utilization only exists over a window: the sampler reads accumulated
//! busy time, waits for the interval on the runtime clock, reads again and
//! divides the difference by the elapsed wall time.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info};

use super::error::{CaptureError, ProbeError};
use super::source::{CpuPass, CpuTicks, HostSource};

/// Per-process and machine-wide utilization over one sampling window.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CpuSample {
    /// Busy percent normalized to the whole machine, keyed by pid.
    pub per_process: HashMap<u32, f64>,
    pub global_percent: Option<f64>,
    pub window: Duration,
}

/// Sending half of a stop signal.
#[derive(Debug)]
pub struct StopHandle {
    tx: watch::Sender<bool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }
}

/// Receiving half of a stop signal; once raised it stays raised.
#[derive(Clone, Debug)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
}

impl StopSignal {
    /// A signal nobody can raise.
    pub fn never() -> Self {
        let (_, signal) = stop_channel();
        signal
    }

    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the signal is raised. Pends forever if the handle is gone.
    pub async fn stopped(&mut self) {
        let raised = self.rx.wait_for(|stopped| *stopped).await.is_ok();
        if !raised {
            std::future::pending::<()>().await;
        }
    }
}

pub fn stop_channel() -> (StopHandle, StopSignal) {
    let (tx, rx) = watch::channel(false);
    (StopHandle { tx }, StopSignal { rx })
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeltaSampler;

impl DeltaSampler {
    pub fn new() -> Self {
        DeltaSampler
    }

    /// Samples every visible process over `interval`.
    ///
    /// Returns [`CaptureError::Cancelled`] if `stop` is raised before the
    /// second pass. Host failures never surface: they shrink the result.
    pub async fn sample(
        &self,
        host: &mut dyn HostSource,
        logical_cores: usize,
        interval: Duration,
        stop: &mut StopSignal,
    ) -> Result<CpuSample, CaptureError> {
        if stop.is_stopped() {
            return Err(CaptureError::Cancelled);
        }

        let before = match host.cpu_pass() {
            Ok(pass) => pass,
            Err(err) if err.is_unavailable() => {
                info!(%err, "process table unavailable, skipping cpu sampling");
                return Ok(CpuSample::default());
            }
            Err(err) => {
                debug!(%err, "first cpu pass failed");
                CpuPass::default()
            }
        };
        let started = Instant::now();

        tokio::select! {
            biased;
            _ = stop.stopped() => return Err(CaptureError::Cancelled),
            _ = tokio::time::sleep(interval) => {}
        }

        let after = host.cpu_pass().unwrap_or_else(|err: ProbeError| {
            debug!(%err, "second cpu pass failed");
            CpuPass::default()
        });
        let window = started.elapsed();

        let per_process = process_deltas(&before.busy, &after.busy, window, logical_cores);
        let global_percent = global_percent(before.global, after.global).or_else(|| {
            host.global_usage_since_last_pass()
                .ok()
                .filter(|v| v.is_finite())
                .map(|v| v.clamp(0.0, 100.0))
        });

        debug!(
            processes = per_process.len(),
            window_ms = window.as_millis() as u64,
            "cpu sample complete"
        );

        Ok(CpuSample {
            per_process,
            global_percent,
            window,
        })
    }
}

/// Busy percent for every pid present in both passes, normalized by core count.
///
/// Counters that went backwards (pid reuse, reset) count as idle.
pub fn process_deltas(
    before: &HashMap<u32, Duration>,
    after: &HashMap<u32, Duration>,
    wall: Duration,
    logical_cores: usize,
) -> HashMap<u32, f64> {
    let wall_secs = wall.as_secs_f64();
    let cores = logical_cores.max(1) as f64;
    after
        .iter()
        .filter_map(|(pid, busy_after)| {
            let busy_before = before.get(pid)?;
            let busy = busy_after.saturating_sub(*busy_before);
            let percent = if wall_secs > 0.0 {
                (busy.as_secs_f64() / wall_secs * 100.0 / cores).clamp(0.0, 100.0)
            } else {
                0.0
            };
            Some((*pid, percent))
        })
        .collect()
}

fn global_percent(before: Option<CpuTicks>, after: Option<CpuTicks>) -> Option<f64> {
    let (before, after) = (before?, after?);
    let total = after.total.checked_sub(before.total)?;
    if total == 0 {
        return None;
    }
    let busy = after.busy.saturating_sub(before.busy);
    Some((busy as f64 / total as f64 * 100.0).clamp(0.0, 100.0))
}
