//! Single-shot and continuous capture loops around a [`SnapshotAssembler`].

use std::io::Write;
use std::time::Duration;

use color_eyre::Result;
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};
use tracing::info;

use crate::report;
use crate::system::assembler::{CaptureOptions, SnapshotAssembler};
use crate::system::error::CaptureError;
use crate::system::sampler::StopSignal;
use crate::system::snapshot::Snapshot;

pub const DEFAULT_REFRESH_SECS: u64 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RefreshInterval {
    pub secs: u64,
    /// Set when the requested value was rejected.
    pub warning: Option<String>,
}

impl RefreshInterval {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.secs)
    }
}

/// Interprets the `--continuous` argument. A missing value uses `fallback`;
/// anything that is not a positive integer uses the 2 second default and warns.
pub fn resolve_refresh_interval(raw: Option<&str>, fallback: u64) -> RefreshInterval {
    let Some(raw) = raw else {
        return RefreshInterval {
            secs: if fallback > 0 {
                fallback
            } else {
                DEFAULT_REFRESH_SECS
            },
            warning: None,
        };
    };
    match raw.trim().parse::<i64>() {
        Ok(secs) if secs > 0 => RefreshInterval {
            secs: secs as u64,
            warning: None,
        },
        _ => RefreshInterval {
            secs: DEFAULT_REFRESH_SECS,
            warning: Some(format!(
                "Invalid interval {raw:?}. Using default of {DEFAULT_REFRESH_SECS} seconds."
            )),
        },
    }
}

pub struct Driver<W: Write> {
    assembler: SnapshotAssembler,
    options: CaptureOptions,
    format: OutputFormat,
    out: W,
}

impl<W: Write> Driver<W> {
    pub fn new(
        assembler: SnapshotAssembler,
        options: CaptureOptions,
        format: OutputFormat,
        out: W,
    ) -> Self {
        Driver {
            assembler,
            options,
            format,
            out,
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Captures and prints once. A stop during the capture prints nothing.
    pub async fn run_once(&mut self, stop: &mut StopSignal) -> Result<()> {
        let Some(snapshot) = self.capture(stop).await? else {
            return Ok(());
        };
        match self.format {
            OutputFormat::Text => {
                writeln!(self.out, "{}", report::render_text(&snapshot))?;
                writeln!(self.out)?;
                writeln!(self.out, "For continuous monitoring, run:")?;
                writeln!(self.out, "   hostwatch --continuous [interval_seconds]")?;
            }
            OutputFormat::Json => {
                writeln!(self.out, "{}", report::render_json(&snapshot)?)?;
            }
        }
        self.out.flush()?;
        Ok(())
    }

    /// Captures, prints and waits `refresh` until `stop` is raised.
    ///
    /// The next capture starts only after the previous one and the wait have
    /// completed.
    pub async fn run_continuous(&mut self, refresh: Duration, stop: &mut StopSignal) -> Result<()> {
        info!(refresh_secs = refresh.as_secs(), "starting continuous monitoring");
        loop {
            let Some(snapshot) = self.capture(stop).await? else {
                break;
            };
            self.print_frame(&snapshot, refresh)?;

            tokio::select! {
                biased;
                _ = stop.stopped() => break,
                _ = tokio::time::sleep(refresh) => {}
            }
        }
        if self.format == OutputFormat::Text {
            writeln!(self.out, "\n\nMonitoring stopped. Goodbye!")?;
        }
        self.out.flush()?;
        Ok(())
    }

    async fn capture(&mut self, stop: &mut StopSignal) -> Result<Option<Snapshot>> {
        match self.assembler.capture(&self.options, stop).await {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(CaptureError::Cancelled) => {
                info!("capture cancelled");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn print_frame(&mut self, snapshot: &Snapshot, refresh: Duration) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                execute!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
                writeln!(self.out, "{}", report::render_text(snapshot))?;
                writeln!(
                    self.out,
                    "\nRefreshing every {} seconds... Press Ctrl+C to stop",
                    refresh.as_secs()
                )?;
            }
            OutputFormat::Json => {
                writeln!(self.out, "{}", serde_json::to_string(snapshot)?)?;
            }
        }
        self.out.flush()?;
        Ok(())
    }
}
