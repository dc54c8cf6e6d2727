use std::io::stdout;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::Result;
use hostwatch::config::{Config, load_config, load_config_from_path};
use hostwatch::driver::{self, Driver, OutputFormat};
use hostwatch::logging;
use hostwatch::system::{self, assembler::CaptureOptions, assembler::SnapshotAssembler};
use hostwatch::system::ranker::ProcessRanker;
use hostwatch::system::sampler::stop_channel;
use tracing::{debug, info};

#[derive(Parser)]
#[command(
    name = "hostwatch",
    about = "Host resource monitor: CPU, memory, disks and the busiest processes"
)]
struct Cli {
    /// Refresh continuously, every SECS seconds (config value or 2 when omitted)
    #[arg(short, long, value_name = "SECS", num_args = 0..=1, allow_negative_numbers = true)]
    continuous: Option<Option<String>>,

    /// Number of processes to show
    #[arg(long, allow_negative_numbers = true)]
    top: Option<i64>,

    /// CPU sampling window in milliseconds
    #[arg(long, allow_negative_numbers = true)]
    sample_ms: Option<i64>,

    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print snapshots as JSON instead of the text report
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Log level for stderr diagnostics: error, warn, info, debug, trace
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli);
    logging::init(&config.logging.level, config.logging.json)?;

    let options = CaptureOptions::new(
        config.general.top_n,
        config.general.sample_interval_ms as f64 / 1000.0,
    )?;
    let capabilities = system::detect_capabilities();
    info!(full_probe = capabilities.full_probe, "host capabilities detected");

    let ranker = ProcessRanker::with_hidden(&config.processes.hide);
    let assembler = SnapshotAssembler::for_this_host(capabilities, ranker);
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let (handle, mut stop) = stop_channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.stop();
        }
    });

    let mut driver = Driver::new(assembler, options, format, stdout().lock());
    match &cli.continuous {
        None => driver.run_once(&mut stop).await,
        Some(raw) => {
            let refresh = driver::resolve_refresh_interval(
                raw.as_deref(),
                config.general.refresh_interval_secs,
            );
            if let Some(warning) = &refresh.warning {
                debug!(raw = ?raw, "rejected refresh interval");
                eprintln!("{warning}");
            }
            driver.run_continuous(refresh.duration(), &mut stop).await
        }
    }
}

fn load_config_for_cli(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(top) = cli.top {
        config.general.top_n = top;
    }
    if let Some(ms) = cli.sample_ms {
        config.general.sample_interval_ms = ms;
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }

    config
}
