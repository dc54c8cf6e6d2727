use color_eyre::eyre::{Result, eyre};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const CRATE_TARGET: &str = "hostwatch";

/// Installs the global subscriber. Output goes to stderr so reports on stdout stay clean.
pub fn init(level: &str, json: bool) -> Result<()> {
    let env_filter = std::env::var("RUST_LOG").ok();
    let registry = tracing_subscriber::registry().with(resolve_filter(env_filter.as_deref(), level));

    let result = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    result.map_err(|e| eyre!("failed to set tracing subscriber: {e}"))
}

/// `RUST_LOG` wins when it parses; otherwise `level` applies to this crate only.
pub fn resolve_filter(env_filter: Option<&str>, level: &str) -> Targets {
    if let Some(filter) = env_filter.and_then(|f| f.parse::<Targets>().ok()) {
        return filter;
    }
    let level = level.parse::<LevelFilter>().unwrap_or(LevelFilter::WARN);
    Targets::new().with_target(CRATE_TARGET, level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn configured_level_scopes_to_crate() {
        let filter = resolve_filter(None, "debug");
        assert!(filter.would_enable("hostwatch::system::probe", &Level::DEBUG));
        assert!(!filter.would_enable("hostwatch::system::probe", &Level::TRACE));
        assert!(!filter.would_enable("sysinfo", &Level::ERROR));
    }

    #[test]
    fn invalid_level_falls_back_to_warn() {
        let filter = resolve_filter(None, "loud");
        assert!(filter.would_enable("hostwatch", &Level::WARN));
        assert!(!filter.would_enable("hostwatch", &Level::INFO));
    }

    #[test]
    fn env_filter_overrides_config() {
        let filter = resolve_filter(Some("hostwatch=trace"), "error");
        assert!(filter.would_enable("hostwatch", &Level::TRACE));

        let fallback = resolve_filter(Some("hostwatch=loudest"), "info");
        assert!(fallback.would_enable("hostwatch", &Level::INFO));
    }
}
