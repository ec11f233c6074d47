//! Tracing subscriber setup for the binary.

use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

fn build_filter(verbose: bool) -> Result<EnvFilter, tracing_subscriber::filter::ParseError> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level))
        .add_directive(
            format!("flight_finder={}", if verbose { "debug" } else { "info" }).parse()?,
        );
    Ok(filter)
}

/// Initialize logging.
///
/// With `log_dir`, logs go to a daily-rolling file `flight-finder.log.*` in that
/// directory; otherwise they go to stderr so they don't mix with results on stdout.
/// `RUST_LOG` overrides the default levels.
pub fn init_logging(
    log_dir: Option<&Path>,
    format: LogFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let filter = build_filter(verbose)?;

    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = tracing_appender::rolling::daily(dir, "flight-finder.log");
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true);

            let registry = tracing_subscriber::registry().with(filter);
            match format {
                LogFormat::Json => registry.with(layer.json()).try_init()?,
                LogFormat::Pretty => registry.with(layer).try_init()?,
            }
            info!(
                dir = %dir.display(),
                "Logging initialized - logs will be written to flight-finder.log.*"
            );
        }
        None => {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false);

            let registry = tracing_subscriber::registry().with(filter);
            match format {
                LogFormat::Json => registry.with(layer.json()).try_init()?,
                LogFormat::Pretty => registry.with(layer).try_init()?,
            }
        }
    }

    debug!("Debug logging is enabled");
    Ok(())
}
