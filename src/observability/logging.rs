//! # Process Logging
//!
//! Installs the `tracing` subscriber used for process diagnostics: file-open
//! failures of the access-log writer, the counting transport's verbose lines,
//! and the demo server's lifecycle messages.
//!
//! Access-log lines themselves never go through `tracing`; the writer task
//! emits them verbatim so the Combined Log Format stays byte exact.

use tracing::{info, warn, Level};
use tracing_subscriber::{
    fmt::{self, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

use crate::core::error::TrafficLogResult;
use crate::observability::config::{LogConfig, LogFormat, LogOutput};

/// Map a configured level name onto a `tracing` level, defaulting to INFO
pub fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn make_writer(output: LogOutput) -> BoxMakeWriter {
    match output {
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
    }
}

/// Initialize the global tracing subscriber
///
/// `RUST_LOG` directives take precedence; the configured level is added as
/// the default directive. An already-installed subscriber is left in place.
pub fn init_logging(config: &LogConfig) -> TrafficLogResult<()> {
    let level = parse_level(&config.level);
    let env_filter = EnvFilter::from_default_env().add_directive(level.into());
    let writer = make_writer(config.output);

    let result = match config.format {
        LogFormat::Json => Registry::default()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true)
                    .with_writer(writer),
            )
            .try_init(),
        LogFormat::Text => Registry::default()
            .with(env_filter)
            .with(fmt::layer().with_target(true).with_writer(writer))
            .try_init(),
    };

    if result.is_err() {
        warn!("Tracing subscriber already initialized, skipping initialization");
        return Ok(());
    }

    info!(level = %level, format = ?config.format, "Process logging initialized");
    Ok(())
}
