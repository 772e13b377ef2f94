//! Logger setup built on `tracing-subscriber`
//!
//! Console output with optional colours, plus an optional file sink in
//! full, compact or JSON format with size-based rotation.

pub mod config;
pub mod error;
pub(crate) mod writer;

pub use config::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig, RotationConfig};
pub use error::LoggerError;

use std::io::IsTerminal;

use tracing::Subscriber;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use writer::RotatingFileWriter;

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `config.level` when set.
pub fn init_logger(config: LoggerConfig) -> anyhow::Result<()> {
    config.validate()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    match (config.console.enabled, config.file.enabled) {
        (true, true) => init_both(&config, filter)?,
        (true, false) => init_console_only(&config.console, filter)?,
        (false, true) => init_file_only(&config.file, filter)?,
        (false, false) => anyhow::bail!("At least one output (console or file) must be enabled"),
    }

    Ok(())
}

fn use_ansi(config: &ConsoleConfig) -> bool {
    config.colored && std::io::stdout().is_terminal()
}

fn console_layer<S>(config: &ConsoleConfig) -> fmt::Layer<S> {
    fmt::layer()
        .with_ansi(use_ansi(config))
        .with_target(true)
        .with_level(true)
}

fn init_console_only(config: &ConsoleConfig, filter: EnvFilter) -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer(config))
        .try_init()?;
    Ok(())
}

fn init_file_only(config: &FileConfig, filter: EnvFilter) -> anyhow::Result<()> {
    let writer = RotatingFileWriter::new(config)?;
    let base = fmt::layer().with_ansi(false).with_target(true);

    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Full => registry.with(base.with_writer(writer)).try_init()?,
        LogFormat::Compact => registry
            .with(base.compact().with_writer(writer))
            .try_init()?,
        LogFormat::Json => registry.with(base.json().with_writer(writer)).try_init()?,
    }

    Ok(())
}

fn init_both(config: &LoggerConfig, filter: EnvFilter) -> anyhow::Result<()> {
    build_both(config, filter)?.try_init()?;
    Ok(())
}

type BoxedSubscriber = Box<dyn Subscriber + Send + Sync>;

/// Console plus file subscriber, not yet installed.
fn build_both(config: &LoggerConfig, filter: EnvFilter) -> Result<BoxedSubscriber, LoggerError> {
    let writer = RotatingFileWriter::new(&config.file)?;
    let file_base = fmt::layer().with_ansi(false).with_target(true);

    // File layer goes first, otherwise ANSI codes from the console layer leak
    // into span fields written to the file (tokio-rs/tracing#1817).
    let registry = tracing_subscriber::registry().with(filter);
    let subscriber: BoxedSubscriber = match config.file.format {
        LogFormat::Full => Box::new(
            registry
                .with(file_base.with_writer(writer))
                .with(console_layer(&config.console)),
        ),
        LogFormat::Compact => Box::new(
            registry
                .with(file_base.compact().with_writer(writer))
                .with(console_layer(&config.console)),
        ),
        LogFormat::Json => Box::new(
            registry
                .with(file_base.json().with_writer(writer))
                .with(console_layer(&config.console)),
        ),
    };

    Ok(subscriber)
}
