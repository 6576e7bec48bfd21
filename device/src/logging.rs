//! Diagnostics for the device binary.
//!
//! A device usually runs `send` from a cron job or a boot script and a
//! supervisor collects whatever it prints. Stdout is reserved for the one
//! line the caller parses (a transaction id, an address), so every tracing
//! event goes to stderr.
//!
//! `--log-format json` suits a log shipper. The default `pretty` output
//! drops ANSI colors when stderr is not a terminal, which keeps serial
//! consoles and captured files readable.

use std::io::IsTerminal;

use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Install the global subscriber. Call once, before the first event.
///
/// `RUST_LOG`, when set and valid, replaces `default_filter`; for example
/// `RUST_LOG=sensorpay_protocol=debug` shows each submission stage.
pub fn init_logging(default_filter: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(std::io::stderr().is_terminal())
                    .with_target(false),
            )
            .init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(false),
            )
            .init(),
    }

    tracing::debug!(?format, "diagnostics on stderr");
}
