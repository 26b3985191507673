// src/logging.rs

//! Logging setup for `kabedon-kokoro`.
//!
//! The filter is chosen in this order:
//! 1. `--log-level`, applied to every target.
//! 2. `KABEDON_LOG`, read as `EnvFilter` directives, so
//!    `KABEDON_LOG=info,kabedon_kokoro::exec=debug` shows child output only.
//! 3. `info`.
//!
//! Output goes to stderr, interleaved with forwarded child output.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

/// Environment variable holding filter directives.
pub const LOG_ENV: &str = "KABEDON_LOG";

const DEFAULT_DIRECTIVE: &str = "info";

/// Install the global subscriber. Call once, before any service starts.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = build_filter(cli_level, std::env::var(LOG_ENV).ok().as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("installing the tracing subscriber")
}

/// Resolve the effective filter. Unparsable env directives fall back to the
/// default.
fn build_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::new(directive_for(level));
    }

    env.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

fn directive_for(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
