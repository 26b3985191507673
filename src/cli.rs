// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! `--help` is declared by hand instead of using clap's built-in flag because
//! the process must exit with status 1 after printing usage.

use std::io::{self, Write};

use clap::{CommandFactory, Parser, ValueEnum};

pub const DEFAULT_GATEWAY_PORT: u16 = 9990;
pub const DEFAULT_KOKORO_PORT: u16 = 9991;
pub const DEFAULT_NYAA_PORT: u16 = 9995;

/// Command-line arguments for `kabedon-kokoro`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "kabedon-kokoro",
    version,
    about = "Converts REST to gRPC calls, and provides a secondary server to log \
             information and control the gRPC services.",
    long_about = None,
    disable_help_flag = true
)]
pub struct CliArgs {
    /// Prints program help text.
    #[arg(long)]
    pub help: bool,

    /// Run gateway on PORT.
    #[arg(long, value_name = "PORT", default_value_t = DEFAULT_GATEWAY_PORT)]
    pub gateway_port: u16,

    /// Run secondary server on PORT.
    #[arg(long, value_name = "PORT", default_value_t = DEFAULT_KOKORO_PORT)]
    pub kokoro_port: u16,

    /// Run kabedon-nyaa service on PORT.
    ///
    /// Overrides the port of the `nyaa` service from `--config` as well.
    #[arg(long, value_name = "PORT")]
    pub nyaa_port: Option<u16>,

    /// Path to a services file (TOML).
    ///
    /// If omitted, the built-in service set is supervised.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `KABEDON_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve and validate services, print them, but don't launch anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

/// Print usage to stdout.
pub fn print_help() -> io::Result<()> {
    let mut cmd = CliArgs::command();
    cmd.print_help()?;
    writeln!(io::stdout())
}
