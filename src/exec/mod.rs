// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually starting the configured service
//! executables with `tokio::process::Command` and terminating them again on
//! request.
//!
//! - [`backend`] provides the `Launcher` / `RunningProcess` traits the
//!   supervisors talk to, so tests can swap in a fake launcher.
//! - [`process`] is the production launcher backed by OS processes.
//! - [`output`] forwards child stdout/stderr into the log.

pub mod backend;
pub mod output;
pub mod process;

pub use backend::{Launcher, RunningProcess, TerminateFuture};
pub use process::{ChildProcess, ProcessLauncher};
