// src/engine/mod.rs

//! Shutdown coordination engine.
//!
//! This module ties together the events that can end the process:
//! - OS interrupt / termination signals
//! - shutdown requests from the kokoro server
//! - lifecycle reports from supervisor tasks
//! - failures of the collaborator servers
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`]. OS signal handling is in [`signals`].

use std::fmt;

/// Canonical service name type used throughout the engine.
pub type ServiceName = String;

/// Exit status used for every way the coordinator can end the process.
///
/// Graceful drains and fatal failures are not distinguished.
pub const EXIT_STATUS: i32 = 1;

/// Why the shutdown signal was raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownCause {
    /// OS interrupt or termination signal.
    Interrupt { signal: &'static str },
    /// Shutdown requested from inside the system (kokoro server).
    Requested { source: String },
}

impl fmt::Display for ShutdownCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownCause::Interrupt { signal } => write!(f, "{signal} signal"),
            ShutdownCause::Requested { source } => write!(f, "shutdown request from {source}"),
        }
    }
}

/// How the coordinator ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Shutdown ran and the drain policy was satisfied.
    Drained,
    /// A supervisor or server failed irrecoverably.
    Fatal { reason: String },
}

impl ExitOutcome {
    pub fn exit_code(&self) -> i32 {
        EXIT_STATUS
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, ExitOutcome::Fatal { .. })
    }
}

/// Events flowing into the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorEvent {
    /// OS interrupt or termination signal received.
    Interrupt { signal: &'static str },
    /// Internal shutdown request.
    ShutdownRequested { source: String },
    /// A service was launched successfully.
    ServiceRunning { service: ServiceName },
    /// A service could not be launched; it will never confirm an exit.
    ServiceStartFailed { service: ServiceName },
    /// Exit confirmation: a service was terminated after release.
    ServiceExited { service: ServiceName },
    /// A service could not be terminated.
    ServiceFatal { service: ServiceName, error: String },
    /// A collaborator server stopped with an error (e.g. could not bind).
    ServerFailed { server: String, error: String },
}

pub mod core;
pub mod event_handlers;
pub mod runtime;
pub mod signals;

pub use self::core::{CoordinatorCore, Phase};
pub use event_handlers::{CoreCommand, CoreStep};
pub use runtime::Coordinator;
pub use signals::spawn_signal_listener;
