// src/exec/backend.rs

//! Pluggable launcher abstraction.
//!
//! Supervisors talk to a `Launcher` instead of spawning processes directly.
//! Production code uses [`ProcessLauncher`](super::ProcessLauncher); tests can
//! provide their own implementation that records calls and injects start or
//! kill failures without touching the OS.

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;
use crate::service::ServiceDescriptor;

/// Future returned by [`RunningProcess::terminate`].
pub type TerminateFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;

/// Starts service executables.
pub trait Launcher: Send + Sync {
    /// Start the executable described by `service`.
    ///
    /// Arguments are passed verbatim. The launcher does not wait for the
    /// child to become ready or to listen on its port.
    ///
    /// Errors are expected to be `KabedonError::StartError`.
    fn start(&self, service: &ServiceDescriptor) -> Result<Box<dyn RunningProcess>>;
}

/// Handle to a started service, owned by exactly one supervisor task.
///
/// `terminate` consumes the handle, so a process cannot be terminated twice.
pub trait RunningProcess: Send {
    /// OS process id, if the backend has one.
    fn id(&self) -> Option<u32>;

    /// Terminate the process and wait until it is gone.
    ///
    /// Errors are expected to be `KabedonError::KillError`.
    fn terminate(self: Box<Self>) -> TerminateFuture;
}
