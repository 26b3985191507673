// src/supervisor/mod.rs

//! Per-service supervision.
//!
//! One supervisor task runs per configured service. It starts the child,
//! waits for the shutdown signal, terminates the child exactly once and
//! reports back to the coordinator:
//!
//! ```text
//! Starting -> Running -> Releasing -> Terminated
//! Starting -> FailedStart            (only this service is affected)
//! Releasing -> Fatal                 (the whole process goes down)
//! ```

use std::fmt;

pub mod signal;
pub mod task;

pub use signal::{ShutdownListener, ShutdownSignal};
pub use task::{spawn_supervisors, supervise, SupervisorHandle};

/// Lifecycle state of one supervised service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Starting,
    Running,
    Releasing,
    Terminated,
    FailedStart,
    Fatal,
}

impl ServiceState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ServiceState::Terminated | ServiceState::FailedStart | ServiceState::Fatal
        )
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServiceState::Starting => "starting",
            ServiceState::Running => "running",
            ServiceState::Releasing => "releasing",
            ServiceState::Terminated => "terminated",
            ServiceState::FailedStart => "failed_start",
            ServiceState::Fatal => "fatal",
        };
        f.write_str(s)
    }
}
