// src/supervisor/task.rs

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::engine::CoordinatorEvent;
use crate::exec::Launcher;
use crate::service::{ServiceDescriptor, ServiceMap};
use crate::supervisor::signal::{ShutdownListener, ShutdownSignal};
use crate::supervisor::ServiceState;

/// A spawned supervisor task and the service it looks after.
#[derive(Debug)]
pub struct SupervisorHandle {
    pub service: String,
    pub handle: JoinHandle<ServiceState>,
}

/// Spawn one supervisor task per service.
///
/// Listeners are subscribed here, before any task runs, so no supervisor can
/// miss the signal regardless of scheduling order.
pub fn spawn_supervisors(
    services: &ServiceMap,
    launcher: Arc<dyn Launcher>,
    signal: &ShutdownSignal,
    events: &mpsc::Sender<CoordinatorEvent>,
) -> Vec<SupervisorHandle> {
    services
        .values()
        .map(|service| {
            let fut = supervise(
                service.clone(),
                Arc::clone(&launcher),
                signal.subscribe(),
                events.clone(),
            );
            SupervisorHandle {
                service: service.name.clone(),
                handle: tokio::spawn(fut),
            }
        })
        .collect()
}

/// Drive one service through its lifecycle and return the state it ended in.
///
/// The running process handle never leaves this function: it is created
/// here, and consumed here by `terminate`.
pub async fn supervise(
    service: ServiceDescriptor,
    launcher: Arc<dyn Launcher>,
    mut release: ShutdownListener,
    events: mpsc::Sender<CoordinatorEvent>,
) -> ServiceState {
    let name = service.name.clone();
    debug!(service = %name, state = %ServiceState::Starting, "supervisor started");

    let process = match launcher.start(&service) {
        Ok(process) => process,
        Err(err) => {
            error!(service = %name, error = %err, "unable to start service");
            error!(
                service = %name,
                path = %service.full_path().display(),
                args = ?service.args,
                port = service.port,
                "{:?}",
                service
            );
            report(&events, CoordinatorEvent::ServiceStartFailed { service: name }).await;
            return ServiceState::FailedStart;
        }
    };

    info!(
        service = %name,
        path = %service.full_path().display(),
        port = service.port,
        pid = ?process.id(),
        "running {} on port={}",
        service.full_path().display(),
        service.port
    );
    report(
        &events,
        CoordinatorEvent::ServiceRunning {
            service: name.clone(),
        },
    )
    .await;

    if !release.wait().await {
        // Coordinator is gone without raising the signal. The handle is
        // dropped here and kill_on_drop reclaims the child.
        debug!(service = %name, "shutdown signal source dropped; abandoning service");
        return ServiceState::Running;
    }

    debug!(service = %name, state = %ServiceState::Releasing, "release observed");

    match process.terminate().await {
        Ok(()) => {
            info!(service = %name, "killed {}", service.binary);
            info!(service = %name, "{} exited", service.binary);
            report(&events, CoordinatorEvent::ServiceExited { service: name }).await;
            ServiceState::Terminated
        }
        Err(err) => {
            error!(service = %name, error = %err, "unable to kill {}", service.binary);
            report(
                &events,
                CoordinatorEvent::ServiceFatal {
                    service: name,
                    error: err.to_string(),
                },
            )
            .await;
            ServiceState::Fatal
        }
    }
}

async fn report(events: &mpsc::Sender<CoordinatorEvent>, event: CoordinatorEvent) {
    if let Err(e) = events.send(event).await {
        debug!(event = ?e.0, "coordinator no longer listening; dropping event");
    }
}
