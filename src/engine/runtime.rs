// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::supervisor::ShutdownSignal;

use super::core::{CoordinatorCore, Phase};
use super::{CoordinatorEvent, CoreCommand, ExitOutcome};

/// The shutdown coordination loop.
///
/// This is an IO shell around `CoordinatorCore`, which holds all the
/// decision logic. This struct reads events from the channel, logs them,
/// and is the only place the shutdown signal is ever raised.
pub struct Coordinator {
    core: CoordinatorCore,
    event_rx: mpsc::Receiver<CoordinatorEvent>,
    signal: ShutdownSignal,
}

impl fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("core", &self.core)
            .field("signal", &self.signal)
            .finish_non_exhaustive()
    }
}

impl Coordinator {
    pub fn new(
        core: CoordinatorCore,
        event_rx: mpsc::Receiver<CoordinatorEvent>,
        signal: ShutdownSignal,
    ) -> Self {
        Self {
            core,
            event_rx,
            signal,
        }
    }

    /// Main event loop.
    ///
    /// Runs until the core issues an exit command and returns how it ended.
    /// The caller decides what to do with the outcome (the binary exits the
    /// process with its exit code).
    pub async fn run(mut self) -> ExitOutcome {
        info!(policy = %self.core.policy(), "graceful shutdown loop started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    warn!("coordinator event channel closed; exiting");
                    return ExitOutcome::Drained;
                }
            };

            debug!(?event, "coordinator received event");
            self.log_event(&event);

            let step = self.core.step(event);

            let mut outcome = None;
            for command in step.commands {
                match command {
                    CoreCommand::BroadcastShutdown(cause) => {
                        if self.signal.raise() {
                            info!(%cause, "shutdown signal broadcast to all services");
                        }
                    }
                    CoreCommand::Exit(o) => outcome = Some(o),
                }
            }

            if !step.keep_running {
                let outcome = outcome.unwrap_or(ExitOutcome::Drained);
                match &outcome {
                    ExitOutcome::Drained => info!("exit signal received. Program exited."),
                    ExitOutcome::Fatal { reason } => error!(%reason, "fatal exit"),
                }
                return outcome;
            }
        }
    }

    fn log_event(&self, event: &CoordinatorEvent) {
        let draining = self.core.phase() != Phase::Idle;
        match event {
            CoordinatorEvent::Interrupt { signal } => {
                if draining {
                    debug!(signal, "interrupt signal received while draining; ignoring");
                } else {
                    info!(signal, "interrupt signal received");
                }
            }
            CoordinatorEvent::ShutdownRequested { source } => {
                if draining {
                    debug!(%source, "shutdown signal received while draining; ignoring");
                } else {
                    info!(%source, "shutdown signal received");
                }
            }
            CoordinatorEvent::ServiceRunning { service } => {
                debug!(service = %service, "service reported running");
            }
            CoordinatorEvent::ServiceStartFailed { service } => {
                warn!(service = %service, "service never started; it will not be supervised");
            }
            CoordinatorEvent::ServiceExited { service } => {
                info!(service = %service, "exit confirmation received");
            }
            CoordinatorEvent::ServiceFatal { service, error } => {
                error!(service = %service, %error, "service could not be terminated");
            }
            CoordinatorEvent::ServerFailed { server, error } => {
                error!(%server, %error, "server failed");
            }
        }
    }
}
