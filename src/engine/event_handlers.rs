// src/engine/event_handlers.rs

//! Event handling logic for the coordinator core.

use std::collections::BTreeMap;

use crate::engine::core::Phase;
use crate::engine::{ExitOutcome, ServiceName, ShutdownCause};
use crate::types::DrainPolicy;

/// The coordinator's view of one service, built only from supervisor reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceProgress {
    /// No report yet.
    Pending,
    Running,
    StartFailed,
    Exited,
    Fatal,
}

impl ServiceProgress {
    /// Nothing more will be heard from this service during a drain.
    pub fn is_settled(self) -> bool {
        matches!(self, ServiceProgress::StartFailed | ServiceProgress::Exited)
    }
}

pub type ServiceBook = BTreeMap<ServiceName, ServiceProgress>;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Raise the shutdown signal for every supervisor.
    BroadcastShutdown(ShutdownCause),
    /// End the process.
    Exit(ExitOutcome),
}

/// Decision returned by the core after handling a single `CoordinatorEvent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreStep {
    /// Commands the IO shell should execute, in order.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    pub fn idle() -> Self {
        Self {
            commands: Vec::new(),
            keep_running: true,
        }
    }

    fn exit(phase: &mut Phase, mut commands: Vec<CoreCommand>, outcome: ExitOutcome) -> Self {
        *phase = Phase::Exited;
        commands.push(CoreCommand::Exit(outcome));
        Self {
            commands,
            keep_running: false,
        }
    }
}

/// Handle an OS interrupt or an internal shutdown request.
///
/// Only the first one while idle broadcasts; later ones are ignored.
pub fn handle_shutdown_trigger(
    phase: &mut Phase,
    book: &ServiceBook,
    cause: ShutdownCause,
) -> CoreStep {
    if *phase != Phase::Idle {
        return CoreStep::idle();
    }

    *phase = Phase::Draining;
    let commands = vec![CoreCommand::BroadcastShutdown(cause)];

    // Nothing running means nothing will ever confirm.
    if drain_complete(book) {
        return CoreStep::exit(phase, commands, ExitOutcome::Drained);
    }

    CoreStep {
        commands,
        keep_running: true,
    }
}

/// Handle a successful launch report.
pub fn handle_service_running(book: &mut ServiceBook, service: ServiceName) -> CoreStep {
    book.insert(service, ServiceProgress::Running);
    CoreStep::idle()
}

/// Handle a start failure. Never fatal; may complete a drain.
pub fn handle_start_failed(
    phase: &mut Phase,
    book: &mut ServiceBook,
    service: ServiceName,
) -> CoreStep {
    book.insert(service, ServiceProgress::StartFailed);
    maybe_finish_drain(phase, book)
}

/// Handle an exit confirmation.
///
/// With [`DrainPolicy::First`] the first confirmation ends the process; with
/// [`DrainPolicy::All`] the process ends once every service is settled.
pub fn handle_exit_confirmation(
    phase: &mut Phase,
    book: &mut ServiceBook,
    policy: DrainPolicy,
    service: ServiceName,
) -> CoreStep {
    book.insert(service, ServiceProgress::Exited);

    match policy {
        DrainPolicy::First => CoreStep::exit(phase, Vec::new(), ExitOutcome::Drained),
        DrainPolicy::All => maybe_finish_drain(phase, book),
    }
}

/// Handle an unrecoverable failure. Always ends the process.
pub fn handle_fatal(
    phase: &mut Phase,
    book: &mut ServiceBook,
    service: Option<ServiceName>,
    reason: String,
) -> CoreStep {
    if let Some(service) = service {
        book.insert(service, ServiceProgress::Fatal);
    }
    CoreStep::exit(phase, Vec::new(), ExitOutcome::Fatal { reason })
}

fn maybe_finish_drain(phase: &mut Phase, book: &ServiceBook) -> CoreStep {
    if *phase == Phase::Draining && drain_complete(book) {
        return CoreStep::exit(phase, Vec::new(), ExitOutcome::Drained);
    }
    CoreStep::idle()
}

fn drain_complete(book: &ServiceBook) -> bool {
    book.values().all(|p| p.is_settled())
}
