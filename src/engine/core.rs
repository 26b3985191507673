// src/engine/core.rs

//! Pure coordinator state machine.
//!
//! This module contains a synchronous, deterministic core that consumes
//! [`CoordinatorEvent`]s and produces:
//! - an updated core state
//! - a list of commands describing what the IO shell should do next
//!
//! The async shell (`engine::runtime::Coordinator`) is responsible for:
//! - reading events from the channel
//! - raising the shutdown signal
//! - returning the exit outcome
//!
//! The core has no channels, no Tokio types, and performs no IO, so it can
//! be exercised directly in unit and property tests.

use crate::engine::event_handlers::{
    handle_exit_confirmation, handle_fatal, handle_service_running, handle_shutdown_trigger,
    handle_start_failed, CoreStep, ServiceBook, ServiceProgress,
};
use crate::engine::{CoordinatorEvent, ServiceName, ShutdownCause};
use crate::types::DrainPolicy;

/// Coordinator phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for a shutdown trigger.
    Idle,
    /// Shutdown signal broadcast; waiting on exit confirmations.
    Draining,
    /// An exit command was issued; nothing else happens.
    Exited,
}

#[derive(Debug)]
pub struct CoordinatorCore {
    policy: DrainPolicy,
    phase: Phase,
    book: ServiceBook,
}

impl CoordinatorCore {
    /// `services` are the names supervisors will report under.
    pub fn new<I>(services: I, policy: DrainPolicy) -> Self
    where
        I: IntoIterator<Item = ServiceName>,
    {
        let book = services
            .into_iter()
            .map(|name| (name, ServiceProgress::Pending))
            .collect();
        Self {
            policy,
            phase: Phase::Idle,
            book,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn policy(&self) -> DrainPolicy {
        self.policy
    }

    /// The coordinator's view of `service`.
    pub fn progress_of(&self, service: &str) -> Option<ServiceProgress> {
        self.book.get(service).copied()
    }

    /// Handle a single event, updating core state and returning the resulting
    /// commands for the IO shell.
    pub fn step(&mut self, event: CoordinatorEvent) -> CoreStep {
        if self.phase == Phase::Exited {
            return CoreStep {
                commands: Vec::new(),
                keep_running: false,
            };
        }

        match event {
            CoordinatorEvent::Interrupt { signal } => handle_shutdown_trigger(
                &mut self.phase,
                &self.book,
                ShutdownCause::Interrupt { signal },
            ),
            CoordinatorEvent::ShutdownRequested { source } => handle_shutdown_trigger(
                &mut self.phase,
                &self.book,
                ShutdownCause::Requested { source },
            ),
            CoordinatorEvent::ServiceRunning { service } => {
                handle_service_running(&mut self.book, service)
            }
            CoordinatorEvent::ServiceStartFailed { service } => {
                handle_start_failed(&mut self.phase, &mut self.book, service)
            }
            CoordinatorEvent::ServiceExited { service } => handle_exit_confirmation(
                &mut self.phase,
                &mut self.book,
                self.policy,
                service,
            ),
            CoordinatorEvent::ServiceFatal { service, error } => {
                let reason = format!("unable to kill {service}: {error}");
                handle_fatal(&mut self.phase, &mut self.book, Some(service), reason)
            }
            CoordinatorEvent::ServerFailed { server, error } => {
                let reason = format!("{server} server failed: {error}");
                handle_fatal(&mut self.phase, &mut self.book, None, reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{CoreCommand, ExitOutcome};

    fn core(names: &[&str], policy: DrainPolicy) -> CoordinatorCore {
        CoordinatorCore::new(names.iter().map(|s| s.to_string()), policy)
    }

    fn running(name: &str) -> CoordinatorEvent {
        CoordinatorEvent::ServiceRunning {
            service: name.to_string(),
        }
    }

    fn exited(name: &str) -> CoordinatorEvent {
        CoordinatorEvent::ServiceExited {
            service: name.to_string(),
        }
    }

    fn interrupt() -> CoordinatorEvent {
        CoordinatorEvent::Interrupt { signal: "SIGINT" }
    }

    #[test]
    fn idles_until_a_trigger_arrives() {
        let mut c = core(&["a"], DrainPolicy::First);
        let step = c.step(running("a"));
        assert!(step.commands.is_empty());
        assert!(step.keep_running);
        assert_eq!(c.phase(), Phase::Idle);
    }

    #[test]
    fn first_trigger_broadcasts_once() {
        let mut c = core(&["a"], DrainPolicy::First);
        c.step(running("a"));

        let step = c.step(interrupt());
        assert_eq!(
            step.commands,
            vec![CoreCommand::BroadcastShutdown(ShutdownCause::Interrupt {
                signal: "SIGINT"
            })]
        );
        assert_eq!(c.phase(), Phase::Draining);

        let again = c.step(CoordinatorEvent::ShutdownRequested {
            source: "kokoro".to_string(),
        });
        assert!(again.commands.is_empty());
        assert!(again.keep_running);
    }

    #[test]
    fn first_policy_exits_on_first_confirmation() {
        let mut c = core(&["a", "b"], DrainPolicy::First);
        c.step(running("a"));
        c.step(running("b"));
        c.step(interrupt());

        let step = c.step(exited("a"));
        assert_eq!(step.commands, vec![CoreCommand::Exit(ExitOutcome::Drained)]);
        assert!(!step.keep_running);
        assert_eq!(c.phase(), Phase::Exited);
    }

    #[test]
    fn all_policy_waits_for_every_running_service() {
        let mut c = core(&["a", "b", "c"], DrainPolicy::All);
        c.step(running("a"));
        c.step(CoordinatorEvent::ServiceStartFailed {
            service: "b".to_string(),
        });
        c.step(running("c"));
        c.step(interrupt());

        let step = c.step(exited("a"));
        assert!(step.commands.is_empty());
        assert!(step.keep_running);
        assert_eq!(c.progress_of("a"), Some(ServiceProgress::Exited));
        assert_eq!(c.progress_of("b"), Some(ServiceProgress::StartFailed));
        assert_eq!(c.progress_of("c"), Some(ServiceProgress::Running));

        let step = c.step(exited("c"));
        assert_eq!(step.commands, vec![CoreCommand::Exit(ExitOutcome::Drained)]);
    }

    #[test]
    fn drain_with_nothing_running_exits_immediately() {
        let mut c = core(&["a"], DrainPolicy::First);
        c.step(CoordinatorEvent::ServiceStartFailed {
            service: "a".to_string(),
        });

        let step = c.step(interrupt());
        assert_eq!(step.commands.len(), 2);
        assert_eq!(step.commands[1], CoreCommand::Exit(ExitOutcome::Drained));
        assert!(!step.keep_running);
    }

    #[test]
    fn late_start_failure_can_complete_a_drain() {
        let mut c = core(&["a", "b"], DrainPolicy::All);
        c.step(running("a"));
        c.step(interrupt());
        c.step(exited("a"));

        let step = c.step(CoordinatorEvent::ServiceStartFailed {
            service: "b".to_string(),
        });
        assert_eq!(step.commands, vec![CoreCommand::Exit(ExitOutcome::Drained)]);
    }

    #[test]
    fn kill_failure_is_fatal_even_while_draining() {
        let mut c = core(&["a", "b"], DrainPolicy::All);
        c.step(running("a"));
        c.step(running("b"));
        c.step(interrupt());

        let step = c.step(CoordinatorEvent::ServiceFatal {
            service: "a".to_string(),
            error: "permission denied".to_string(),
        });
        match &step.commands[..] {
            [CoreCommand::Exit(ExitOutcome::Fatal { reason })] => {
                assert!(reason.contains("unable to kill a"));
                assert!(reason.contains("permission denied"));
            }
            other => panic!("expected fatal exit, got {other:?}"),
        }
        assert!(!step.keep_running);
        assert_eq!(c.progress_of("a"), Some(ServiceProgress::Fatal));
        assert_eq!(c.progress_of("zzz"), None);
    }

    #[test]
    fn server_failure_is_fatal_while_idle() {
        let mut c = core(&["a"], DrainPolicy::First);
        let step = c.step(CoordinatorEvent::ServerFailed {
            server: "gateway".to_string(),
            error: "address in use".to_string(),
        });
        assert!(matches!(
            &step.commands[..],
            [CoreCommand::Exit(ExitOutcome::Fatal { .. })]
        ));
    }

    #[test]
    fn nothing_happens_after_exit() {
        let mut c = core(&["a"], DrainPolicy::First);
        c.step(running("a"));
        c.step(interrupt());
        c.step(exited("a"));

        let step = c.step(interrupt());
        assert!(step.commands.is_empty());
        assert!(!step.keep_running);
    }
}
