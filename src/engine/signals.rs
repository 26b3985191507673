// src/engine/signals.rs

//! OS signal handling.
//!
//! SIGINT and SIGTERM (Ctrl-C on non-unix platforms) are intercepted and
//! turned into `CoordinatorEvent::Interrupt` so the default OS termination
//! never runs. Every signal received is forwarded; the coordinator decides
//! whether it still matters.

use std::io;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::engine::CoordinatorEvent;

/// Spawn the signal listener task.
///
/// Handlers are installed before this returns, so a signal arriving right
/// after startup is not lost.
pub fn spawn_signal_listener(tx: mpsc::Sender<CoordinatorEvent>) -> io::Result<JoinHandle<()>> {
    let mut signals = Signals::install()?;

    Ok(tokio::spawn(async move {
        loop {
            let signal = match signals.recv().await {
                Some(signal) => signal,
                None => {
                    error!("signal stream closed; interrupts will no longer be handled");
                    return;
                }
            };

            if tx.send(CoordinatorEvent::Interrupt { signal }).await.is_err() {
                debug!(signal, "coordinator gone; signal listener exiting");
                return;
            }
        }
    }))
}

#[cfg(unix)]
struct Signals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Signals {
    fn install() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    async fn recv(&mut self) -> Option<&'static str> {
        tokio::select! {
            s = self.interrupt.recv() => s.map(|()| "SIGINT"),
            s = self.terminate.recv() => s.map(|()| "SIGTERM"),
        }
    }
}

#[cfg(not(unix))]
struct Signals;

#[cfg(not(unix))]
impl Signals {
    fn install() -> io::Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) -> Option<&'static str> {
        match tokio::signal::ctrl_c().await {
            Ok(()) => Some("ctrl-c"),
            Err(e) => {
                error!(error = %e, "failed to listen for Ctrl+C");
                None
            }
        }
    }
}
