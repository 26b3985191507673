// src/supervisor/signal.rs

//! The process-wide shutdown signal.
//!
//! A `tokio::sync::watch` channel carrying a single `bool`. The coordinator
//! owns the only [`ShutdownSignal`] (the sender); every supervisor holds a
//! [`ShutdownListener`]. A watch channel keeps its latest value, so a
//! listener that starts waiting after the signal was raised still sees it,
//! and every listener sees it independently.

use tokio::sync::watch;

/// Write side of the shutdown signal. Raised at most once, never reset.
#[derive(Debug)]
pub struct ShutdownSignal {
    tx: watch::Sender<bool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn subscribe(&self) -> ShutdownListener {
        ShutdownListener {
            rx: self.tx.subscribe(),
        }
    }

    /// Raise the signal. Returns `true` only for the call that raised it.
    pub fn raise(&self) -> bool {
        self.tx.send_if_modified(|raised| {
            if *raised {
                false
            } else {
                *raised = true;
                true
            }
        })
    }

    pub fn is_raised(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Read side of the shutdown signal, one per supervisor.
#[derive(Debug, Clone)]
pub struct ShutdownListener {
    rx: watch::Receiver<bool>,
}

impl ShutdownListener {
    /// Wait until the signal is raised.
    ///
    /// Returns `false` if the [`ShutdownSignal`] was dropped without ever
    /// being raised.
    pub async fn wait(&mut self) -> bool {
        self.rx.wait_for(|raised| *raised).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    #[tokio::test]
    async fn raise_is_idempotent() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_raised());
        assert!(signal.raise());
        assert!(!signal.raise());
        assert!(signal.is_raised());
    }

    #[tokio::test]
    async fn every_listener_observes_the_signal() {
        let signal = ShutdownSignal::new();
        let mut early = signal.subscribe();
        let mut other = signal.subscribe();

        let waiter = tokio::spawn(async move { early.wait().await });
        signal.raise();

        assert!(timeout(Duration::from_secs(1), waiter).await.unwrap().unwrap());
        assert!(other.wait().await);
    }

    #[tokio::test]
    async fn late_subscriber_sees_an_earlier_raise() {
        let signal = ShutdownSignal::new();
        signal.raise();

        let mut late = signal.subscribe();
        assert!(timeout(Duration::from_secs(1), late.wait()).await.unwrap());
    }

    #[tokio::test]
    async fn dropped_signal_releases_listeners_without_raising() {
        let signal = ShutdownSignal::new();
        let mut listener = signal.subscribe();
        drop(signal);

        assert!(!listener.wait().await);
    }
}
