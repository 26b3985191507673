// src/servers/mod.rs

//! Collaborator HTTP servers.
//!
//! - [`gateway`] publishes the service map so REST clients can find each
//!   service's endpoint.
//! - [`kokoro`] is the secondary control server; it can ask the coordinator
//!   to shut everything down.
//!
//! Both run as independent Tokio tasks. A server that fails (most commonly
//! because it cannot bind its port) is reported to the coordinator, which
//! treats it as fatal.

use std::future::Future;

use anyhow::anyhow;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::engine::CoordinatorEvent;
use crate::errors::{KabedonError, Result};

pub mod gateway;
pub mod kokoro;

/// Lets a server raise an internal shutdown request.
///
/// The request goes to the coordinator; the server never touches the
/// shutdown signal itself.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: mpsc::Sender<CoordinatorEvent>,
    source: String,
}

impl ShutdownHandle {
    /// `source` names the requester in the coordinator's logs.
    pub fn new(tx: mpsc::Sender<CoordinatorEvent>, source: impl Into<String>) -> Self {
        Self {
            tx,
            source: source.into(),
        }
    }

    /// Ask the coordinator to shut down.
    ///
    /// Fails only if the coordinator is no longer running.
    pub async fn request_shutdown(&self) -> Result<()> {
        self.tx
            .send(CoordinatorEvent::ShutdownRequested {
                source: self.source.clone(),
            })
            .await
            .map_err(|_| KabedonError::Other(anyhow!("coordinator is no longer running")))
    }
}

/// Bind `0.0.0.0:port`, mapping failure to `BindError`.
pub async fn bind(server: &str, port: u16) -> Result<TcpListener> {
    TcpListener::bind(("0.0.0.0", port))
        .await
        .map_err(|source| KabedonError::BindError {
            server: server.to_string(),
            port,
            source,
        })
}

/// Run a server future in its own task, reporting any error to the
/// coordinator as `ServerFailed`.
pub fn spawn_server<F>(
    server: &'static str,
    port: u16,
    fut: F,
    events: mpsc::Sender<CoordinatorEvent>,
) -> JoinHandle<()>
where
    F: Future<Output = Result<()>> + Send + 'static,
{
    info!(server, "running {} server on :{}", server, port);
    tokio::spawn(async move {
        if let Err(err) = fut.await {
            error!(server, port, error = %err, "server stopped with an error");
            let event = CoordinatorEvent::ServerFailed {
                server: server.to_string(),
                error: err.to_string(),
            };
            if let Err(e) = events.send(event).await {
                debug!(event = ?e.0, "coordinator no longer listening; dropping event");
            }
        }
    })
}
