// src/exec/process.rs

//! Production launcher backed by `tokio::process`.

use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::errors::{KabedonError, Result};
use crate::exec::backend::{Launcher, RunningProcess, TerminateFuture};
use crate::exec::output::forward_lines;
use crate::service::ServiceDescriptor;

/// Launches services as OS child processes.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    terminate_timeout: Duration,
}

impl ProcessLauncher {
    /// `terminate_timeout` bounds how long a kill may take before it is
    /// reported as a failure.
    pub fn new(terminate_timeout: Duration) -> Self {
        Self { terminate_timeout }
    }
}

impl Launcher for ProcessLauncher {
    fn start(&self, service: &ServiceDescriptor) -> Result<Box<dyn RunningProcess>> {
        let start_error = |source: io::Error| KabedonError::StartError {
            service: service.name.clone(),
            source,
        };

        let program = resolve_program(service).map_err(start_error)?;
        debug!(
            service = %service.name,
            program = %program.display(),
            dir = %service.dir.display(),
            args = ?service.args,
            "spawning service process"
        );

        let mut cmd = Command::new(&program);
        cmd.args(&service.args)
            .current_dir(&service.dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(start_error)?;

        if let Some(stdout) = child.stdout.take() {
            forward_lines(service.name.clone(), "stdout", stdout);
        }
        if let Some(stderr) = child.stderr.take() {
            forward_lines(service.name.clone(), "stderr", stderr);
        }

        Ok(Box::new(ChildProcess {
            service: service.name.clone(),
            child,
            terminate_timeout: self.terminate_timeout,
        }))
    }
}

/// `dir/binary`, made absolute against the supervisor's working directory so
/// the child's own `current_dir` doesn't change how it is found.
fn resolve_program(service: &ServiceDescriptor) -> io::Result<PathBuf> {
    std::path::absolute(service.full_path())
}

/// A running service process.
#[derive(Debug)]
pub struct ChildProcess {
    service: String,
    child: Child,
    terminate_timeout: Duration,
}

impl RunningProcess for ChildProcess {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn terminate(self: Box<Self>) -> TerminateFuture {
        let ChildProcess {
            service,
            child,
            terminate_timeout,
        } = *self;
        Box::pin(kill_child(service, child, terminate_timeout))
    }
}

async fn kill_child(service: String, mut child: Child, limit: Duration) -> Result<()> {
    let kill_error = |source: io::Error| KabedonError::KillError {
        service: service.clone(),
        source,
    };

    // A child that exited on its own has nothing left to kill.
    if let Some(status) = child.try_wait().map_err(kill_error)? {
        warn!(
            service = %service,
            exit_code = ?status.code(),
            "service process had already exited"
        );
        return Ok(());
    }

    match timeout(limit, child.kill()).await {
        Ok(res) => res.map_err(kill_error),
        Err(_) => Err(kill_error(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("process did not exit within {limit:?}"),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    fn shell(script: &str) -> ServiceDescriptor {
        ServiceDescriptor::new(
            "sh",
            "sh",
            "sh",
            "/bin",
            vec!["-c".to_string(), script.to_string()],
            7000,
        )
    }

    #[tokio::test]
    async fn missing_binary_is_a_start_error() {
        let launcher = ProcessLauncher::new(Duration::from_secs(5));
        let desc = ServiceDescriptor::new(
            "ghost",
            "ghost",
            "does-not-exist",
            "/nonexistent/dir",
            vec![],
            7000,
        );

        match launcher.start(&desc) {
            Err(KabedonError::StartError { service, .. }) => assert_eq!(service, "ghost"),
            Err(other) => panic!("expected StartError, got {other:?}"),
            Ok(_) => panic!("expected StartError, got a running process"),
        }
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn terminate_kills_a_long_running_child() {
        let launcher = ProcessLauncher::new(Duration::from_secs(5));
        let child = launcher.start(&shell("sleep 30")).expect("spawn sh");
        assert!(child.id().is_some());

        let res = timeout(Duration::from_secs(5), child.terminate()).await;
        assert!(matches!(res, Ok(Ok(()))));
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn terminate_tolerates_an_already_exited_child() {
        let launcher = ProcessLauncher::new(Duration::from_secs(5));
        let child = launcher.start(&shell("exit 0")).expect("spawn sh");

        sleep(Duration::from_millis(200)).await;

        assert!(child.terminate().await.is_ok());
    }
}
