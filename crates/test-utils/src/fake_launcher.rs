// crates/test-utils/src/fake_launcher.rs

use std::collections::HashSet;
use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use kabedon_kokoro::errors::{KabedonError, Result};
use kabedon_kokoro::exec::{Launcher, RunningProcess, TerminateFuture};
use kabedon_kokoro::service::ServiceDescriptor;

/// What the fake launcher was asked to do, in order.
#[derive(Debug, Default, Clone)]
pub struct LaunchLog {
    /// Services successfully "started".
    pub started: Vec<String>,
    /// Every `terminate()` call, including ones set up to fail.
    pub terminate_calls: Vec<String>,
    /// Services successfully "terminated".
    pub terminated: Vec<String>,
}

/// A launcher that never spawns anything:
/// - records starts and terminations in a shared [`LaunchLog`]
/// - fails `start` for services registered with [`FakeLauncher::fail_start`]
/// - fails `terminate` for services registered with [`FakeLauncher::fail_kill`]
///
/// Services are matched by display name.
#[derive(Debug, Default)]
pub struct FakeLauncher {
    fail_start: HashSet<String>,
    fail_kill: HashSet<String>,
    log: Arc<Mutex<LaunchLog>>,
    next_pid: AtomicU32,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_start(mut self, service: &str) -> Self {
        self.fail_start.insert(service.to_string());
        self
    }

    pub fn fail_kill(mut self, service: &str) -> Self {
        self.fail_kill.insert(service.to_string());
        self
    }

    /// Shared handle to the log; stays valid after the launcher is moved.
    pub fn log(&self) -> Arc<Mutex<LaunchLog>> {
        Arc::clone(&self.log)
    }
}

impl Launcher for FakeLauncher {
    fn start(&self, service: &ServiceDescriptor) -> Result<Box<dyn RunningProcess>> {
        if self.fail_start.contains(&service.name) {
            return Err(KabedonError::StartError {
                service: service.name.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "injected start failure"),
            });
        }

        self.log.lock().unwrap().started.push(service.name.clone());

        Ok(Box::new(FakeProcess {
            service: service.name.clone(),
            pid: 1000 + self.next_pid.fetch_add(1, Ordering::SeqCst),
            fail_kill: self.fail_kill.contains(&service.name),
            log: Arc::clone(&self.log),
        }))
    }
}

struct FakeProcess {
    service: String,
    pid: u32,
    fail_kill: bool,
    log: Arc<Mutex<LaunchLog>>,
}

impl RunningProcess for FakeProcess {
    fn id(&self) -> Option<u32> {
        Some(self.pid)
    }

    fn terminate(self: Box<Self>) -> TerminateFuture {
        Box::pin(async move {
            {
                let mut log = self.log.lock().unwrap();
                log.terminate_calls.push(self.service.clone());
                if !self.fail_kill {
                    log.terminated.push(self.service.clone());
                }
            }

            if self.fail_kill {
                return Err(KabedonError::KillError {
                    service: self.service,
                    source: io::Error::new(io::ErrorKind::PermissionDenied, "injected kill failure"),
                });
            }
            Ok(())
        })
    }
}
