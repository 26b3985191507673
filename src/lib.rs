// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod servers;
pub mod service;
pub mod supervisor;
pub mod types;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::{CliArgs, DEFAULT_NYAA_PORT};
use crate::config::{ensure_ports_disjoint, resolve_config, ConfigFile};
use crate::engine::{Coordinator, CoordinatorCore, CoordinatorEvent, ExitOutcome};
use crate::exec::{Launcher, ProcessLauncher};
use crate::servers::{gateway, kokoro, spawn_server, ShutdownHandle};
use crate::service::{services_from_config, ServiceMap};
use crate::supervisor::{spawn_supervisors, ShutdownSignal, SupervisorHandle};
use crate::types::DrainPolicy;

/// Capacity of the coordinator event channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Supervisors spawned and a coordinator ready to run.
///
/// `events` feeds the coordinator; hand clones of it to anything that needs
/// to raise an interrupt or a shutdown request.
#[derive(Debug)]
pub struct Supervision {
    pub coordinator: Coordinator,
    pub supervisors: Vec<SupervisorHandle>,
    pub events: mpsc::Sender<CoordinatorEvent>,
}

/// Spawn one supervisor per service and build the coordinator that will
/// release them.
///
/// Must be called from within a Tokio runtime.
pub fn start_supervision(
    services: &ServiceMap,
    launcher: Arc<dyn Launcher>,
    policy: DrainPolicy,
) -> Supervision {
    let (events, event_rx) = mpsc::channel::<CoordinatorEvent>(EVENT_CHANNEL_CAPACITY);
    let signal = ShutdownSignal::new();

    let supervisors = spawn_supervisors(services, launcher, &signal, &events);

    let core = CoordinatorCore::new(services.values().map(|s| s.name.clone()), policy);
    let coordinator = Coordinator::new(core, event_rx, signal);

    Supervision {
        coordinator,
        supervisors,
        events,
    }
}

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config resolution
/// - one supervisor per service
/// - the gateway and kokoro servers
/// - OS signal handling
/// - the shutdown coordinator
///
/// Returns `None` for `--dry-run`, otherwise how the coordinator ended.
pub async fn run(args: CliArgs) -> Result<Option<ExitOutcome>> {
    let config_path = args.config.as_ref().map(PathBuf::from);
    let cfg = resolve_config(config_path.as_deref(), args.nyaa_port, DEFAULT_NYAA_PORT)?;
    ensure_ports_disjoint(
        &cfg,
        &[
            (gateway::SERVER_NAME, args.gateway_port),
            (kokoro::SERVER_NAME, args.kokoro_port),
        ],
    )?;

    let services = Arc::new(services_from_config(&cfg));

    if args.dry_run {
        print_dry_run(&cfg, &services, &args);
        return Ok(None);
    }

    let launcher: Arc<dyn Launcher> = Arc::new(ProcessLauncher::new(cfg.terminate_timeout()));
    let supervision = start_supervision(&services, launcher, cfg.drain_policy());
    info!(
        services = supervision.supervisors.len(),
        "supervisors started"
    );

    engine::spawn_signal_listener(supervision.events.clone())
        .context("installing OS signal handlers")?;

    spawn_server(
        gateway::SERVER_NAME,
        args.gateway_port,
        gateway::run(args.gateway_port, Arc::clone(&services)),
        supervision.events.clone(),
    );

    let shutdown = ShutdownHandle::new(supervision.events.clone(), kokoro::SERVER_NAME);
    spawn_server(
        kokoro::SERVER_NAME,
        args.kokoro_port,
        kokoro::run(args.kokoro_port, Arc::clone(&services), shutdown),
        supervision.events.clone(),
    );

    let outcome = supervision.coordinator.run().await;
    Ok(Some(outcome))
}

/// Simple dry-run output: print coordinator settings and resolved services.
fn print_dry_run(cfg: &ConfigFile, services: &ServiceMap, args: &CliArgs) {
    println!("kabedon-kokoro dry-run");
    println!("  gateway port = {}", args.gateway_port);
    println!("  kokoro port = {}", args.kokoro_port);
    println!("  config.drain = {}", cfg.drain_policy());
    println!("  config.terminate_timeout = {:?}", cfg.terminate_timeout());
    println!();

    println!("services ({}):", services.len());
    for (key, svc) in services.iter() {
        println!("  - {key}");
        println!("      name: {}", svc.name);
        println!("      path: {}", svc.full_path().display());
        println!("      dir: {}", svc.dir.display());
        if !svc.args.is_empty() {
            println!("      args: {:?}", svc.args);
        }
        println!("      port: {}", svc.port);
        println!("      endpoint: {}", svc.endpoint);
    }

    debug!("dry-run complete (nothing launched)");
}
