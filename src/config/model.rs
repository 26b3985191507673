// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::types::DrainPolicy;

/// Key of the built-in service, also the target of `--nyaa-port`.
pub const NYAA_SERVICE_KEY: &str = "nyaa";

/// Top-level configuration as read from a TOML services file:
///
/// ```toml
/// [config]
/// drain = "first"
/// terminate_timeout = "10s"
///
/// [service.nyaa]
/// name = "kabedon-nyaa"
/// binary = "kabedon-nyaa"
/// dir = "./kabedon-nyaa"
/// args = ["--port={port}"]
/// port = 9995
/// ```
///
/// All sections are optional at the TOML level; validation requires at least
/// one service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// Coordinator behaviour from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// All services from `[service.<key>]`.
    #[serde(default)]
    pub service: BTreeMap<String, ServiceConfig>,
}

impl RawConfigFile {
    /// The service set supervised when no services file is given.
    pub fn builtin(nyaa_port: u16) -> Self {
        let binary = if cfg!(windows) {
            "kabedon-nyaa.exe"
        } else {
            "kabedon-nyaa"
        };

        let mut service = BTreeMap::new();
        service.insert(
            NYAA_SERVICE_KEY.to_string(),
            ServiceConfig {
                name: Some("kabedon-nyaa".to_string()),
                binary: binary.to_string(),
                dir: "./kabedon-nyaa".to_string(),
                args: default_args(),
                port: nyaa_port,
            },
        );

        Self {
            config: ConfigSection::default(),
            service,
        }
    }

    /// Replace the port of service `key`, if present.
    ///
    /// Returns whether the service exists.
    pub fn override_port(&mut self, key: &str, port: u16) -> bool {
        match self.service.get_mut(key) {
            Some(svc) => {
                svc.port = port;
                true
            }
            None => false,
        }
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// `"first"` (default) or `"all"`.
    #[serde(default)]
    pub drain: DrainPolicy,

    /// Upper bound on how long terminating a single child may take.
    ///
    /// Exceeding it counts as a failed kill.
    #[serde(default = "default_terminate_timeout")]
    pub terminate_timeout: String,
}

fn default_terminate_timeout() -> String {
    "10s".to_string()
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            drain: DrainPolicy::default(),
            terminate_timeout: default_terminate_timeout(),
        }
    }
}

/// `[service.<key>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Display name used in logs; defaults to the table key.
    #[serde(default)]
    pub name: Option<String>,

    /// Executable file name, relative to `dir`.
    pub binary: String,

    /// Working directory of the child.
    #[serde(default = "default_dir")]
    pub dir: String,

    /// Launch arguments. Every `{port}` is replaced by `port`.
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Port the service listens on.
    pub port: u16,
}

fn default_dir() -> String {
    ".".to_string()
}

fn default_args() -> Vec<String> {
    vec!["--port={port}".to_string()]
}

impl ServiceConfig {
    /// Effective display name given the table key.
    pub fn display_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(key)
    }
}

/// Validated configuration. Only obtainable through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub service: BTreeMap<String, ServiceConfig>,
    terminate_timeout: Duration,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        service: BTreeMap<String, ServiceConfig>,
        terminate_timeout: Duration,
    ) -> Self {
        Self {
            config,
            service,
            terminate_timeout,
        }
    }

    pub fn drain_policy(&self) -> DrainPolicy {
        self.config.drain
    }

    pub fn terminate_timeout(&self) -> Duration {
        self.terminate_timeout
    }
}
