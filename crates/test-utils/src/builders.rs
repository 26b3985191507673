// crates/test-utils/src/builders.rs

use std::collections::BTreeMap;

use kabedon_kokoro::config::{ConfigFile, ConfigSection, RawConfigFile, ServiceConfig};
use kabedon_kokoro::service::{ServiceDescriptor, ServiceMap};
use kabedon_kokoro::types::DrainPolicy;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                service: BTreeMap::new(),
            },
        }
    }

    pub fn with_service(mut self, key: &str, service: ServiceConfig) -> Self {
        self.config.service.insert(key.to_string(), service);
        self
    }

    pub fn drain(mut self, policy: DrainPolicy) -> Self {
        self.config.config.drain = policy;
        self
    }

    pub fn terminate_timeout(mut self, timeout: &str) -> Self {
        self.config.config.terminate_timeout = timeout.to_string();
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ServiceConfig`.
pub struct ServiceConfigBuilder {
    service: ServiceConfig,
}

impl ServiceConfigBuilder {
    pub fn new(binary: &str, port: u16) -> Self {
        Self {
            service: ServiceConfig {
                name: None,
                binary: binary.to_string(),
                dir: ".".to_string(),
                args: vec!["--port={port}".to_string()],
                port,
            },
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.service.name = Some(name.to_string());
        self
    }

    pub fn dir(mut self, dir: &str) -> Self {
        self.service.dir = dir.to_string();
        self
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.service.args = args.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn build(self) -> ServiceConfig {
        self.service
    }
}

/// Descriptor map with one fake service per name, on consecutive ports
/// starting at 7000. Keys and display names are the same.
pub fn service_map(names: &[&str]) -> ServiceMap {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let port = 7000 + i as u16;
            (
                name.to_string(),
                ServiceDescriptor::new(
                    *name,
                    *name,
                    format!("{name}-bin"),
                    format!("./{name}"),
                    vec![format!("--port={port}")],
                    port,
                ),
            )
        })
        .collect()
}
