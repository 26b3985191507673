// src/service.rs

//! Service descriptors: the immutable description of one supervised child.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::config::{ConfigFile, ServiceConfig};

/// Placeholder in `args` replaced by the service port.
pub const PORT_PLACEHOLDER: &str = "{port}";

/// Descriptors keyed by their config key.
pub type ServiceMap = BTreeMap<String, ServiceDescriptor>;

/// Everything needed to launch and address one child service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDescriptor {
    /// Config key (e.g. `nyaa`).
    pub key: String,
    /// Display name (e.g. `kabedon-nyaa`).
    pub name: String,
    pub binary: String,
    pub dir: PathBuf,
    pub args: Vec<String>,
    pub port: u16,
    pub endpoint: String,
}

impl ServiceDescriptor {
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        binary: impl Into<String>,
        dir: impl Into<PathBuf>,
        args: Vec<String>,
        port: u16,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            binary: binary.into(),
            dir: dir.into(),
            args,
            port,
            endpoint: endpoint_for_port(port),
        }
    }

    /// Build a descriptor from a validated `[service.<key>]` table, rendering
    /// `{port}` in the arguments.
    pub fn from_config(key: &str, cfg: &ServiceConfig) -> Self {
        let port = cfg.port.to_string();
        let args = cfg
            .args
            .iter()
            .map(|a| a.replace(PORT_PLACEHOLDER, &port))
            .collect();
        Self::new(
            key,
            cfg.display_name(key),
            cfg.binary.clone(),
            cfg.dir.clone(),
            args,
            cfg.port,
        )
    }

    /// `dir/binary`.
    pub fn full_path(&self) -> PathBuf {
        self.dir.join(&self.binary)
    }
}

pub fn endpoint_for_port(port: u16) -> String {
    format!("http://localhost:{port}")
}

/// Build the descriptor map for every configured service.
pub fn services_from_config(cfg: &ConfigFile) -> ServiceMap {
    cfg.service
        .iter()
        .map(|(key, svc)| (key.clone(), ServiceDescriptor::from_config(key, svc)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_placeholder_is_rendered_everywhere() {
        let cfg = ServiceConfig {
            name: None,
            binary: "svc".to_string(),
            dir: "./svc".to_string(),
            args: vec![
                "--port={port}".to_string(),
                "--verbose".to_string(),
                "{port}:{port}".to_string(),
            ],
            port: 4242,
        };

        let desc = ServiceDescriptor::from_config("svc", &cfg);
        assert_eq!(desc.name, "svc");
        assert_eq!(desc.args, vec!["--port=4242", "--verbose", "4242:4242"]);
        assert_eq!(desc.endpoint, "http://localhost:4242");
        assert_eq!(desc.full_path(), PathBuf::from("./svc/svc"));
    }
}
