// src/config/validate.rs

use std::collections::HashMap;

use crate::config::duration::parse_duration;
use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{KabedonError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = KabedonError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        let terminate_timeout = parse_duration(&raw.config.terminate_timeout)
            .map_err(|e| {
                KabedonError::ConfigError(format!("[config].terminate_timeout: {e}"))
            })?;
        Ok(ConfigFile::new_unchecked(
            raw.config,
            raw.service,
            terminate_timeout,
        ))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_services(cfg)?;
    validate_services(cfg)?;
    validate_unique_ports(cfg)?;
    validate_unique_names(cfg)?;
    Ok(())
}

fn ensure_has_services(cfg: &RawConfigFile) -> Result<()> {
    if cfg.service.is_empty() {
        return Err(KabedonError::ConfigError(
            "config must contain at least one [service.<key>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_services(cfg: &RawConfigFile) -> Result<()> {
    for (key, svc) in cfg.service.iter() {
        if svc.binary.trim().is_empty() {
            return Err(KabedonError::ConfigError(format!(
                "service '{}' has an empty `binary`",
                key
            )));
        }
        if svc.port == 0 {
            return Err(KabedonError::ConfigError(format!(
                "service '{}' must listen on a non-zero port",
                key
            )));
        }
        if svc.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(KabedonError::ConfigError(format!(
                "service '{}' has an empty `name`",
                key
            )));
        }
    }
    Ok(())
}

fn validate_unique_ports(cfg: &RawConfigFile) -> Result<()> {
    let mut seen: HashMap<u16, &str> = HashMap::new();
    for (key, svc) in cfg.service.iter() {
        if let Some(other) = seen.insert(svc.port, key.as_str()) {
            return Err(KabedonError::ConfigError(format!(
                "services '{}' and '{}' both use port {}",
                other, key, svc.port
            )));
        }
    }
    Ok(())
}

fn validate_unique_names(cfg: &RawConfigFile) -> Result<()> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for (key, svc) in cfg.service.iter() {
        let name = svc.display_name(key);
        if let Some(other) = seen.insert(name, key.as_str()) {
            return Err(KabedonError::ConfigError(format!(
                "services '{}' and '{}' share the name '{}'",
                other, key, name
            )));
        }
    }
    Ok(())
}

/// Check that no service port collides with a server port, and that the
/// servers don't collide with each other.
///
/// `reserved` pairs a server label with its port, e.g. `("gateway", 9990)`.
pub fn ensure_ports_disjoint(cfg: &ConfigFile, reserved: &[(&str, u16)]) -> Result<()> {
    for (i, (label, port)) in reserved.iter().enumerate() {
        if let Some((other, _)) = reserved[..i].iter().find(|(_, p)| p == port) {
            return Err(KabedonError::ConfigError(format!(
                "{} and {} servers both use port {}",
                other, label, port
            )));
        }
        if let Some((key, _)) = cfg.service.iter().find(|(_, svc)| svc.port == *port) {
            return Err(KabedonError::ConfigError(format!(
                "service '{}' uses port {} which is reserved for the {} server",
                key, port, label
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::config::model::{ConfigSection, ServiceConfig};

    fn svc(binary: &str, port: u16) -> ServiceConfig {
        ServiceConfig {
            name: None,
            binary: binary.to_string(),
            dir: ".".to_string(),
            args: vec![],
            port,
        }
    }

    fn raw(services: Vec<(&str, ServiceConfig)>) -> RawConfigFile {
        RawConfigFile {
            config: ConfigSection::default(),
            service: services
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn config_error(raw: RawConfigFile) -> String {
        match ConfigFile::try_from(raw) {
            Err(KabedonError::ConfigError(msg)) => msg,
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn empty_service_table_is_rejected() {
        assert!(config_error(raw(vec![])).contains("at least one"));
    }

    #[test]
    fn duplicate_ports_are_rejected() {
        let msg = config_error(raw(vec![("a", svc("a", 7000)), ("b", svc("b", 7000))]));
        assert!(msg.contains("both use port 7000"));
    }

    #[test]
    fn zero_port_and_empty_binary_are_rejected() {
        assert!(config_error(raw(vec![("a", svc("a", 0))])).contains("non-zero"));
        assert!(config_error(raw(vec![("a", svc("  ", 7000))])).contains("empty `binary`"));
    }

    #[test]
    fn names_default_to_keys_when_checking_uniqueness() {
        let mut named = svc("b", 7001);
        named.name = Some("a".to_string());
        let msg = config_error(raw(vec![("a", svc("a", 7000)), ("b", named)]));
        assert!(msg.contains("share the name 'a'"));
    }

    #[test]
    fn bad_timeout_is_reported_against_its_field() {
        let mut cfg = raw(vec![("a", svc("a", 7000))]);
        cfg.config.terminate_timeout = "soon".to_string();
        assert!(config_error(cfg).contains("terminate_timeout"));
    }

    #[test]
    fn overflowing_timeout_is_a_config_error() {
        let mut cfg = raw(vec![("a", svc("a", 7000))]);
        cfg.config.terminate_timeout = "99999999999999999h".to_string();
        assert!(config_error(cfg).contains("too large"));
    }

    #[test]
    fn reserved_ports_must_be_free() {
        let cfg = ConfigFile::try_from(raw(vec![("a", svc("a", 9990))])).unwrap();
        assert!(ensure_ports_disjoint(&cfg, &[("gateway", 9990)]).is_err());
        assert!(ensure_ports_disjoint(&cfg, &[("gateway", 1), ("kokoro", 1)]).is_err());
        assert!(ensure_ports_disjoint(&cfg, &[("gateway", 1), ("kokoro", 2)]).is_ok());
    }
}
