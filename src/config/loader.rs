// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::config::model::{ConfigFile, NYAA_SERVICE_KEY, RawConfigFile};
use crate::errors::Result;

/// Load a services file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a services file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Resolve the effective configuration for a run.
///
/// - `path`: services file; `None` selects the built-in service set.
/// - `nyaa_port`: `--nyaa-port`, applied to the `nyaa` service after loading
///   and before validation so port checks see the final value.
pub fn resolve_config(
    path: Option<&Path>,
    nyaa_port: Option<u16>,
    default_nyaa_port: u16,
) -> Result<ConfigFile> {
    let mut raw = match path {
        Some(path) => {
            debug!(path = %path.display(), "loading services file");
            load_from_path(path)?
        }
        None => RawConfigFile::builtin(default_nyaa_port),
    };

    if let Some(port) = nyaa_port {
        if !raw.override_port(NYAA_SERVICE_KEY, port) {
            warn!(
                port,
                "--nyaa-port given but no `{}` service is configured; ignoring",
                NYAA_SERVICE_KEY
            );
        }
    }

    ConfigFile::try_from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_set_uses_default_port() {
        let cfg = resolve_config(None, None, 9995).unwrap();
        assert_eq!(cfg.service[NYAA_SERVICE_KEY].port, 9995);
    }

    #[test]
    fn nyaa_port_overrides_builtin() {
        let cfg = resolve_config(None, Some(7000), 9995).unwrap();
        assert_eq!(cfg.service[NYAA_SERVICE_KEY].port, 7000);
    }
}
