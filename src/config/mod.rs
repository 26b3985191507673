// src/config/mod.rs

//! Configuration loading and validation.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a services file from disk, or fall back to the built-in service
//!   set (`loader.rs`).
//! - Validate ports, names and timeouts (`validate.rs`).

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::parse_duration;
pub use loader::{load_and_validate, load_from_path, resolve_config};
pub use model::{ConfigFile, ConfigSection, RawConfigFile, ServiceConfig};
pub use validate::ensure_ports_disjoint;
