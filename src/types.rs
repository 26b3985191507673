// src/types.rs

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// What the coordinator waits for once the shutdown signal has gone out.
///
/// - `First`: the first exit confirmation ends the process (default).
/// - `All`: wait until every service has either confirmed its exit or never
///   started in the first place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrainPolicy {
    #[default]
    First,
    All,
}

impl FromStr for DrainPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first" => Ok(DrainPolicy::First),
            "all" => Ok(DrainPolicy::All),
            other => Err(format!(
                "invalid drain policy: {other} (expected \"first\" or \"all\")"
            )),
        }
    }
}

impl fmt::Display for DrainPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrainPolicy::First => f.write_str("first"),
            DrainPolicy::All => f.write_str("all"),
        }
    }
}
