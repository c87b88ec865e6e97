//! Runtime mode configuration
//!
//! Advisory diagnostics (unexpected state shapes, missing reducers) are only
//! emitted in development mode. The mode defaults to the build profile and
//! can be overridden with the `STATEFOLD_ENV` environment variable.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;

/// Environment variable consulted by [`Mode::from_env`]
pub const MODE_ENV_VAR: &str = "STATEFOLD_ENV";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Development,
    Production,
}

impl Mode {
    /// Read the mode from `STATEFOLD_ENV`, falling back to the build profile
    pub fn from_env() -> Self {
        match env::var(MODE_ENV_VAR) {
            Ok(value) => value.parse().unwrap_or_else(|e| {
                log::warn!("Ignoring {}: {}", MODE_ENV_VAR, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn is_production(self) -> bool {
        self == Mode::Production
    }
}

impl Default for Mode {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Mode::Development
        } else {
            Mode::Production
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Mode::Development),
            "production" | "prod" => Ok(Mode::Production),
            other => Err(format!("unknown mode \"{}\"", other)),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Development => write!(f, "development"),
            Mode::Production => write!(f, "production"),
        }
    }
}
