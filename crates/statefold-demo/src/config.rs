//! Demo configuration
//!
//! Loaded from `.statefold-demo.toml` in the current directory, then the
//! home directory. Every field has a default.

use serde::{Deserialize, Serialize};
use statefold::Mode;
use std::{env, path::PathBuf};

const CONFIG_FILE: &str = ".statefold-demo.toml";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DemoConfig {
    /// Prompt shown before each command
    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// Overrides `STATEFOLD_ENV` when set
    #[serde(default)]
    pub mode: Option<Mode>,

    /// Log the full state after every action
    #[serde(default)]
    pub log_state: bool,

    /// Action types the logging middleware ignores
    #[serde(default)]
    pub skip_actions: Vec<String>,

    /// Counter value the store starts with
    #[serde(default)]
    pub initial_count: i64,

    /// Counter value at which a celebration todo is queued
    #[serde(default = "default_milestone")]
    pub milestone: i64,
}

fn default_prompt() -> String {
    "> ".to_string()
}

fn default_milestone() -> i64 {
    10
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            mode: None,
            log_state: false,
            skip_actions: Vec::new(),
            initial_count: 0,
            milestone: default_milestone(),
        }
    }
}

impl DemoConfig {
    /// Load config from CWD first, then home directory, or use defaults
    pub fn load() -> Self {
        if let Some(content) = load_config_file() {
            match toml::from_str(&content) {
                Ok(config) => {
                    log::info!("Loaded demo config from file");
                    return config;
                }
                Err(e) => {
                    log::warn!("Failed to parse config file: {}", e);
                }
            }
        }

        log::debug!("Using default demo config");
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode.unwrap_or_else(Mode::from_env)
    }
}

fn load_config_file() -> Option<String> {
    if let Ok(content) = std::fs::read_to_string(CONFIG_FILE) {
        log::debug!("Loaded config from {}", CONFIG_FILE);
        return Some(content);
    }

    let home_config = env::var_os("HOME").map(|home| PathBuf::from(home).join(CONFIG_FILE))?;
    let content = std::fs::read_to_string(&home_config).ok()?;
    log::debug!("Loaded config from {}", home_config.display());
    Some(content)
}
