//! Logging setup using simplelog
//!
//! Logs go to a timestamped file by default so stdout stays free for the
//! prompt. Setting `STATEFOLD_DEMO_LOG=term` logs to stderr instead.
//! The level comes from `RUST_LOG` (debug when unset).

use simplelog::{
    ColorChoice, Config, ConfigBuilder, LevelFilter, TermLogger, TerminalMode, WriteLogger,
};
use std::fmt;
use std::fs::File;
use std::path::PathBuf;

pub const TARGET_ENV_VAR: &str = "STATEFOLD_DEMO_LOG";

/// Where log records end up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    File(PathBuf),
    Terminal,
}

impl LogTarget {
    fn from_setting(setting: Option<&str>) -> Self {
        match setting.map(str::to_lowercase).as_deref() {
            Some("term" | "terminal" | "stderr") => LogTarget::Terminal,
            _ => LogTarget::File(log_file_path()),
        }
    }
}

impl fmt::Display for LogTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogTarget::File(path) => write!(f, "{}", path.display()),
            LogTarget::Terminal => write!(f, "stderr"),
        }
    }
}

/// Debug builds write next to the binary's working directory, release
/// builds to the system temp directory.
fn log_file_path() -> PathBuf {
    let filename = format!(
        "statefold-demo-{}.log",
        chrono::Local::now().format("%Y%m%d-%H%M%S")
    );
    if cfg!(debug_assertions) {
        PathBuf::from(filename)
    } else {
        std::env::temp_dir().join(filename)
    }
}

fn parse_level(value: Option<&str>) -> LevelFilter {
    let Some(value) = value else {
        return LevelFilter::Debug;
    };
    value.parse().unwrap_or(LevelFilter::Info)
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_time_offset_to_local()
        .unwrap_or_else(|builder| builder)
        .build()
}

/// Install the global logger and report where it writes
pub fn init() -> anyhow::Result<LogTarget> {
    let level = parse_level(std::env::var("RUST_LOG").ok().as_deref());
    let target = LogTarget::from_setting(std::env::var(TARGET_ENV_VAR).ok().as_deref());

    match &target {
        LogTarget::File(path) => {
            WriteLogger::init(level, build_config(), File::create(path)?)?;
        }
        LogTarget::Terminal => {
            TermLogger::init(level, build_config(), TerminalMode::Stderr, ColorChoice::Auto)?;
        }
    }

    Ok(target)
}
