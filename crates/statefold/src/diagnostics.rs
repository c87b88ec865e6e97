//! Advisory diagnostics sink
//!
//! Diagnostics never influence control flow. The default sink forwards to
//! `log::warn!`; tests and applications can install their own.

use crate::config::Mode;
use std::fmt;
use std::rc::Rc;

/// Log target used by the default sink
pub const LOG_TARGET: &str = "statefold::diagnostics";

type Sink = Rc<dyn Fn(&str)>;

/// Where human readable warnings go. A disabled sink drops everything.
#[derive(Clone)]
pub struct Diagnostics {
    sink: Option<Sink>,
}

impl Diagnostics {
    /// Forward warnings to the `log` facade
    pub fn log() -> Self {
        Self::from_fn(|message| log::warn!(target: LOG_TARGET, "{}", message))
    }

    /// Drop every warning and skip the checks that would produce them
    pub fn silent() -> Self {
        Self { sink: None }
    }

    pub fn from_fn(sink: impl Fn(&str) + 'static) -> Self {
        Self {
            sink: Some(Rc::new(sink)),
        }
    }

    /// Logging sink in development, silent in production
    pub fn from_mode(mode: Mode) -> Self {
        if mode.is_production() {
            Self::silent()
        } else {
            Self::log()
        }
    }

    pub fn from_env() -> Self {
        Self::from_mode(Mode::from_env())
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub fn warn(&self, message: &str) {
        if let Some(sink) = &self.sink {
            sink(message);
        }
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::from_env()
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
