// backend_common/src/logging/config.rs
//
// Environment-driven logger configuration

use std::path::PathBuf;

use log::warn;

use super::Level;
use crate::errors::ConfigError;

/// Value of a `*_LOG_TYPE` flag that selects file logging
pub const FILE_LOG_FLAG: &str = "1";
/// Shared log file path used by every level with file logging enabled
pub const LOG_FILE_DESTINATION: &str = "LOG_FILE_DESTINATION";
/// Highest level written to its configured sink
pub const LOG_MAX_LEVEL: &str = "LOG_MAX_LEVEL";

/// Where a level writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkTarget {
    Stdout,
    Stderr,
    File(PathBuf),
}

/// Sink selection for all five levels plus the maximum active level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    targets: [SinkTarget; 5],
    max_level: Level,
}

impl LoggerConfig {
    /// Console defaults: info/trace/warning to stdout, error/fatal to stderr
    pub fn new() -> Self {
        Self {
            targets: Level::ALL.map(Level::default_target),
            max_level: Level::Fatal,
        }
    }

    /// Read the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup
    ///
    /// A level whose flag is set but has no usable path keeps its default
    /// target; the reason is reported through the `log` facade.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();
        let path = lookup(LOG_FILE_DESTINATION).filter(|p| !p.is_empty());

        for level in Level::ALL {
            if lookup(level.env_flag()).as_deref() != Some(FILE_LOG_FLAG) {
                continue;
            }
            match &path {
                Some(path) => config.set_target(level, SinkTarget::File(PathBuf::from(path))),
                None => warn!(
                    "{}",
                    ConfigError::MissingValue(LOG_FILE_DESTINATION.to_string())
                ),
            }
        }

        if let Some(raw) = lookup(LOG_MAX_LEVEL) {
            match raw.parse::<Level>() {
                Ok(level) => config.max_level = level,
                Err(e) => warn!("{}, keeping {}", e, config.max_level),
            }
        }

        config
    }

    pub fn with_target(mut self, level: Level, target: SinkTarget) -> Self {
        self.set_target(level, target);
        self
    }

    pub fn with_max_level(mut self, max_level: Level) -> Self {
        self.max_level = max_level;
        self
    }

    pub fn set_target(&mut self, level: Level, target: SinkTarget) {
        self.targets[level.index()] = target;
    }

    pub fn target(&self, level: Level) -> &SinkTarget {
        &self.targets[level.index()]
    }

    pub fn max_level(&self) -> Level {
        self.max_level
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::new()
    }
}
