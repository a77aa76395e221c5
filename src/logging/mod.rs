// Logging facade for backend services
//
// This module provides five independent leveled loggers with:
// - Per-level output routing (stdout, stderr or a shared file)
// - Identity and tracking ids taken from the request context
// - Optional structured fields rendered as JSON
// - A one-shot stderr override for levels above the active maximum

use std::error::Error;
use std::fmt;
use std::panic::Location;
use std::path::Path;
use std::str::FromStr;

use chrono::Utc;
use log::warn;

use crate::context::CustomContext;
use crate::errors::ConfigError;
use crate::types::FieldMap;

pub mod config;
pub mod sink;

pub use config::{LoggerConfig, SinkTarget};
pub use sink::Sink;

/// Separator between the message and the rendered field map
pub const FIELD_SEPARATOR: &str = " | ";

const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Log levels, ordered by increasing severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Info,
    Trace,
    Warning,
    Error,
    Fatal,
}

impl Level {
    pub const ALL: [Level; 5] = [
        Level::Info,
        Level::Trace,
        Level::Warning,
        Level::Error,
        Level::Fatal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Trace => "TRACE",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        }
    }

    /// Environment flag that switches this level to file logging
    pub fn env_flag(&self) -> &'static str {
        match self {
            Level::Info => "INFO_LOG_TYPE",
            Level::Trace => "TRACE_LOG_TYPE",
            Level::Warning => "WARNING_LOG_TYPE",
            Level::Error => "ERROR_LOG_TYPE",
            Level::Fatal => "FATAL_LOG_TYPE",
        }
    }

    /// Sink used when file logging is off or unavailable
    pub fn default_target(self) -> SinkTarget {
        match self {
            Level::Info | Level::Trace | Level::Warning => SinkTarget::Stdout,
            Level::Error | Level::Fatal => SinkTarget::Stderr,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                ConfigError::InvalidValue(config::LOG_MAX_LEVEL.to_string(), s.to_string())
            })
    }
}

/// One level's handle: a line prefix and a sink
#[derive(Debug, Clone)]
pub struct LevelLogger {
    level: Level,
    prefix: String,
    sink: Sink,
}

impl LevelLogger {
    pub fn new(level: Level, sink: Sink) -> Self {
        Self {
            level,
            prefix: format!("{}|", level.as_str()),
            sink,
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn sink(&self) -> &Sink {
        &self.sink
    }

    /// Header, body and trailing newline of one log line
    fn format_line(&self, caller: &Location<'_>, body: &str) -> String {
        let file = Path::new(caller.file())
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_else(|| caller.file());
        format!(
            "{}{} {}:{}: {}\n",
            self.prefix,
            Utc::now().format(TIMESTAMP_FORMAT),
            file,
            caller.line(),
            body
        )
    }
}

/// The five leveled loggers of a process
///
/// Build once at start-up and share by reference; all methods take `&self`
/// and are safe to call from many threads.
#[derive(Debug, Clone)]
pub struct Loggers {
    loggers: [LevelLogger; 5],
    max_level: Level,
    stderr: Sink,
}

impl Loggers {
    /// Open the sinks described by `config`
    ///
    /// The log file is opened at most once and shared between levels. A
    /// level whose file cannot be opened falls back to its console default.
    pub fn new(config: &LoggerConfig) -> Self {
        let mut opened: Option<(&Path, Result<Sink, String>)> = None;

        let sinks = Level::ALL.map(|level| match config.target(level) {
            SinkTarget::Stdout => Sink::Stdout,
            SinkTarget::Stderr => Sink::Stderr,
            SinkTarget::File(path) => {
                let reuse = matches!(&opened, Some((p, _)) if *p == path.as_path());
                if !reuse {
                    let result = Sink::open_file(path).map_err(|e| e.to_string());
                    opened = Some((path.as_path(), result));
                }
                match opened.as_ref().map(|(_, result)| result) {
                    Some(Ok(sink)) => sink.clone(),
                    Some(Err(e)) => {
                        let err = ConfigError::FileError {
                            level: level.as_str().to_lowercase(),
                            reason: e.clone(),
                        };
                        warn!("{}", err);
                        console_sink(level)
                    }
                    None => console_sink(level),
                }
            }
        });

        Self::from_sinks(sinks, Sink::Stderr, config.max_level())
    }

    /// Read the environment and open the sinks it names
    pub fn from_env() -> Self {
        Self::new(&LoggerConfig::from_env())
    }

    /// Build from explicit sinks, indexed by level
    ///
    /// `stderr` receives writes of levels above `max_level`.
    pub fn from_sinks(sinks: [Sink; 5], stderr: Sink, max_level: Level) -> Self {
        let mut sinks = sinks.into_iter();
        let loggers = Level::ALL.map(|level| {
            LevelLogger::new(level, sinks.next().unwrap_or_else(|| console_sink(level)))
        });
        Self {
            loggers,
            max_level,
            stderr,
        }
    }

    pub fn logger(&self, level: Level) -> &LevelLogger {
        &self.loggers[level.index()]
    }

    pub fn max_level(&self) -> Level {
        self.max_level
    }

    /// Log valuable information
    #[track_caller]
    pub fn info(&self, ctx: &CustomContext, message: &str, fields: Option<&FieldMap>) {
        let body = message_body(ctx, message, fields);
        self.write(Level::Info, Location::caller(), &body);
    }

    /// Log selected events such as entry and exit, to isolate problems
    #[track_caller]
    pub fn trace(&self, ctx: &CustomContext, message: &str, fields: Option<&FieldMap>) {
        let body = message_body(ctx, message, fields);
        self.write(Level::Trace, Location::caller(), &body);
    }

    #[track_caller]
    pub fn warning(&self, ctx: &CustomContext, message: &str, fields: Option<&FieldMap>) {
        let body = message_body(ctx, message, fields);
        self.write(Level::Warning, Location::caller(), &body);
    }

    #[track_caller]
    pub fn error(&self, ctx: &CustomContext, err: Option<&dyn Error>, fields: Option<&FieldMap>) {
        let body = error_body(ctx, err, fields);
        self.write(Level::Error, Location::caller(), &body);
    }

    /// Log the error and terminate the process with exit status 1
    #[track_caller]
    pub fn fatal(
        &self,
        ctx: &CustomContext,
        err: Option<&dyn Error>,
        fields: Option<&FieldMap>,
    ) -> ! {
        let body = error_body(ctx, err, fields);
        self.write(Level::Fatal, Location::caller(), &body);
        std::process::exit(1)
    }

    fn write(&self, level: Level, caller: &Location<'_>, body: &str) {
        let logger = self.logger(level);
        let line = logger.format_line(caller, body);
        // Levels above the active maximum are forced to stderr for this call only.
        let sink = if level > self.max_level {
            &self.stderr
        } else {
            logger.sink()
        };
        let _ = sink.write_line(&line);
    }
}

impl Default for Loggers {
    fn default() -> Self {
        Self::new(&LoggerConfig::new())
    }
}

fn console_sink(level: Level) -> Sink {
    match level.default_target() {
        SinkTarget::Stdout => Sink::Stdout,
        _ => Sink::Stderr,
    }
}

/// Install `env_logger` as the process default logger
///
/// Warnings are shown unless `RUST_LOG` says otherwise, so sink fallbacks
/// are always reported. Safe to call more than once; later calls are ignored.
pub fn init_default_logger() {
    let env = env_logger::Env::default().default_filter_or("warn");
    let _ = env_logger::Builder::from_env(env).try_init();
}

/// `user_id:user_name`
pub fn generate_prefix(ctx: &CustomContext) -> String {
    format!("{}:{}", ctx.user_id, ctx.user_name)
}

/// `correlationId=<id>:requestId=<id>`; labels stay even when ids are empty
pub fn generate_tracking_ids(ctx: &CustomContext) -> String {
    format!(
        "correlationId={}:requestId={}",
        ctx.correlation_id, ctx.request_id
    )
}

/// Body of an info, trace or warning line
pub fn message_body(ctx: &CustomContext, message: &str, fields: Option<&FieldMap>) -> String {
    let mut body = format!(
        "|{}|{}| {}",
        generate_prefix(ctx),
        generate_tracking_ids(ctx),
        message
    );
    append_fields(&mut body, fields);
    body
}

/// Body of an error or fatal line
pub fn error_body(
    ctx: &CustomContext,
    err: Option<&dyn Error>,
    fields: Option<&FieldMap>,
) -> String {
    let mut body = format!("|{}|{}", generate_prefix(ctx), generate_tracking_ids(ctx));
    if let Some(err) = err {
        body.push('|');
        body.push_str(&err.to_string());
    }
    append_fields(&mut body, fields);
    body
}

fn append_fields(body: &mut String, fields: Option<&FieldMap>) {
    if let Some(fields) = fields.filter(|f| !f.is_empty()) {
        body.push_str(FIELD_SEPARATOR);
        body.push_str(&fields.render());
    }
}
