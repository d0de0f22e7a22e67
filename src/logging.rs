//! Leveled logging on top of the `log` facade.
//!
//! The process speaks six severities (debug, info, notice, warning, error,
//! critical). They are carried over `log` levels, with notice and critical
//! distinguished by target. A gate in front of env_logger filters on the
//! exact six-level severity.

use std::io::{IsTerminal, Write};
use std::sync::atomic::{AtomicU8, Ordering};

use colored::*;
use log::{Level, LevelFilter, Log, Metadata, Record};
use serde::Deserialize;

use crate::error::HeartbeatError;

/// Target used for notice-level messages (emitted at `Level::Info`)
pub const NOTICE_TARGET: &str = "notice";

/// Target used for critical-level messages (emitted at `Level::Error`)
pub const CRITICAL_TARGET: &str = "critical";

/// Active verbosity as a `LogLevel` ordinal
static ACTIVE_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Debug as u8);

/// Log a critical message
#[macro_export]
macro_rules! critical {
    ($($arg:tt)+) => {
        ::log::error!(target: $crate::logging::CRITICAL_TARGET, $($arg)+)
    };
}

/// Log a notice message
#[macro_export]
macro_rules! notice {
    ($($arg:tt)+) => {
        ::log::info!(target: $crate::logging::NOTICE_TARGET, $($arg)+)
    };
}

/// Configured verbosity, lowest ordinal is the most severe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "u8")]
pub enum LogLevel {
    Critical = 1,
    Error = 2,
    Warning = 3,
    Notice = 4,
    Info = 5,
    #[default]
    Debug = 6,
}

impl LogLevel {
    /// Map a config ordinal onto a level
    pub fn from_ordinal(value: u8) -> Option<Self> {
        match value {
            1 => Some(LogLevel::Critical),
            2 => Some(LogLevel::Error),
            3 => Some(LogLevel::Warning),
            4 => Some(LogLevel::Notice),
            5 => Some(LogLevel::Info),
            6 => Some(LogLevel::Debug),
            _ => None,
        }
    }

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Critical => "critical",
            LogLevel::Error => "error",
            LogLevel::Warning => "warning",
            LogLevel::Notice => "notice",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }

    /// Severity of a record, reading the notice and critical targets
    pub fn of(metadata: &Metadata) -> Self {
        match (metadata.level(), metadata.target()) {
            (Level::Error, CRITICAL_TARGET) => LogLevel::Critical,
            (Level::Error, _) => LogLevel::Error,
            (Level::Warn, _) => LogLevel::Warning,
            (Level::Info, NOTICE_TARGET) => LogLevel::Notice,
            (Level::Info, _) => LogLevel::Info,
            (Level::Debug, _) | (Level::Trace, _) => LogLevel::Debug,
        }
    }

    /// The coarse `log` filter that lets this level and everything more
    /// severe through; `LevelGate` narrows it to the exact level
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Critical | LogLevel::Error => LevelFilter::Error,
            LogLevel::Warning => LevelFilter::Warn,
            LogLevel::Notice | LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
        }
    }
}

impl TryFrom<u8> for LogLevel {
    type Error = HeartbeatError;

    fn try_from(value: u8) -> std::result::Result<Self, HeartbeatError> {
        LogLevel::from_ordinal(value).ok_or(HeartbeatError::InvalidLogLevel(value))
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.as_str(), self.ordinal())
    }
}

fn label(record: &Record) -> ColoredString {
    match LogLevel::of(record.metadata()) {
        LogLevel::Critical => "CRITICAL".red().bold(),
        LogLevel::Error => "ERROR".red(),
        LogLevel::Warning => "WARNING".yellow(),
        LogLevel::Notice => "NOTICE".cyan(),
        LogLevel::Info => "INFO".green(),
        LogLevel::Debug => "DEBUG".blue(),
    }
}

/// Wraps the env_logger backend and drops records less severe than the
/// active `LogLevel`
struct LevelGate {
    inner: env_logger::Logger,
}

impl Log for LevelGate {
    fn enabled(&self, metadata: &Metadata) -> bool {
        LogLevel::of(metadata).ordinal() <= ACTIVE_LEVEL.load(Ordering::Relaxed)
            && self.inner.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.inner.log(record);
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Install the stderr logger at `level`.
///
/// Installing twice is not an error: the second call only re-levels.
pub fn init(level: LogLevel) {
    if !std::io::stderr().is_terminal() {
        colored::control::set_override(false);
    }

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(LevelFilter::Trace)
        .target(env_logger::Target::Stderr)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {} {}",
                label(record),
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.args()
            )
        });

    let gate = LevelGate {
        inner: builder.build(),
    };
    if let Err(e) = log::set_boxed_logger(Box::new(gate)) {
        log::debug!("Logger already installed: {}", e);
    }

    apply(level);
    log::debug!("Logger initialized at level {}", level);
}

/// Change the active level at runtime
pub fn set_level(level: LogLevel) {
    log::debug!("Setting log level {}", level);
    apply(level);
}

fn apply(level: LogLevel) {
    ACTIVE_LEVEL.store(level.ordinal(), Ordering::Relaxed);
    log::set_max_level(level.to_level_filter());
}
