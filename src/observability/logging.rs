//! Structured logging.
//!
//! # Responsibilities
//! - Map the configured verbosity (0-3) onto a tracing level filter
//! - Gate the engine's own events on the instance verbosity, so an embedding
//!   host with a more verbose subscriber still gets the configured level
//! - Initialize the global subscriber for the standalone binary
//!
//! `RUST_LOG` takes precedence over the configured verbosity when set.

use tracing::Level;
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log verbosity as configured by `logLevel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    None = 0,
    Error = 1,
    Info = 2,
    Debug = 3,
}

impl From<u8> for LogLevel {
    fn from(level: u8) -> Self {
        match level {
            0 => LogLevel::None,
            1 => LogLevel::Error,
            2 => LogLevel::Info,
            _ => LogLevel::Debug,
        }
    }
}

impl LogLevel {
    /// Whether an event at `level` should be emitted at this verbosity.
    pub fn allows(self, level: Level) -> bool {
        level <= LevelFilter::from(self)
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::None => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
        }
    }
}

/// Install the global subscriber. Returns false if one was already set.
pub fn init(level: LogLevel) -> bool {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from(level).into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
