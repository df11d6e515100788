//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! bypass / content / http
//!     → tracing events (structured fields: path, reason, error)
//!     → logging.rs subscriber (level from logLevel, overridable by RUST_LOG)
//!     → stdout
//! ```
//!
//! # Design Decisions
//! - Library code only emits events; installing a subscriber is the
//!   binary's job
//! - No metrics: each instance logs, nothing is exported

pub mod logging;

pub use logging::LogLevel;
