//! HTTP handling subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → gate.rs (enablement + bypass decision)
//!         → pass-through: downstream handler (Next), request untouched
//!         → maintenance: dispatcher.rs
//!             → inline / file cache / proxy.rs (with writer.rs status override)
//!     → Response to client
//! ```

pub mod dispatcher;
pub mod gate;
pub mod proxy;
pub mod server;
pub mod writer;

pub use dispatcher::MaintenanceDispatcher;
pub use gate::{maintenance_middleware, Decision, Warden};
pub use server::HttpServer;
pub use writer::{BufferedResponse, ResponseSink, StatusOverrideWriter};
