//! Maintenance-mode gate for HTTP services.
//!
//! Decides per request whether traffic reaches the backend or receives a
//! maintenance response, using configurable bypass rules.

pub mod bypass;
pub mod config;
pub mod content;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::WardenConfig;
pub use config::validation::WardenError;
pub use http::{maintenance_middleware, HttpServer, Warden};
pub use lifecycle::Shutdown;
