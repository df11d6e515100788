//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → schema.rs (WardenConfig with defaults)
//!     → validation.rs (content source, header names, status, timeouts)
//!     → ValidatedConfig (immutable, owned by the Warden)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Invalid settings fail construction, never a request

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{FileConfig, ServerConfig, WardenConfig};
pub use validation::{validate_config, ValidatedConfig, WardenError};
