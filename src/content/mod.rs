//! Maintenance content subsystem.
//!
//! # Data Flow
//! ```text
//! WardenConfig
//!     → validation.rs picks one source (inline | file | service)
//!     → source.rs (ContentSource, owned by the dispatcher)
//!     → cache.rs (file bytes + mtime behind a RwLock)
//! ```

pub mod cache;
pub mod source;

pub use cache::{CacheError, FileCache};
pub use source::ContentSource;
