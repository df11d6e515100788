//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Init logging → Build Warden (fails fast) → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C → broadcast → axum graceful shutdown drains in-flight requests
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
