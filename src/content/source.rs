//! Maintenance content sources.

use axum::body::Bytes;
use std::fmt;

use crate::content::cache::FileCache;
use crate::http::proxy::ServiceTarget;

/// Where maintenance bodies come from. Exactly one is chosen at construction.
#[derive(Debug)]
pub enum ContentSource {
    /// HTML served verbatim from configuration.
    Inline(Bytes),
    /// Static file, reloaded when its modification time advances.
    File(FileCache),
    /// Reverse-proxied maintenance service.
    Service(ServiceTarget),
}

impl ContentSource {
    pub fn kind(&self) -> &'static str {
        match self {
            ContentSource::Inline(_) => "inline",
            ContentSource::File(_) => "file",
            ContentSource::Service(_) => "service",
        }
    }
}

impl fmt::Display for ContentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentSource::Inline(bytes) => write!(f, "inline ({} bytes)", bytes.len()),
            ContentSource::File(cache) => write!(f, "file {}", cache.path().display()),
            ContentSource::Service(target) => write!(f, "service {}", target),
        }
    }
}
