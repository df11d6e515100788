//! Effective maintenance enablement.
//!
//! An ingress controller can forward resource annotations in a request header
//! (comma-joined `key=value` pairs). When the configured `name=value` pair
//! appears anywhere in that header, maintenance is forced on; otherwise the
//! static flag decides.

use axum::http::{HeaderMap, HeaderName};

/// Annotation that force-enables maintenance.
#[derive(Debug, Clone)]
pub struct AnnotationRule {
    header: HeaderName,
    needle: String,
}

impl AnnotationRule {
    pub fn new(header: HeaderName, name: &str, value: &str) -> Self {
        Self {
            header,
            needle: format!("{}={}", name, value),
        }
    }

    /// Substring match on the raw header value.
    ///
    /// A different annotation whose value contains the needle also matches
    /// (e.g. `other=prefix-name=true`).
    pub fn matches(&self, headers: &HeaderMap) -> bool {
        headers
            .get(&self.header)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains(&self.needle))
            .unwrap_or(false)
    }
}

/// Resolves whether maintenance is active for a request.
#[derive(Debug, Clone)]
pub struct EnablementRule {
    static_enabled: bool,
    annotation: Option<AnnotationRule>,
}

impl EnablementRule {
    pub fn new(static_enabled: bool, annotation: Option<AnnotationRule>) -> Self {
        Self {
            static_enabled,
            annotation,
        }
    }

    pub fn is_enabled(&self, headers: &HeaderMap) -> bool {
        match &self.annotation {
            Some(rule) if rule.matches(headers) => true,
            _ => self.static_enabled,
        }
    }
}
