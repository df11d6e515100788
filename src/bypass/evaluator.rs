//! Bypass rule evaluation.
//!
//! # Precedence
//! 1. Favicon shortcut
//! 2. Path prefixes (in configured order)
//! 3. Bypass header
//! 4. JWT claim
//!
//! All rules are OR-ed; the order only decides which reason is reported.

use axum::http::{HeaderMap, HeaderName, Request};
use std::fmt;
use tracing::Level;

use crate::bypass::claims::extract_claim;
use crate::observability::LogLevel;

const FAVICON_SUFFIX: &str = "/favicon.ico";
const BEARER_PREFIX: &str = "bearer ";

/// Why a request was allowed through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BypassReason {
    Favicon,
    Path(String),
    Header,
    Jwt,
}

impl fmt::Display for BypassReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BypassReason::Favicon => write!(f, "favicon"),
            BypassReason::Path(prefix) => write!(f, "path prefix {}", prefix),
            BypassReason::Header => write!(f, "bypass header"),
            BypassReason::Jwt => write!(f, "jwt claim"),
        }
    }
}

/// Exact-value header rule.
#[derive(Debug, Clone)]
pub struct HeaderRule {
    pub name: HeaderName,
    pub value: String,
}

/// JWT claim rule. Only built when header, claim and value are all set.
#[derive(Debug, Clone)]
pub struct JwtRule {
    pub header: HeaderName,
    pub claim: String,
    pub value: String,
}

/// The full set of bypass rules, fixed at construction.
#[derive(Debug, Clone, Default)]
pub struct BypassRules {
    pub favicon: bool,
    pub paths: Vec<String>,
    pub header: Option<HeaderRule>,
    pub jwt: Option<JwtRule>,
}

/// Decides whether a request skips maintenance mode.
#[derive(Debug, Clone)]
pub struct BypassEvaluator {
    rules: BypassRules,
    log_level: LogLevel,
}

impl BypassEvaluator {
    pub fn new(rules: BypassRules, log_level: LogLevel) -> Self {
        Self { rules, log_level }
    }

    pub fn rules(&self) -> &BypassRules {
        &self.rules
    }

    /// Returns the first matching reason, or `None` if maintenance applies.
    pub fn should_bypass<B>(&self, req: &Request<B>) -> Option<BypassReason> {
        let path = req.uri().path();

        if self.rules.favicon && path.ends_with(FAVICON_SUFFIX) {
            return Some(BypassReason::Favicon);
        }

        if let Some(prefix) = self.rules.paths.iter().find(|p| path.starts_with(p.as_str())) {
            return Some(BypassReason::Path(prefix.clone()));
        }

        if let Some(rule) = &self.rules.header {
            let value = req.headers().get(&rule.name).map(|v| v.as_bytes());
            if value == Some(rule.value.as_bytes()) {
                return Some(BypassReason::Header);
            }
        }

        if let Some(rule) = &self.rules.jwt {
            if self.jwt_matches(rule, req.headers()) {
                return Some(BypassReason::Jwt);
            }
        }

        None
    }

    fn jwt_matches(&self, rule: &JwtRule, headers: &HeaderMap) -> bool {
        let raw = match header_str(headers, &rule.header) {
            Some(v) if !v.is_empty() => v,
            _ => return false,
        };
        let token = strip_bearer(raw);

        match extract_claim(token, &rule.claim) {
            Ok(value) => value == rule.value,
            Err(e) => {
                if self.log_level.allows(Level::DEBUG) {
                    tracing::debug!(error = %e, "Error parsing JWT token");
                }
                false
            }
        }
    }
}

/// Header value as text. Values with bytes outside visible ASCII are
/// accepted as long as they are valid UTF-8.
fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| std::str::from_utf8(v.as_bytes()).ok())
}

fn strip_bearer(value: &str) -> &str {
    match value.get(..BEARER_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(BEARER_PREFIX) => &value[BEARER_PREFIX.len()..],
        _ => value,
    }
}
