//! Unverified JWT claim extraction.
//!
//! The token signature is NOT checked. A claim read here is only as
//! trustworthy as the transport that delivered the header, so this must never
//! be used as an authentication mechanism on its own.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Errors that can occur while reading a claim.
#[derive(Debug, Error)]
pub enum ClaimError {
    /// Token is not `header.payload.signature`.
    #[error("invalid JWT token format: expected 3 segments, got {0}")]
    MalformedToken(usize),

    /// Payload segment is not unpadded URL-safe base64.
    #[error("error decoding JWT payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),

    /// Payload is not a JSON object.
    #[error("error parsing JWT claims: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    /// Claim is absent from the payload.
    #[error("claim {0} not found in JWT token")]
    ClaimNotFound(String),
}

/// Extract `claim` from `token` and render it as a string.
pub fn extract_claim(token: &str, claim: &str) -> Result<String, ClaimError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(ClaimError::MalformedToken(segments.len()));
    }

    let payload = URL_SAFE_NO_PAD.decode(segments[1])?;
    let claims: Map<String, Value> = serde_json::from_slice(&payload)?;

    claims
        .get(claim)
        .map(stringify)
        .ok_or_else(|| ClaimError::ClaimNotFound(claim.to_string()))
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => format_number(n),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn format_number(n: &Number) -> String {
    match n.as_f64() {
        Some(v) => format_general(v),
        None => n.to_string(),
    }
}

/// Shortest representation, switching to exponent notation for very large or
/// very small magnitudes (`1.7e+09`, `1e-05`).
fn format_general(v: f64) -> String {
    let sci = format!("{:e}", v);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return v.to_string();
    };
    let exp: i32 = match exp.parse() {
        Ok(e) => e,
        Err(_) => return v.to_string(),
    };

    if exp < -4 || exp >= 6 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exp.abs())
    } else {
        v.to_string()
    }
}
