//! Configuration schema definitions.
//!
//! This module defines the configuration consumed by the maintenance gate.
//! All types derive Serde traits for deserialization from config files; field
//! names are camelCase so existing middleware configs can be reused verbatim.

use serde::{Deserialize, Serialize};

/// Default status returned while maintenance is active.
pub const DEFAULT_STATUS_CODE: u16 = 503;

/// Default content type for maintenance responses.
pub const DEFAULT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Default response-header timeout for the maintenance service, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Root configuration for the maintenance gate.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct WardenConfig {
    /// URL of a service that renders the maintenance page.
    pub maintenance_service: String,

    /// Path to a static maintenance page on disk.
    pub maintenance_file_path: String,

    /// Maintenance page served directly from configuration.
    pub maintenance_content: String,

    /// Header name that lets a request bypass maintenance mode.
    pub bypass_header: String,

    /// Expected value of the bypass header.
    pub bypass_header_value: String,

    /// Header carrying a JWT (optionally `Bearer`-prefixed).
    #[serde(rename = "bypassJWTTokenHeader")]
    pub bypass_jwt_token_header: String,

    /// Claim inspected inside the JWT payload.
    #[serde(rename = "bypassJWTTokenClaim")]
    pub bypass_jwt_token_claim: String,

    /// Claim value that grants a bypass.
    #[serde(rename = "bypassJWTTokenClaimValue")]
    pub bypass_jwt_token_claim_value: String,

    /// Static maintenance switch.
    pub enabled: bool,

    /// Status code for maintenance responses (0 means 503).
    pub status_code: u16,

    /// Path prefixes that always reach the backend.
    pub bypass_paths: Vec<String>,

    /// Let `/favicon.ico` requests through.
    pub bypass_favicon: bool,

    /// Log verbosity (0=none, 1=error, 2=info, 3=debug).
    pub log_level: u8,

    /// Response-header timeout for the maintenance service in seconds.
    pub maintenance_timeout: u64,

    /// Content type of maintenance responses.
    pub content_type: String,

    /// Annotation name that force-enables maintenance.
    pub enabled_annotation: String,

    /// Annotation value that force-enables maintenance.
    pub enabled_annotation_value: String,

    /// Header the ingress uses to transport annotations.
    pub enabled_annotation_header: String,
}

impl Default for WardenConfig {
    fn default() -> Self {
        Self {
            maintenance_service: String::new(),
            maintenance_file_path: String::new(),
            maintenance_content: String::new(),
            bypass_header: "X-Maintenance-Bypass".to_string(),
            bypass_header_value: "true".to_string(),
            bypass_jwt_token_header: "Authorization".to_string(),
            bypass_jwt_token_claim: String::new(),
            bypass_jwt_token_claim_value: String::new(),
            enabled: true,
            status_code: DEFAULT_STATUS_CODE,
            bypass_paths: Vec::new(),
            bypass_favicon: true,
            log_level: 1,
            maintenance_timeout: DEFAULT_TIMEOUT_SECS,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            enabled_annotation: String::new(),
            enabled_annotation_value: "true".to_string(),
            enabled_annotation_header: String::new(),
        }
    }
}

/// Settings for the standalone binary.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Origin that pass-through traffic is forwarded to.
    pub upstream: String,

    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            upstream: "http://127.0.0.1:3000".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Top-level layout of a config file for the binary.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct FileConfig {
    pub server: ServerConfig,
    pub maintenance: WardenConfig,
}
