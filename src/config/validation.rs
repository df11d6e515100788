//! Configuration validation.
//!
//! # Responsibilities
//! - Resolve exactly one content source (inline | file | service)
//! - Normalize zero/empty values to their defaults
//! - Parse header names, status code and content type up front
//!
//! # Design Decisions
//! - Every check runs before the gate serves traffic; a config that passes
//!   here cannot fail the same way at request time
//! - Pure function: &WardenConfig → Result<ValidatedConfig, WardenError>,
//!   except for the initial maintenance file load

use axum::http::{header::InvalidHeaderName, HeaderName, HeaderValue, StatusCode};
use std::time::Duration;
use thiserror::Error;

use crate::bypass::{AnnotationRule, BypassRules, EnablementRule, HeaderRule, JwtRule};
use crate::config::schema::{
    WardenConfig, DEFAULT_CONTENT_TYPE, DEFAULT_STATUS_CODE, DEFAULT_TIMEOUT_SECS,
};
use crate::content::{CacheError, ContentSource, FileCache};
use crate::http::proxy::{ServiceTarget, TargetError};
use crate::observability::logging::LogLevel;

/// Construction-time errors. Any of these rejects the gate.
#[derive(Debug, Error)]
pub enum WardenError {
    #[error("either maintenanceService, maintenanceFilePath, or maintenanceContent must be specified")]
    NoContentSource,

    #[error("only one of maintenanceService, maintenanceFilePath, or maintenanceContent may be specified (got {0})")]
    ConflictingContentSources(String),

    #[error("failed to load maintenance file: {0}")]
    File(#[from] CacheError),

    #[error("invalid maintenance service URL: {0}")]
    Service(#[from] TargetError),

    #[error("invalid status code {0}")]
    InvalidStatusCode(u16),

    #[error("invalid content type {0:?}")]
    InvalidContentType(String),

    #[error("invalid header name {name:?}: {source}")]
    InvalidHeaderName {
        name: String,
        #[source]
        source: InvalidHeaderName,
    },
}

/// Fully resolved gate settings.
#[derive(Debug)]
pub struct ValidatedConfig {
    pub source: ContentSource,
    pub status: StatusCode,
    pub content_type: HeaderValue,
    pub timeout: Duration,
    pub rules: BypassRules,
    pub enablement: EnablementRule,
    pub log_level: LogLevel,
}

pub fn validate_config(config: &WardenConfig) -> Result<ValidatedConfig, WardenError> {
    let status_code = if config.status_code == 0 {
        DEFAULT_STATUS_CODE
    } else {
        config.status_code
    };
    let status = StatusCode::from_u16(status_code)
        .map_err(|_| WardenError::InvalidStatusCode(status_code))?;

    let content_type = if config.content_type.is_empty() {
        DEFAULT_CONTENT_TYPE
    } else {
        config.content_type.as_str()
    };
    let content_type = HeaderValue::from_str(content_type)
        .map_err(|_| WardenError::InvalidContentType(content_type.to_string()))?;

    let timeout = Duration::from_secs(if config.maintenance_timeout == 0 {
        DEFAULT_TIMEOUT_SECS
    } else {
        config.maintenance_timeout
    });

    Ok(ValidatedConfig {
        rules: bypass_rules(config)?,
        enablement: enablement_rule(config)?,
        source: content_source(config)?,
        status,
        content_type,
        timeout,
        log_level: LogLevel::from(config.log_level),
    })
}

fn content_source(config: &WardenConfig) -> Result<ContentSource, WardenError> {
    let configured: Vec<&str> = [
        ("maintenanceContent", &config.maintenance_content),
        ("maintenanceFilePath", &config.maintenance_file_path),
        ("maintenanceService", &config.maintenance_service),
    ]
    .iter()
    .filter(|(_, value)| !value.is_empty())
    .map(|(name, _)| *name)
    .collect();

    match configured.as_slice() {
        [] => Err(WardenError::NoContentSource),
        ["maintenanceContent"] => Ok(ContentSource::Inline(
            config.maintenance_content.clone().into(),
        )),
        ["maintenanceFilePath"] => Ok(ContentSource::File(FileCache::load(
            &config.maintenance_file_path,
        )?)),
        ["maintenanceService"] => Ok(ContentSource::Service(ServiceTarget::parse(
            &config.maintenance_service,
        )?)),
        many => Err(WardenError::ConflictingContentSources(many.join(", "))),
    }
}

fn bypass_rules(config: &WardenConfig) -> Result<BypassRules, WardenError> {
    let header = if config.bypass_header.is_empty() {
        None
    } else {
        Some(HeaderRule {
            name: header_name(&config.bypass_header)?,
            value: config.bypass_header_value.clone(),
        })
    };

    let jwt = if config.bypass_jwt_token_header.is_empty()
        || config.bypass_jwt_token_claim.is_empty()
        || config.bypass_jwt_token_claim_value.is_empty()
    {
        None
    } else {
        Some(JwtRule {
            header: header_name(&config.bypass_jwt_token_header)?,
            claim: config.bypass_jwt_token_claim.clone(),
            value: config.bypass_jwt_token_claim_value.clone(),
        })
    };

    Ok(BypassRules {
        favicon: config.bypass_favicon,
        paths: config.bypass_paths.clone(),
        header,
        jwt,
    })
}

fn enablement_rule(config: &WardenConfig) -> Result<EnablementRule, WardenError> {
    let annotation = if config.enabled_annotation.is_empty()
        || config.enabled_annotation_header.is_empty()
    {
        None
    } else {
        Some(AnnotationRule::new(
            header_name(&config.enabled_annotation_header)?,
            &config.enabled_annotation,
            &config.enabled_annotation_value,
        ))
    };
    Ok(EnablementRule::new(config.enabled, annotation))
}

fn header_name(name: &str) -> Result<HeaderName, WardenError> {
    HeaderName::try_from(name).map_err(|source| WardenError::InvalidHeaderName {
        name: name.to_string(),
        source,
    })
}
