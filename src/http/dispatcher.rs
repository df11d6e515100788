//! Maintenance response dispatch.
//!
//! # Responsibilities
//! - Set the maintenance headers on every maintenance response
//! - Run exactly one content strategy (inline, file, service)
//! - Degrade every request-time failure to the configured status
//!
//! # Design Decisions
//! - The content source is a tagged variant chosen at construction, so there
//!   is no "nothing configured" branch at request time
//! - Proxied responses go through `StatusOverrideWriter`; an upstream 200
//!   still reaches the client as the configured status

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE, RETRY_AFTER},
        HeaderName, HeaderValue, Request, StatusCode,
    },
};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

use crate::content::{ContentSource, FileCache};
use crate::http::proxy::{self, HttpClient, ServiceTarget};
use crate::http::writer::{ResponseSink, StatusOverrideWriter};
use crate::observability::LogLevel;

pub const X_MAINTENANCE_MODE: &str = "x-maintenance-mode";
pub const UNAVAILABLE_BODY: &str = "Service temporarily unavailable";
const NO_CACHE: &str = "no-cache, no-store, must-revalidate";
const RETRY_AFTER_SECS: &str = "3600";

/// Produces maintenance responses from the configured content source.
pub struct MaintenanceDispatcher {
    source: ContentSource,
    status: StatusCode,
    content_type: HeaderValue,
    timeout: Duration,
    client: HttpClient,
    log_level: LogLevel,
}

impl MaintenanceDispatcher {
    pub fn new(
        source: ContentSource,
        status: StatusCode,
        content_type: HeaderValue,
        timeout: Duration,
        log_level: LogLevel,
    ) -> Self {
        Self {
            source,
            status,
            content_type,
            timeout,
            client: proxy::build_client(),
            log_level,
        }
    }

    /// Write the maintenance response for `req` into `sink`.
    pub async fn serve<S>(&self, req: Request<Body>, sink: &mut S)
    where
        S: ResponseSink + Send + ?Sized,
    {
        self.set_headers(sink);

        match &self.source {
            ContentSource::Inline(content) => self.serve_inline(content.clone().into(), sink),
            ContentSource::File(cache) => self.serve_file(cache, sink),
            ContentSource::Service(target) => self.serve_service(target, req, sink).await,
        }
    }

    fn set_headers<S: ResponseSink + ?Sized>(&self, sink: &mut S) {
        let headers = sink.headers_mut();
        headers.insert(X_MAINTENANCE_MODE, HeaderValue::from_static("true"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static(NO_CACHE));
        headers.insert(RETRY_AFTER, HeaderValue::from_static(RETRY_AFTER_SECS));
        headers.insert(CONTENT_TYPE, self.content_type.clone());
    }

    fn serve_inline<S: ResponseSink + ?Sized>(&self, body: Body, sink: &mut S) {
        sink.write_status(self.status);
        if let Err(e) = sink.write_body(body) {
            if self.log_level.allows(Level::ERROR) {
                tracing::error!(error = %e, "Error writing maintenance content");
            }
        }
    }

    fn serve_file<S: ResponseSink + ?Sized>(&self, cache: &FileCache, sink: &mut S) {
        match cache.ensure_loaded() {
            Ok(true) if self.log_level.allows(Level::INFO) => {
                tracing::info!(path = %cache.path().display(), "Reloaded maintenance file");
            }
            Ok(_) => {}
            Err(e) => {
                if self.log_level.allows(Level::ERROR) {
                    tracing::error!(error = %e, "Failed to load maintenance file");
                }
                self.write_unavailable(sink);
                return;
            }
        }

        match cache.content() {
            Some(content) => self.serve_inline(content.into(), sink),
            None => self.write_unavailable(sink),
        }
    }

    async fn serve_service<S>(&self, target: &ServiceTarget, req: Request<Body>, sink: &mut S)
    where
        S: ResponseSink + Send + ?Sized,
    {
        let client_ip = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        let (parts, body) = req.into_parts();

        let mut writer = StatusOverrideWriter::new(sink, self.status);

        let response = match target.build_request(&parts, body, client_ip) {
            Ok(outbound) => proxy::forward(&self.client, outbound, self.timeout).await,
            Err(e) => Err(e),
        };

        match response {
            Ok(response) => {
                let (upstream, body) = response.into_parts();
                proxy::copy_end_to_end(&upstream.headers, writer.headers_mut(), &owned_headers());
                writer.write_status(upstream.status);
                if let Err(e) = writer.write_body(body) {
                    if self.log_level.allows(Level::ERROR) {
                        tracing::error!(error = %e, "Error writing maintenance service response");
                    }
                }
            }
            Err(e) => {
                if self.log_level.allows(Level::ERROR) {
                    tracing::error!(service = %target, error = %e, "Error proxying to maintenance service");
                }
                self.write_unavailable(&mut writer);
            }
        }
    }

    fn write_unavailable<S: ResponseSink + ?Sized>(&self, sink: &mut S) {
        self.serve_inline(Body::from(UNAVAILABLE_BODY), sink);
    }
}

/// Headers the gate sets itself; upstream values for these are dropped.
fn owned_headers() -> [HeaderName; 4] {
    [
        HeaderName::from_static(X_MAINTENANCE_MODE),
        CACHE_CONTROL,
        RETRY_AFTER,
        CONTENT_TYPE,
    ]
}
