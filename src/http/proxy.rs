//! Reverse-proxy forwarding.
//!
//! # Responsibilities
//! - Parse and validate a proxy target (scheme + host required)
//! - Build the outbound request from the inbound parts without touching them
//! - Strip hop-by-hop headers on both legs, append `X-Forwarded-For`
//! - Bound the wait for response headers with a timeout
//!
//! # Design Decisions
//! - The inbound request is consumed into parts; the outbound request is a
//!   fresh value, so nothing the caller still holds is rewritten
//! - Timeouts surface as `ProxyError::Timeout`, never as a hang

use axum::{
    body::Body,
    http::{
        header::{CONNECTION, HOST},
        request::Parts,
        uri::{Authority, InvalidUri, Scheme},
        HeaderMap, HeaderName, HeaderValue, Request, Response, Uri,
    },
};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Shared outbound client; speaks plain HTTP and HTTPS.
pub type HttpClient = Client<HttpsConnector<HttpConnector>, Body>;

const X_FORWARDED_FOR: &str = "x-forwarded-for";

const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Errors while validating a proxy target.
#[derive(Debug, Error)]
pub enum TargetError {
    #[error("invalid URL: {0}")]
    Invalid(#[from] url::ParseError),

    #[error("URL must include scheme and host: {0}")]
    Incomplete(String),

    #[error("unsupported scheme {0}: expected http or https")]
    UnsupportedScheme(String),

    #[error("invalid authority: {0}")]
    Authority(#[from] InvalidUri),

    #[error("invalid host header: {0}")]
    HostHeader(#[from] axum::http::header::InvalidHeaderValue),
}

/// Errors while forwarding a request.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("no response headers within {0:?}")]
    Timeout(Duration),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("could not build upstream request: {0}")]
    InvalidRequest(#[from] axum::http::Error),
}

/// A validated upstream origin.
#[derive(Debug, Clone)]
pub struct ServiceTarget {
    url: Url,
    scheme: Scheme,
    authority: Authority,
    host_header: HeaderValue,
}

impl ServiceTarget {
    pub fn parse(raw: &str) -> Result<Self, TargetError> {
        let url = Url::parse(raw)?;

        let host = match url.host_str() {
            Some(h) if !h.is_empty() => h,
            _ => return Err(TargetError::Incomplete(raw.to_string())),
        };
        let scheme = match url.scheme() {
            "http" => Scheme::HTTP,
            "https" => Scheme::HTTPS,
            other => return Err(TargetError::UnsupportedScheme(other.to_string())),
        };

        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let host_header = HeaderValue::from_str(&authority)?;
        let authority = Authority::try_from(authority.as_str())?;

        Ok(Self {
            url,
            scheme,
            authority,
            host_header,
        })
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Outbound URI for an inbound one: target path joined with the request
    /// path, queries concatenated.
    pub fn rewrite_uri(&self, inbound: &Uri) -> Result<Uri, axum::http::Error> {
        let path = join_paths(self.url.path(), inbound.path());
        let path_and_query = match join_queries(self.url.query(), inbound.query()) {
            Some(q) => format!("{}?{}", path, q),
            None => path,
        };

        Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()
    }

    /// Build the outbound request. `client_ip` is appended to
    /// `X-Forwarded-For` when known.
    pub fn build_request(
        &self,
        parts: &Parts,
        body: Body,
        client_ip: Option<IpAddr>,
    ) -> Result<Request<Body>, ProxyError> {
        let uri = self.rewrite_uri(&parts.uri)?;
        let mut outbound = Request::builder()
            .method(parts.method.clone())
            .uri(uri)
            .body(body)?;

        let headers = outbound.headers_mut();
        copy_end_to_end(&parts.headers, headers, &[]);
        headers.insert(HOST, self.host_header.clone());
        if let Some(ip) = client_ip {
            append_forwarded_for(headers, ip);
        }

        Ok(outbound)
    }
}

impl fmt::Display for ServiceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// Create the outbound client. TLS targets are verified against the
/// bundled webpki roots.
pub fn build_client() -> HttpClient {
    let https = HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .build();
    Client::builder(TokioExecutor::new()).build(https)
}

/// Send `req`, waiting at most `timeout` for the response headers.
pub async fn forward(
    client: &HttpClient,
    req: Request<Body>,
    timeout: Duration,
) -> Result<Response<Body>, ProxyError> {
    match tokio::time::timeout(timeout, client.request(req)).await {
        Ok(Ok(response)) => Ok(response.map(Body::new)),
        Ok(Err(e)) => Err(ProxyError::Upstream(e)),
        Err(_) => Err(ProxyError::Timeout(timeout)),
    }
}

/// Copy headers, dropping hop-by-hop ones, those listed in `Connection`,
/// and any name in `keep` (which the destination already owns).
pub fn copy_end_to_end(src: &HeaderMap, dst: &mut HeaderMap, keep: &[HeaderName]) {
    let listed: Vec<String> = src
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|token| token.trim().to_ascii_lowercase())
        .filter(|token| !token.is_empty())
        .collect();

    for (name, value) in src.iter() {
        let lower = name.as_str();
        if HOP_BY_HOP.contains(&lower) || listed.iter().any(|l| l == lower) || keep.contains(name) {
            continue;
        }
        dst.append(name.clone(), value.clone());
    }
}

fn append_forwarded_for(headers: &mut HeaderMap, ip: IpAddr) {
    let prior: Vec<&str> = headers
        .get_all(X_FORWARDED_FOR)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();

    let value = if prior.is_empty() {
        ip.to_string()
    } else {
        format!("{}, {}", prior.join(", "), ip)
    };

    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(X_FORWARDED_FOR, value);
    }
}

fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}

fn join_queries(base: Option<&str>, query: Option<&str>) -> Option<String> {
    match (base.filter(|q| !q.is_empty()), query.filter(|q| !q.is_empty())) {
        (Some(b), Some(q)) => Some(format!("{}&{}", b, q)),
        (Some(b), None) => Some(b.to_string()),
        (None, Some(q)) => Some(q.to_string()),
        (None, None) => None,
    }
}
