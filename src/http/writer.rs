//! Response sinks.
//!
//! # Responsibilities
//! - `ResponseSink`: header-set, status-write and body-write capability
//! - `BufferedResponse`: sink that assembles an axum `Response`
//! - `StatusOverrideWriter`: decorator that pins the status code
//!
//! A sink accepts the status once; later writes are ignored. Writing a body
//! before any status implies the sink's default status.

use axum::{
    body::Body,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("response body already written")]
    BodyAlreadyWritten,
}

/// Something a response can be written into.
pub trait ResponseSink {
    fn headers_mut(&mut self) -> &mut HeaderMap;

    fn write_status(&mut self, status: StatusCode);

    fn write_body(&mut self, body: Body) -> Result<(), SinkError>;
}

/// Collects status, headers and body for a single response.
#[derive(Debug, Default)]
pub struct BufferedResponse {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Option<Body>,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn into_response(self) -> Response {
        let mut response = Response::new(self.body.unwrap_or_else(Body::empty));
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}

impl ResponseSink for BufferedResponse {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_status(&mut self, status: StatusCode) {
        if self.status.is_none() {
            self.status = Some(status);
        }
    }

    fn write_body(&mut self, body: Body) -> Result<(), SinkError> {
        if self.body.is_some() {
            return Err(SinkError::BodyAlreadyWritten);
        }
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.body = Some(body);
        Ok(())
    }
}

/// Forces a fixed status onto the wrapped sink.
///
/// Whatever status an inner responder (e.g. a proxied maintenance service)
/// writes, the wrapped sink receives `status`, exactly once.
pub struct StatusOverrideWriter<'a, S: ResponseSink + ?Sized> {
    inner: &'a mut S,
    status: StatusCode,
    header_written: bool,
}

impl<'a, S: ResponseSink + ?Sized> StatusOverrideWriter<'a, S> {
    pub fn new(inner: &'a mut S, status: StatusCode) -> Self {
        Self {
            inner,
            status,
            header_written: false,
        }
    }
}

impl<S: ResponseSink + ?Sized> ResponseSink for StatusOverrideWriter<'_, S> {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn write_status(&mut self, _status: StatusCode) {
        if !self.header_written {
            self.inner.write_status(self.status);
            self.header_written = true;
        }
    }

    fn write_body(&mut self, body: Body) -> Result<(), SinkError> {
        if !self.header_written {
            self.write_status(self.status);
        }
        self.inner.write_body(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    /// Records every call that reaches it.
    #[derive(Default)]
    struct RecordingSink {
        statuses: Vec<StatusCode>,
        bodies: usize,
        headers: HeaderMap,
    }

    impl ResponseSink for RecordingSink {
        fn headers_mut(&mut self) -> &mut HeaderMap {
            &mut self.headers
        }

        fn write_status(&mut self, status: StatusCode) {
            self.statuses.push(status);
        }

        fn write_body(&mut self, _body: Body) -> Result<(), SinkError> {
            self.bodies += 1;
            Ok(())
        }
    }

    #[test]
    fn test_override_replaces_status_once() {
        let mut sink = RecordingSink::default();
        {
            let mut writer = StatusOverrideWriter::new(&mut sink, StatusCode::SERVICE_UNAVAILABLE);
            writer.write_status(StatusCode::OK);
            writer.write_status(StatusCode::NOT_FOUND);
            writer.write_body(Body::from("page")).unwrap();
        }
        assert_eq!(sink.statuses, vec![StatusCode::SERVICE_UNAVAILABLE]);
        assert_eq!(sink.bodies, 1);
    }

    #[test]
    fn test_body_first_defaults_to_override() {
        let mut sink = RecordingSink::default();
        {
            let mut writer = StatusOverrideWriter::new(&mut sink, StatusCode::TOO_MANY_REQUESTS);
            writer.write_body(Body::from("page")).unwrap();
            writer.write_status(StatusCode::OK);
        }
        assert_eq!(sink.statuses, vec![StatusCode::TOO_MANY_REQUESTS]);
    }

    #[test]
    fn test_headers_pass_through() {
        let mut sink = RecordingSink::default();
        {
            let mut writer = StatusOverrideWriter::new(&mut sink, StatusCode::SERVICE_UNAVAILABLE);
            writer
                .headers_mut()
                .insert("x-upstream", HeaderValue::from_static("yes"));
        }
        assert_eq!(sink.headers.get("x-upstream").unwrap(), "yes");
    }

    #[test]
    fn test_buffered_first_status_wins() {
        let mut sink = BufferedResponse::new();
        sink.write_status(StatusCode::SERVICE_UNAVAILABLE);
        sink.write_status(StatusCode::OK);
        assert_eq!(sink.status(), Some(StatusCode::SERVICE_UNAVAILABLE));

        let response = sink.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_buffered_body_defaults_to_ok() {
        let mut sink = BufferedResponse::new();
        sink.write_body(Body::from("hello")).unwrap();
        assert_eq!(sink.status(), Some(StatusCode::OK));
    }

    #[test]
    fn test_buffered_rejects_second_body() {
        let mut sink = BufferedResponse::new();
        sink.write_body(Body::from("one")).unwrap();
        assert!(matches!(
            sink.write_body(Body::from("two")),
            Err(SinkError::BodyAlreadyWritten)
        ));
    }
}
