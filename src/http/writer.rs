//! Response sink used by the resource handler
//!
//! The handler only knows `ResponseWriter`; hosts adapt it to their own
//! response type. `BufferedResponse` is the adapter for hyper.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH};
use hyper::{Response, StatusCode};
use std::io;

/// Minimal response contract a host must provide
pub trait ResponseWriter {
    fn set_status(&mut self, status: StatusCode);
    fn set_header(&mut self, name: HeaderName, value: HeaderValue);
    fn write(&mut self, chunk: &[u8]) -> io::Result<()>;
}

/// Collects status, headers and body in memory
#[derive(Debug)]
pub struct BufferedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    pub const fn status(&self) -> StatusCode {
        self.status
    }

    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Convert into a hyper response; HEAD keeps `Content-Length` but drops the body
    pub fn into_response(self, is_head: bool) -> Response<Full<Bytes>> {
        let content_length = self.body.len();
        let body = if is_head {
            Bytes::new()
        } else {
            Bytes::from(self.body)
        };

        let mut response = Response::new(Full::new(body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        if content_length > 0 || self.status == StatusCode::OK {
            response
                .headers_mut()
                .insert(CONTENT_LENGTH, HeaderValue::from(content_length));
        }
        response
    }
}

impl Default for BufferedResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseWriter for BufferedResponse {
    fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    fn write(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.body.extend_from_slice(chunk);
        Ok(())
    }
}
