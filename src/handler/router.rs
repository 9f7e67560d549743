//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, running the
//! resource handler off the async workers, and mapping its outcome to a
//! hyper response.

use crate::config::AppState;
use crate::handler::resolver::{HandlerError, Outcome, ResourceRequest};
use crate::http::{self, mime, BufferedResponse, ResponseWriter};
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, CONTENT_TYPE, REFERER, USER_AGENT};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let is_head = method == Method::HEAD;
    let access_log = state.access_log();

    if access_log {
        logger::log_request(&method, req.uri(), req.version());
    }

    let response = match check_http_method(&method) {
        Some(resp) => resp,
        None => serve_resource(&state, &method, req.uri().path(), is_head).await,
    };

    if access_log {
        let mut entry = AccessLogEntry::new(
            remote_addr.ip().to_string(),
            method.to_string(),
            req.uri().path().to_string(),
        );
        entry.query = req.uri().query().map(ToString::to_string);
        entry.http_version = version_label(req.version()).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.referer = header_string(&req, REFERER);
        entry.user_agent = header_string(&req, USER_AGENT);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// GET, POST and HEAD reach the resource handler; everything else is answered here
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::POST | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response()),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Run the resource handler on the blocking pool, since streaming may block on I/O
async fn serve_resource(
    state: &Arc<AppState>,
    method: &Method,
    path: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let handler = Arc::clone(&state.handler);
    let context_prefix = state.config.webjars.context_path.clone();
    let method = method.clone();
    let path = path.to_string();

    let result = tokio::task::spawn_blocking(move || {
        let req = ResourceRequest {
            method: &method,
            path: &path,
            context_prefix: &context_prefix,
        };
        let mut out = BufferedResponse::new();
        handler.handle(&req, &mut out).map(|outcome| (outcome, out))
    })
    .await;

    match result {
        Ok(Ok((Outcome::Found { key, bytes }, mut out))) => {
            out.set_header(
                CONTENT_TYPE,
                HeaderValue::from_static(mime::content_type_for(&key)),
            );
            logger::log_response(bytes);
            out.into_response(is_head)
        }
        Ok(Ok((Outcome::NotFound { key }, _))) => {
            logger::log_not_found(&key);
            http::build_404_response()
        }
        Ok(Err(err @ HandlerError::MalformedKey { .. })) => {
            logger::log_warning(&err.to_string());
            http::build_500_response()
        }
        Ok(Err(err)) => {
            logger::log_error(&err.to_string());
            http::build_500_response()
        }
        Err(join_err) => {
            logger::log_error(&format!("Resource handler task failed: {join_err}"));
            http::build_500_response()
        }
    }
}

fn header_string<B>(req: &Request<B>, name: hyper::header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

const fn version_label(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
