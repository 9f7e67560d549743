//! Resource resolution and streaming
//!
//! Maps a request path onto a packaged resource key, opens it, attaches the
//! cache headers derived from the key and streams the bytes out.

use std::io;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use hyper::header::{HeaderValue, InvalidHeaderValue, CACHE_CONTROL, ETAG, EXPIRES};
use hyper::{Method, StatusCode};
use thiserror::Error;

use super::stream::copy_stream;
use crate::config::WebjarsConfig;
use crate::http::{CacheDirective, CachePolicy, ResponseWriter};
use crate::logger;
use crate::store::ResourceStore;

/// Prefix of the packaging convention
pub const DEFAULT_RESOURCE_ROOT: &str = "/META-INF/resources";

/// What the handler needs to know about a request
#[derive(Debug, Clone, Copy)]
pub struct ResourceRequest<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    pub context_prefix: &'a str,
}

/// Result of a handled request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Resource streamed with status 200
    Found { key: String, bytes: u64 },
    /// No resource under `key`; status 404 was set
    NotFound { key: String },
}

impl Outcome {
    pub fn key(&self) -> &str {
        match self {
            Self::Found { key, .. } | Self::NotFound { key } => key,
        }
    }
}

#[derive(Debug, Error)]
pub enum HandlerError {
    /// Key has fewer segments than the packaging layout requires
    #[error("resource key '{key}' has {segments} segments, expected at least 6")]
    MalformedKey { key: String, segments: usize },

    #[error("resource key '{key}' cannot be used in a header: {source}")]
    InvalidHeader {
        key: String,
        #[source]
        source: InvalidHeaderValue,
    },

    /// Opening or streaming the resource failed
    #[error("I/O error while serving '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
}

/// Serves packaged webjar resources
pub struct WebjarsHandler {
    store: Arc<dyn ResourceStore>,
    resource_root: String,
    cache: CachePolicy,
    buffer_size: usize,
}

impl WebjarsHandler {
    pub fn new(store: Arc<dyn ResourceStore>, config: &WebjarsConfig) -> Self {
        Self {
            store,
            resource_root: config.resource_root.clone(),
            cache: CachePolicy::from_secs(config.cache_ttl_secs),
            buffer_size: config.buffer_size.max(1),
        }
    }

    pub const fn cache_policy(&self) -> CachePolicy {
        self.cache
    }

    pub fn store(&self) -> &dyn ResourceStore {
        self.store.as_ref()
    }

    /// Resource key for `path`: the first occurrence of `context_prefix` is
    /// removed and the resource root prepended.
    pub fn resource_key(&self, path: &str, context_prefix: &str) -> String {
        let relative = if context_prefix.is_empty() {
            path.to_string()
        } else {
            path.replacen(context_prefix, "", 1)
        };
        format!("{}{relative}", self.resource_root)
    }

    /// Handle one request, writing status, headers and body into `out`
    pub fn handle<W>(&self, req: &ResourceRequest<'_>, out: &mut W) -> Result<Outcome, HandlerError>
    where
        W: ResponseWriter + ?Sized,
    {
        self.handle_at(req, out, Utc::now())
    }

    /// Same as [`handle`](Self::handle) with an explicit clock
    pub fn handle_at<W>(
        &self,
        req: &ResourceRequest<'_>,
        out: &mut W,
        now: DateTime<Utc>,
    ) -> Result<Outcome, HandlerError>
    where
        W: ResponseWriter + ?Sized,
    {
        let key = self.resource_key(req.path, req.context_prefix);
        logger::log_resource_requested(req.method, &key);

        let opened = self.store.open(&key).map_err(|source| HandlerError::Io {
            key: key.clone(),
            source,
        })?;
        let Some(mut input) = opened else {
            out.set_status(StatusCode::NOT_FOUND);
            return Ok(Outcome::NotFound { key });
        };

        // Validate everything before the first write so a failure leaves `out` untouched
        let directive = self
            .cache
            .directive(&key, now)
            .map_err(|e| HandlerError::MalformedKey {
                key: key.clone(),
                segments: e.segments,
            })?;
        let headers = header_values(&directive).map_err(|source| HandlerError::InvalidHeader {
            key: key.clone(),
            source,
        })?;

        out.set_status(StatusCode::OK);
        let [etag, expires, cache_control] = headers;
        out.set_header(ETAG, etag);
        out.set_header(EXPIRES, expires);
        out.set_header(CACHE_CONTROL, cache_control);

        let mut buffer = vec![0u8; self.buffer_size];
        let bytes = copy_stream(&mut input, out, &mut buffer).map_err(|source| {
            HandlerError::Io {
                key: key.clone(),
                source,
            }
        })?;

        Ok(Outcome::Found { key, bytes })
    }
}

fn header_values(directive: &CacheDirective) -> Result<[HeaderValue; 3], InvalidHeaderValue> {
    Ok([
        HeaderValue::from_str(&directive.etag)?,
        HeaderValue::from_str(&directive.expires_header())?,
        HeaderValue::from_str(&directive.cache_control)?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::BufferedResponse;
    use crate::store::{MemoryStore, ResourceReader};
    use chrono::TimeZone;

    const JQUERY_KEY: &str = "/META-INF/resources/webjars/jquery/3.6.0/jquery.min.js";

    fn webjars_config(context_path: &str) -> WebjarsConfig {
        WebjarsConfig {
            context_path: context_path.to_string(),
            resource_root: DEFAULT_RESOURCE_ROOT.to_string(),
            cache_ttl_secs: 86_400,
            buffer_size: 4096,
        }
    }

    fn handler(store: MemoryStore) -> WebjarsHandler {
        WebjarsHandler::new(Arc::new(store), &webjars_config("/app"))
    }

    fn request<'a>(method: &'a Method, path: &'a str) -> ResourceRequest<'a> {
        ResourceRequest {
            method,
            path,
            context_prefix: "/app",
        }
    }

    #[test]
    fn test_resource_key() {
        let h = handler(MemoryStore::new());
        assert_eq!(
            h.resource_key("/app/webjars/jquery/3.6.0/jquery.min.js", "/app"),
            JQUERY_KEY
        );
        assert_eq!(h.resource_key("/webjars/a/1.0/a.js", ""), "/META-INF/resources/webjars/a/1.0/a.js");
    }

    #[test]
    fn test_context_prefix_removed_once() {
        let h = handler(MemoryStore::new());
        assert_eq!(
            h.resource_key("/app/webjars/app/1.0/app.js", "/app"),
            "/META-INF/resources/webjars/app/1.0/app.js"
        );
        // First textual match, even when it is not at the start
        assert_eq!(
            h.resource_key("/webjars/app/1.0/x.js", "/app"),
            "/META-INF/resources/webjars/1.0/x.js"
        );
    }

    #[test]
    fn test_found_streams_bytes_with_headers() {
        let h = handler(MemoryStore::new().with(JQUERY_KEY, "/*! jQuery v3.6.0 */"));
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut out = BufferedResponse::new();

        let outcome = h
            .handle_at(
                &request(&Method::GET, "/app/webjars/jquery/3.6.0/jquery.min.js"),
                &mut out,
                now,
            )
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::Found {
                key: JQUERY_KEY.to_string(),
                bytes: 20
            }
        );
        assert_eq!(out.status(), StatusCode::OK);
        assert_eq!(out.body(), b"/*! jQuery v3.6.0 */");
        assert_eq!(out.headers()[ETAG], "jquery.min.js_3.6.0");
        assert_eq!(out.headers()[EXPIRES], "Tue, 02 Jan 2024 00:00:00 GMT");
        assert_eq!(out.headers()[CACHE_CONTROL], "private, max-age=86400");
    }

    #[test]
    fn test_missing_sets_404_only() {
        let h = handler(MemoryStore::new());
        let mut out = BufferedResponse::new();
        let outcome = h
            .handle(&request(&Method::GET, "/app/webjars/missing/1.0/x.js"), &mut out)
            .unwrap();
        assert_eq!(outcome.key(), "/META-INF/resources/webjars/missing/1.0/x.js");
        assert!(matches!(outcome, Outcome::NotFound { .. }));
        assert_eq!(out.status(), StatusCode::NOT_FOUND);
        assert!(out.headers().is_empty());
        assert!(out.body().is_empty());
    }

    #[test]
    fn test_path_through_file_on_disk_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let webjar = dir.path().join("META-INF/resources/webjars/jquery/3.6.0");
        std::fs::create_dir_all(&webjar).unwrap();
        std::fs::write(webjar.join("jquery.min.js"), b"x").unwrap();
        let store = crate::store::DirectoryStore::new(dir.path()).unwrap();
        let h = WebjarsHandler::new(Arc::new(store), &webjars_config("/app"));

        let mut out = BufferedResponse::new();
        let outcome = h
            .handle(
                &request(&Method::GET, "/app/webjars/jquery/3.6.0/jquery.min.js/extra.js"),
                &mut out,
            )
            .unwrap();
        assert!(matches!(outcome, Outcome::NotFound { .. }));
        assert_eq!(out.status(), StatusCode::NOT_FOUND);
        assert!(out.body().is_empty());
    }

    #[test]
    fn test_get_and_post_identical() {
        let h = handler(MemoryStore::new().with(JQUERY_KEY, "x"));
        let now = Utc::now();
        let path = "/app/webjars/jquery/3.6.0/jquery.min.js";

        let mut get = BufferedResponse::new();
        let mut post = BufferedResponse::new();
        let a = h.handle_at(&request(&Method::GET, path), &mut get, now).unwrap();
        let b = h.handle_at(&request(&Method::POST, path), &mut post, now).unwrap();

        assert_eq!(a, b);
        assert_eq!(get.status(), post.status());
        assert_eq!(get.headers(), post.headers());
        assert_eq!(get.body(), post.body());
    }

    #[test]
    fn test_etag_deterministic() {
        let h = handler(MemoryStore::new().with(JQUERY_KEY, "x"));
        let path = "/app/webjars/jquery/3.6.0/jquery.min.js";
        let etags: Vec<_> = (0..2)
            .map(|_| {
                let mut out = BufferedResponse::new();
                h.handle(&request(&Method::GET, path), &mut out).unwrap();
                out.headers()[ETAG].clone()
            })
            .collect();
        assert_eq!(etags[0], etags[1]);
    }

    #[test]
    fn test_expires_tracks_clock() {
        let h = handler(MemoryStore::new().with(JQUERY_KEY, "x"));
        let before = Utc::now();
        let mut out = BufferedResponse::new();
        h.handle(
            &request(&Method::GET, "/app/webjars/jquery/3.6.0/jquery.min.js"),
            &mut out,
        )
        .unwrap();
        let after = Utc::now();

        let expires = out.headers()[EXPIRES].to_str().unwrap();
        let expires = DateTime::parse_from_rfc2822(expires)
            .unwrap()
            .with_timezone(&Utc);
        let ttl = chrono::TimeDelta::seconds(86_400);
        // Header precision is one second
        assert!(expires >= before + ttl - chrono::TimeDelta::seconds(1));
        assert!(expires <= after + ttl);
    }

    #[test]
    fn test_custom_ttl() {
        let mut config = webjars_config("");
        config.cache_ttl_secs = 600;
        let h = WebjarsHandler::new(
            Arc::new(MemoryStore::new().with("/META-INF/resources/webjars/a/2.0/a.css", "a{}")),
            &config,
        );
        let mut out = BufferedResponse::new();
        let req = ResourceRequest {
            method: &Method::GET,
            path: "/webjars/a/2.0/a.css",
            context_prefix: "",
        };
        h.handle(&req, &mut out).unwrap();
        assert_eq!(out.headers()[CACHE_CONTROL], "private, max-age=600");
        assert_eq!(h.cache_policy().ttl_millis(), 600_000);
    }

    #[test]
    fn test_short_key_is_error_without_output() {
        let h = handler(MemoryStore::new().with("/META-INF/resources/a.js", "a"));
        let mut out = BufferedResponse::new();
        let err = h
            .handle(&request(&Method::GET, "/app/a.js"), &mut out)
            .unwrap_err();
        assert!(matches!(
            err,
            HandlerError::MalformedKey { segments: 4, .. }
        ));
        assert!(out.headers().is_empty());
        assert!(out.body().is_empty());
    }

    struct BrokenStore;

    impl ResourceStore for BrokenStore {
        fn open(&self, _key: &str) -> io::Result<Option<ResourceReader>> {
            Err(io::Error::from(io::ErrorKind::PermissionDenied))
        }

        fn describe(&self) -> String {
            "broken".to_string()
        }
    }

    #[test]
    fn test_open_error_propagates() {
        let h = WebjarsHandler::new(Arc::new(BrokenStore), &webjars_config("/app"));
        let mut out = BufferedResponse::new();
        let err = h
            .handle(
                &request(&Method::GET, "/app/webjars/jquery/3.6.0/jquery.min.js"),
                &mut out,
            )
            .unwrap_err();
        assert!(matches!(err, HandlerError::Io { .. }));
    }

    #[test]
    fn test_small_buffer_round_trip() {
        let data: Vec<u8> = (0..=255u8).cycle().take(5000).collect();
        let mut config = webjars_config("/app");
        config.buffer_size = 7;
        let h = WebjarsHandler::new(
            Arc::new(MemoryStore::new().with(JQUERY_KEY, data.clone())),
            &config,
        );
        let mut out = BufferedResponse::new();
        h.handle(
            &request(&Method::POST, "/app/webjars/jquery/3.6.0/jquery.min.js"),
            &mut out,
        )
        .unwrap();
        assert_eq!(out.body(), data.as_slice());
    }
}
