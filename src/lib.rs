//! Webjars resource server
//!
//! Serves versioned front-end libraries packaged under
//! `/META-INF/resources/webjars/<name>/<version>/...` with cache headers
//! derived from the resource path.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
pub mod store;
