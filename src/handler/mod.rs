//! Request handler module
//!
//! Resolves request paths to packaged webjar resources and streams them out.
//! `resolver` holds the host-independent logic; `router` adapts it to hyper.

pub mod resolver;
pub mod router;
pub mod stream;

// Re-export main entry points
pub use resolver::{HandlerError, Outcome, ResourceRequest, WebjarsHandler};
pub use router::handle_request;
