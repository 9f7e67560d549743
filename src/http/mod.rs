//! HTTP protocol layer module
//!
//! Cache headers, content types, fixed responses and the response sink the
//! resource handler writes into.

pub mod cache;
pub mod mime;
pub mod response;
pub mod writer;

// Re-export commonly used types
pub use cache::{CacheDirective, CachePolicy};
pub use response::{
    build_404_response, build_405_response, build_500_response, build_options_response,
};
pub use writer::{BufferedResponse, ResponseWriter};
