//! MIME type detection module
//!
//! Returns the Content-Type for a resource key based on its extension.
//! The table covers what front-end libraries ship: scripts, styles, source
//! maps, fonts and images.

use std::path::Path;

/// Content-Type for the file named by `key`
///
/// # Examples
/// ```
/// use webjars_server::http::mime::content_type_for;
/// assert_eq!(content_type_for("/webjars/jquery/3.6.0/jquery.min.js"), "application/javascript");
/// assert_eq!(content_type_for("/webjars/x/1.0/LICENSE"), "application/octet-stream");
/// ```
pub fn content_type_for(key: &str) -> &'static str {
    let extension = Path::new(key).extension().and_then(|e| e.to_str());
    get_content_type(extension)
}

/// Get MIME Content-Type based on file extension
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    let Some(ext) = extension else {
        return "application/octet-stream";
    };
    match ext.to_ascii_lowercase().as_str() {
        // Scripts and data
        "js" | "mjs" | "cjs" => "application/javascript",
        "map" | "json" => "application/json",
        "wasm" => "application/wasm",
        "ts" => "application/typescript",

        // Markup and styles
        "css" => "text/css",
        "less" => "text/x-less",
        "scss" => "text/x-scss",
        "html" | "htm" => "text/html; charset=utf-8",
        "txt" | "md" => "text/plain; charset=utf-8",
        "xml" => "application/xml",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",

        // Fonts
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "eot" => "application/vnd.ms-fontobject",

        _ => "application/octet-stream",
    }
}
