//! HTTP cache control module
//!
//! Derives `ETag`, `Expires` and `Cache-Control` values for webjar resources.
//! Webjar keys carry their version in the path, so the entity tag is built
//! from the key alone and never from the content.

use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;

/// Segment of the resource key holding the library version.
///
/// `/META-INF/resources/webjars/<name>/<version>/...` splits into
/// `["", "META-INF", "resources", "webjars", <name>, <version>, ...]`.
pub const VERSION_SEGMENT: usize = 5;

/// One day, the lifetime applied when nothing else is configured
pub const DEFAULT_TTL: Duration = Duration::from_secs(86_400);

/// Key that does not follow the packaging layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedKey {
    pub segments: usize,
}

/// Uniform private caching with a fixed lifetime.
///
/// Milliseconds and seconds are both derived from one `Duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    ttl: Duration,
}

impl CachePolicy {
    pub const fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    pub const fn max_age_secs(&self) -> u64 {
        self.ttl.as_secs()
    }

    pub const fn ttl_millis(&self) -> u128 {
        self.ttl.as_millis()
    }

    /// `Cache-Control` header value
    pub fn to_header_value(self) -> String {
        format!("private, max-age={}", self.max_age_secs())
    }

    /// Absolute expiry for a response produced at `now`
    pub fn expires_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        TimeDelta::from_std(self.ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Compute the full directive for `key` at `now`
    pub fn directive(&self, key: &str, now: DateTime<Utc>) -> Result<CacheDirective, MalformedKey> {
        let (version, file_name) = version_and_file_name(key)?;
        Ok(CacheDirective {
            etag: format!("{file_name}_{version}"),
            expires: self.expires_at(now),
            cache_control: self.to_header_value(),
        })
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

/// Cache headers attached to one response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheDirective {
    pub etag: String,
    pub expires: DateTime<Utc>,
    pub cache_control: String,
}

impl CacheDirective {
    /// `Expires` value in IMF-fixdate form, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
    pub fn expires_header(&self) -> String {
        format_http_date(self.expires)
    }
}

pub fn format_http_date(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Extract `(version, file_name)` from a resource key.
///
/// Trailing empty segments are ignored, so `/a/b/c/d/e/1.0/` still yields a
/// version; it just names `1.0` as the file too.
pub fn version_and_file_name(key: &str) -> Result<(&str, &str), MalformedKey> {
    let mut tokens: Vec<&str> = key.split('/').collect();
    while tokens.last().is_some_and(|t| t.is_empty()) {
        tokens.pop();
    }
    match (tokens.get(VERSION_SEGMENT), tokens.last()) {
        (Some(version), Some(file_name)) => Ok((version, file_name)),
        _ => Err(MalformedKey {
            segments: tokens.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_jquery_directive() {
        let policy = CachePolicy::default();
        let d = policy
            .directive("/META-INF/resources/webjars/jquery/3.6.0/jquery.min.js", noon())
            .unwrap();
        assert_eq!(d.etag, "jquery.min.js_3.6.0");
        assert_eq!(d.cache_control, "private, max-age=86400");
        assert_eq!(d.expires_header(), "Sat, 02 Mar 2024 12:00:00 GMT");
    }

    #[test]
    fn test_nested_file_uses_last_segment() {
        let (version, file) =
            version_and_file_name("/META-INF/resources/webjars/bootstrap/5.3.0/css/bootstrap.css")
                .unwrap();
        assert_eq!(version, "5.3.0");
        assert_eq!(file, "bootstrap.css");
    }

    #[test]
    fn test_short_key_is_malformed() {
        assert_eq!(
            version_and_file_name("/META-INF/resources/webjars/x.js"),
            Err(MalformedKey { segments: 5 })
        );
        assert!(version_and_file_name("").is_err());
    }

    #[test]
    fn test_trailing_slash_ignored() {
        let (version, file) = version_and_file_name("/META-INF/resources/webjars/a/1.0/").unwrap();
        assert_eq!(version, "1.0");
        assert_eq!(file, "1.0");
    }

    #[test]
    fn test_ttl_units_agree() {
        let policy = CachePolicy::default();
        assert_eq!(policy.ttl_millis(), 86_400_000);
        assert_eq!(policy.max_age_secs(), 86_400);

        let short = CachePolicy::from_secs(90);
        assert_eq!(short.to_header_value(), "private, max-age=90");
        assert_eq!(short.expires_at(noon()), noon() + TimeDelta::seconds(90));
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let policy = CachePolicy::new(Duration::from_secs(u64::MAX));
        assert_eq!(policy.expires_at(noon()), DateTime::<Utc>::MAX_UTC);
    }
}
