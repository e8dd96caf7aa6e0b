//! Response header parsing utilities.
//!
//! The downloader relies on three headers: `Content-Length` for the expected
//! size, `Accept-Ranges` to learn whether a transfer may be continued, and
//! `Content-Range` to cross-check what a ranged response actually contains.

use reqwest::header::{HeaderMap, ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE};

/// Byte positions announced by a `Content-Range` response header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRange {
    /// First byte of the returned slice.
    pub start: u64,
    /// Last byte (inclusive) of the returned slice.
    pub end: u64,
    /// Size of the complete resource, when the server disclosed it.
    pub total: Option<u64>,
}

/// Extract the `Content-Length` header value.
///
/// Returns `None` if the header is missing or is not an u64. The header is
/// read directly rather than through the response body size hint, which is
/// always zero for `HEAD` responses.
///
/// # Example
///
/// ```rust
/// use reqwest::header::{HeaderMap, HeaderValue, CONTENT_LENGTH};
/// use steadyfetch::utils::parse_content_length;
///
/// let mut headers = HeaderMap::new();
/// headers.insert(CONTENT_LENGTH, HeaderValue::from_static("1000"));
/// assert_eq!(parse_content_length(&headers), Some(1000));
/// ```
pub fn parse_content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
}

/// Whether the server advertises `Accept-Ranges: bytes`.
pub fn accepts_byte_ranges(headers: &HeaderMap) -> bool {
    headers
        .get_all(ACCEPT_RANGES)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|unit| unit.trim().eq_ignore_ascii_case("bytes"))
}

/// Extract and parse the `Content-Range` header, if any.
pub fn extract_content_range(headers: &HeaderMap) -> Option<ContentRange> {
    headers
        .get(CONTENT_RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_content_range)
}

/// Parse a `Content-Range` header value.
///
/// Content-Range header format: "bytes start-end/total", where total may be `*`.
///
/// # Example
///
/// ```rust
/// use steadyfetch::utils::{parse_content_range, ContentRange};
///
/// let range = parse_content_range("bytes 400-999/1000");
/// assert_eq!(range, Some(ContentRange { start: 400, end: 999, total: Some(1000) }));
/// ```
pub fn parse_content_range(content_range: &str) -> Option<ContentRange> {
    let value = content_range.trim().strip_prefix("bytes")?.trim_start();
    let (span, total) = value.split_once('/')?;
    let (start, end) = span.split_once('-')?;
    let start = start.trim().parse::<u64>().ok()?;
    let end = end.trim().parse::<u64>().ok()?;
    if end < start {
        return None;
    }

    let total = match total.trim() {
        "*" => None,
        t => Some(t.parse::<u64>().ok()?),
    };

    Some(ContentRange { start, end, total })
}
