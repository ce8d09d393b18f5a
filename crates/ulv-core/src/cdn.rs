//! CDN error-page detection for ambiguous 403 responses.
//!
//! Some CDNs answer a request for a missing object with 403 and a small
//! XML/HTML error page instead of a 404 (S3-style AccessDenied/NoSuchKey).
//! Only a matching content type AND a known marker in the body count as
//! missing; anything ambiguous stays "not definitively missing", so a
//! live, hotlink-protected asset is never reported broken.

use crate::probe::ProbeResponse;

/// Body substrings (matched against the lowercased body) that identify a
/// synthesized error page.
const MISSING_MARKERS: &[&str] = &[
    "accessdenied",
    "nosuchkey",
    "not found",
    "does not exist",
    "<error>",
    "the specified key does not exist",
];

/// True when the response looks like a CDN's "missing object" page.
pub fn looks_like_missing_resource(response: &ProbeResponse) -> bool {
    let content_type = response.content_type().to_ascii_lowercase();
    if !content_type.contains("xml") && !content_type.contains("text/html") {
        return false;
    }
    let body = response.body.to_ascii_lowercase();
    MISSING_MARKERS.iter().any(|marker| body.contains(marker))
}
