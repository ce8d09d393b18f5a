//! HTTP liveness probes.
//!
//! Drives one curl `Easy` transfer per redirect hop and follows redirects
//! manually: curl's automatic following would error out past the hop
//! budget, while the contract here is to surface the last redirect
//! response as-is. A single deadline spans the whole chain; cancellation
//! aborts an in-flight transfer through the progress callback.

mod classify;
mod parse;

pub use classify::ProbeError;

use std::collections::HashMap;
use std::str;
use std::time::{Duration, Instant};

use url::Url;

use crate::control::CancelToken;
use classify::classify_curl_error;

/// Redirect hops followed within one probe before the last response is
/// returned as-is.
const MAX_REDIRECTS: u32 = 5;

/// Body bytes kept from a GET probe; the rest of the stream is discarded
/// without failing the transfer.
const MAX_BODY_BYTES: usize = 10 * 1024;

/// Browser-like request headers. Hotlink-protecting CDNs answer generic
/// clients differently, and the `cdn` heuristics depend on seeing the
/// response a browser would get.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
const ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// Probe method: HEAD resolves on headers alone; GET reads a capped body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMethod {
    Head,
    Get,
}

/// Normalized response of one probe, after redirect resolution.
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    pub status_code: u16,
    /// HTTP reason phrase; empty when the server sends none.
    pub status_text: String,
    /// Response headers with lowercased names; later duplicates win.
    pub headers: HashMap<String, String>,
    /// At most `MAX_BODY_BYTES` of the body, lossily decoded. Empty for HEAD.
    pub body: String,
}

impl ProbeResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn content_type(&self) -> &str {
        self.header("content-type").unwrap_or("")
    }
}

/// Performs one probe: issues `method` requests, following up to
/// `MAX_REDIRECTS` redirects under a single `timeout` budget, and honoring
/// `cancel` before and during every hop.
pub fn probe(
    url: &str,
    method: ProbeMethod,
    extra_headers: &[(&str, &str)],
    timeout: Duration,
    cancel: &CancelToken,
) -> Result<ProbeResponse, ProbeError> {
    let deadline = Instant::now() + timeout;
    let mut current = url.to_string();
    let mut redirects = 0u32;

    loop {
        if cancel.is_cancelled() {
            return Err(ProbeError::Cancelled);
        }
        let remaining = match deadline.checked_duration_since(Instant::now()) {
            Some(d) if !d.is_zero() => d,
            _ => return Err(ProbeError::Timeout),
        };

        let response = perform(&current, method, extra_headers, remaining, cancel)?;

        if !(300..400).contains(&response.status_code) || redirects >= MAX_REDIRECTS {
            return Ok(response);
        }
        let next = response
            .header("location")
            .and_then(|location| resolve_location(&current, location));
        match next {
            Some(next) => {
                tracing::debug!("{} redirected to {}", current, next);
                current = next;
                redirects += 1;
            }
            // No usable Location: report the redirect response itself.
            None => return Ok(response),
        }
    }
}

/// One request/response exchange with no redirect following.
fn perform(
    url: &str,
    method: ProbeMethod,
    extra_headers: &[(&str, &str)],
    timeout: Duration,
    cancel: &CancelToken,
) -> Result<ProbeResponse, ProbeError> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    match method {
        ProbeMethod::Head => easy.nobody(true)?,
        ProbeMethod::Get => easy.get(true)?,
    }
    easy.timeout(timeout)?;
    easy.connect_timeout(timeout)?;
    easy.useragent(USER_AGENT)?;
    easy.progress(true)?;

    let mut list = curl::easy::List::new();
    list.append(&format!("Accept: {}", ACCEPT))?;
    if let Some(origin) = origin_of(url) {
        list.append(&format!("Referer: {}", origin))?;
    }
    for (name, value) in extra_headers {
        list.append(&format!("{}: {}", name, value))?;
    }
    easy.http_headers(list)?;

    let mut header_lines: Vec<String> = Vec::new();
    let mut body: Vec<u8> = Vec::new();
    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                header_lines.push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.write_function(|data| {
            let room = MAX_BODY_BYTES.saturating_sub(body.len());
            if room > 0 {
                body.extend_from_slice(&data[..data.len().min(room)]);
            }
            Ok(data.len())
        })?;
        transfer.progress_function(|_, _, _, _| !cancel.is_cancelled())?;
        transfer
            .perform()
            .map_err(|e| classify_curl_error(e, cancel.is_cancelled()))?;
    }

    let status_code = easy.response_code()? as u16;
    let head = parse::parse_head(&header_lines);
    Ok(ProbeResponse {
        status_code,
        status_text: head.status_text,
        headers: head.headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

/// Resolve a Location header against the URL that sent it.
fn resolve_location(base: &str, location: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    base.join(location).ok().map(|u| u.to_string())
}

/// Origin (`scheme://host[:port]/`) of a URL, sent as Referer.
fn origin_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    Some(format!("{}/", parsed.origin().ascii_serialization()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_of_http_urls() {
        assert_eq!(
            origin_of("https://cdn.example.com/images/a.png").as_deref(),
            Some("https://cdn.example.com/")
        );
        assert_eq!(
            origin_of("http://127.0.0.1:8080/x?y=1").as_deref(),
            Some("http://127.0.0.1:8080/")
        );
        assert!(origin_of("file:///etc/passwd").is_none());
        assert!(origin_of("not a url").is_none());
    }

    #[test]
    fn resolve_location_relative_and_absolute() {
        assert_eq!(
            resolve_location("https://a.test/dir/page", "/img/a.png").as_deref(),
            Some("https://a.test/img/a.png")
        );
        assert_eq!(
            resolve_location("https://a.test/dir/page", "other").as_deref(),
            Some("https://a.test/dir/other")
        );
        assert_eq!(
            resolve_location("https://a.test/x", "https://b.test/y").as_deref(),
            Some("https://b.test/y")
        );
        assert!(resolve_location("not a url", "/x").is_none());
    }

    #[test]
    fn response_header_lookup_is_case_insensitive() {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "text/html".to_string());
        let response = ProbeResponse {
            status_code: 200,
            status_text: "OK".to_string(),
            headers,
            body: String::new(),
        };
        assert_eq!(response.header("Content-Type"), Some("text/html"));
        assert_eq!(response.content_type(), "text/html");
        assert!(response.header("location").is_none());
    }
}
