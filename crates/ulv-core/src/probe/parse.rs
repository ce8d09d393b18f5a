//! Parse raw HTTP response header lines into status and header map.

use std::collections::HashMap;

pub(crate) struct ParsedHead {
    pub status_text: String,
    pub headers: HashMap<String, String>,
}

/// Parse collected header lines. A new status line (e.g. after a
/// `100 Continue`) starts a new block; the last block wins.
pub(crate) fn parse_head(lines: &[String]) -> ParsedHead {
    let mut status_text = String::new();
    let mut headers = HashMap::new();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix("HTTP/") {
            // Status line: "HTTP/1.1 403 Forbidden" or "HTTP/2 200".
            let mut parts = rest.splitn(3, ' ');
            let _version = parts.next();
            if parts.next().and_then(|c| c.parse::<u16>().ok()).is_some() {
                status_text = parts.next().unwrap_or("").trim().to_string();
                headers.clear();
            }
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    ParsedHead {
        status_text,
        headers,
    }
}
