//! Validation outcomes: the one result shape every URL resolves to.

use serde::{Deserialize, Serialize};

use crate::probe::ProbeResponse;

/// Statuses that mean "resource exists" (2xx plus unresolved 3xx).
pub fn is_live_status(status: u16) -> bool {
    (200..400).contains(&status)
}

/// Final result of validating one URL.
///
/// Either a definitive status classification (`status_code`/`status_text`
/// filled in) or a transport-level failure (`error` filled in). Some valid
/// outcomes carry an `error` purely for diagnostics ("Protected",
/// "Request cancelled"); those must never be surfaced as warnings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub url: String,
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationOutcome {
    /// Classify directly from a response status: valid iff `[200, 400)`.
    pub fn from_status(url: &str, response: &ProbeResponse) -> Self {
        Self {
            url: url.to_string(),
            is_valid: is_live_status(response.status_code),
            status_code: Some(response.status_code),
            status_text: status_text_of(response),
            error: None,
        }
    }

    /// A 403 whose body matched a CDN "missing object" error page.
    pub fn broken_cdn(url: &str, response: &ProbeResponse) -> Self {
        Self {
            url: url.to_string(),
            is_valid: false,
            status_code: Some(response.status_code),
            status_text: status_text_of(response),
            error: Some("Not Found (CDN)".to_string()),
        }
    }

    /// A 403 without CDN markers: assumed hotlink-protected but live.
    pub fn protected(url: &str, response: &ProbeResponse) -> Self {
        Self {
            url: url.to_string(),
            is_valid: true,
            status_code: Some(response.status_code),
            status_text: status_text_of(response),
            error: Some("Protected".to_string()),
        }
    }

    /// The batch was cancelled before this URL resolved. Reported valid so
    /// a cancelled check never shows up as a broken link.
    pub fn cancelled(url: &str) -> Self {
        Self {
            url: url.to_string(),
            is_valid: true,
            status_code: None,
            status_text: None,
            error: Some("Request cancelled".to_string()),
        }
    }

    /// Transport-level failure (timeout, DNS, refused connection, ...).
    pub fn failed(url: &str, message: String) -> Self {
        Self {
            url: url.to_string(),
            is_valid: false,
            status_code: None,
            status_text: None,
            error: Some(message),
        }
    }
}

fn status_text_of(response: &ProbeResponse) -> Option<String> {
    if response.status_text.is_empty() {
        None
    } else {
        Some(response.status_text.clone())
    }
}
