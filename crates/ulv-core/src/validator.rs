//! Per-URL validation: cache lookup, HEAD probe, status classification,
//! GET escalation for ambiguous statuses, CDN resolution, cache write.

use std::time::Duration;

use crate::cache::ResultCache;
use crate::cdn;
use crate::control::CancelToken;
use crate::outcome::{is_live_status, ValidationOutcome};
use crate::probe::{self, ProbeError, ProbeMethod};

/// Range for the escalation GET: enough body for the CDN heuristics
/// without pulling a whole asset.
const ESCALATION_RANGE: (&str, &str) = ("Range", "bytes=0-1023");

/// Validates one URL. Consults the cache first; every resolved outcome is
/// written back through it. Cancelled validations return a valid outcome
/// and are never cached.
pub fn validate_url(
    url: &str,
    cache: &ResultCache,
    timeout: Duration,
    cancel: &CancelToken,
) -> ValidationOutcome {
    if cancel.is_cancelled() {
        return ValidationOutcome::cancelled(url);
    }
    if let Some(entry) = cache.get(url) {
        tracing::debug!("cache hit for {}", url);
        return entry.to_outcome(url);
    }

    let head = match probe::probe(url, ProbeMethod::Head, &[], timeout, cancel) {
        Ok(response) => response,
        Err(ProbeError::Cancelled) => return ValidationOutcome::cancelled(url),
        Err(failure) => return finish(cache, url, outcome_from_failure(url, failure)),
    };

    let outcome = match head.status_code {
        // HEAD blocked or method-rejected: a GET with a small Range tells
        // hotlink protection apart from a genuinely missing object.
        403 | 405 => match escalate_with_get(url, timeout, cancel) {
            Ok(outcome) => outcome,
            Err(ProbeError::Cancelled) => return ValidationOutcome::cancelled(url),
            Err(failure) => return finish(cache, url, outcome_from_failure(url, failure)),
        },
        // Everything else resolves directly: 2xx/3xx live, 404/410 and the
        // rest broken, with the status carried as-is.
        _ => ValidationOutcome::from_status(url, &head),
    };

    finish(cache, url, outcome)
}

/// Second probe for a 403/405 HEAD. The GET's own status wins when it is
/// unambiguous; only a GET 403 goes through the CDN resolver.
fn escalate_with_get(
    url: &str,
    timeout: Duration,
    cancel: &CancelToken,
) -> Result<ValidationOutcome, ProbeError> {
    let get = probe::probe(url, ProbeMethod::Get, &[ESCALATION_RANGE], timeout, cancel)?;

    if is_live_status(get.status_code) {
        // HEAD was blocked but the resource is there.
        return Ok(ValidationOutcome::from_status(url, &get));
    }
    if get.status_code == 403 {
        if cdn::looks_like_missing_resource(&get) {
            tracing::debug!("{}: 403 body matches CDN missing-object page", url);
            return Ok(ValidationOutcome::broken_cdn(url, &get));
        }
        return Ok(ValidationOutcome::protected(url, &get));
    }
    Ok(ValidationOutcome::from_status(url, &get))
}

/// Write-through on resolution. Cancelled outcomes never reach here.
fn finish(cache: &ResultCache, url: &str, outcome: ValidationOutcome) -> ValidationOutcome {
    cache.set(url, &outcome);
    outcome
}

/// Normalize a transport failure into an outcome. Cancellation is handled
/// by the callers; mapping it here too keeps this total.
fn outcome_from_failure(url: &str, failure: ProbeError) -> ValidationOutcome {
    let message = match failure {
        ProbeError::Cancelled => return ValidationOutcome::cancelled(url),
        ProbeError::Timeout => "Request timeout".to_string(),
        ProbeError::Dns => "Domain not found".to_string(),
        ProbeError::ConnectionRefused => "Connection refused".to_string(),
        ProbeError::Transport(message) if message.is_empty() => "Unknown error".to_string(),
        ProbeError::Transport(message) => message,
    };
    tracing::warn!("probe failed for {}: {}", url, message);
    ValidationOutcome::failed(url, message)
}
