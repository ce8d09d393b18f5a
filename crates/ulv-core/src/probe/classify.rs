//! Classify curl transport errors into the probe failure taxonomy.

use thiserror::Error;

/// Failure of a single probe, normalized for outcome reporting.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The batch owning this probe was cancelled.
    #[error("request cancelled")]
    Cancelled,
    /// The probe deadline elapsed during connect or response.
    #[error("request timeout")]
    Timeout,
    /// Hostname did not resolve.
    #[error("domain not found")]
    Dns,
    /// TCP connection could not be established.
    #[error("connection refused")]
    ConnectionRefused,
    /// Any other transport failure, carrying curl's message.
    #[error("{0}")]
    Transport(String),
}

/// Map a curl error to a probe failure. `cancelled` is the batch token
/// state at failure time; cancellation wins over whatever curl reports, so
/// an aborted transfer never masquerades as a network problem.
pub(crate) fn classify_curl_error(e: curl::Error, cancelled: bool) -> ProbeError {
    if cancelled {
        return ProbeError::Cancelled;
    }
    if e.is_operation_timedout() {
        return ProbeError::Timeout;
    }
    if e.is_couldnt_resolve_host() || e.is_couldnt_resolve_proxy() {
        return ProbeError::Dns;
    }
    if e.is_couldnt_connect() {
        return ProbeError::ConnectionRefused;
    }
    ProbeError::Transport(e.to_string())
}

/// Setup-phase curl failures (invalid URL etc.) classify with no
/// cancellation in play.
impl From<curl::Error> for ProbeError {
    fn from(e: curl::Error) -> Self {
        classify_curl_error(e, false)
    }
}
