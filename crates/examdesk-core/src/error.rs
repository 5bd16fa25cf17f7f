//! Unit service error types.
//!
//! Defined in `examdesk-core` so callers holding a `dyn UnitService` can
//! classify failures without knowing which transport produced them.

use thiserror::Error;

/// Errors that can occur when talking to the remote unit service.
///
/// Errors are surfaced to the caller exactly as they occurred; nothing in
/// this workspace retries or substitutes fallback data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The connection could not be made or broke mid-request.
    #[error("transport error: {0}")]
    Transport(String),

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The request was cancelled through its abort signal.
    #[error("request aborted")]
    Aborted,

    /// The server answered with a non-success status.
    #[error("server error (HTTP {status}): {message}")]
    Status { status: u16, message: String },

    /// The body was not a well-formed response envelope.
    #[error("malformed response: {0}")]
    Envelope(String),
}

impl ApiError {
    /// Returns `true` for network-level failures (including timeouts and aborts).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ApiError::Transport(_) | ApiError::Timeout(_) | ApiError::Aborted
        )
    }

    /// HTTP status code, if the server responded at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_transport_errors() {
        assert!(ApiError::Transport("refused".into()).is_transport());
        assert!(ApiError::Timeout(30).is_transport());
        assert!(ApiError::Aborted.is_transport());
        assert!(!ApiError::Envelope("bad".into()).is_transport());
        assert!(!ApiError::Status {
            status: 500,
            message: String::new()
        }
        .is_transport());
    }

    #[test]
    fn status_code_only_for_server_errors() {
        let err = ApiError::Status {
            status: 404,
            message: "unit not found".into(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "server error (HTTP 404): unit not found");
        assert_eq!(ApiError::Aborted.status(), None);
    }
}
