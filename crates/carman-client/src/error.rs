//! # Client Error Types
//!
//! Error taxonomy for the coordination layer.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │   Transport     │  │ Response Shape  │  │   Business              │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Network        │  │  ServiceUnavail │  │  Rejected (non-2xx      │ │
//! │  │  Timeout        │  │  Malformed      │  │  with JSON error body)  │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │    Session      │  │  Configuration  │  │   Local                 │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  MissingRefresh │  │  InvalidConfig  │  │  Store (persisted kv)   │ │
//! │  │  Superseded     │  │                 │  │  Validation (input)     │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Transport failures are never retried automatically; every failure is
//! terminal for that call. A non-JSON body is classified as infrastructure
//! absence (`ServiceUnavailable`), distinct from a business rejection, so
//! callers can show "service unavailable" instead of a generic error.

use carman_store::StoreError;
use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Client error type covering all expected failure modes.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Connection-level failure (DNS, refused, reset, TLS).
    #[error("Network error: {0}")]
    Network(String),

    /// The fixed request timeout elapsed.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    // =========================================================================
    // Response-Shape Errors
    // =========================================================================
    /// The server answered with a non-JSON body (e.g. an HTML error page).
    /// Signals that the endpoint is not deployed, not a business rejection.
    #[error("Service unavailable: {endpoint} returned a non-JSON response (HTTP {status})")]
    ServiceUnavailable { endpoint: String, status: u16 },

    /// JSON arrived but did not match the expected shape.
    #[error("Malformed response from {endpoint}: {reason}")]
    Malformed { endpoint: String, reason: String },

    // =========================================================================
    // Business Rejections
    // =========================================================================
    /// Non-2xx status with a JSON error body; `message` is the
    /// server-provided text when available.
    #[error("{message} (HTTP {status})")]
    Rejected { status: u16, message: String },

    // =========================================================================
    // Session Errors
    // =========================================================================
    /// `refresh_auth_token` was called with no stored refresh token.
    #[error("No refresh token available")]
    MissingRefreshToken,

    /// A newer session operation started while this one was in flight;
    /// the stale result was discarded instead of clobbering newer state.
    #[error("Superseded by a newer session operation")]
    Superseded,

    // =========================================================================
    // Local Errors
    // =========================================================================
    /// Invalid client configuration (bad base URL, zero timeout).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Persisted store failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Input failed validation before any request was built.
    #[error("Validation error: {0}")]
    Validation(#[from] carman_core::ValidationError),
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// True for connection-level failures and timeouts — the only failures
    /// the Shift Coordinator treats as real errors on reads.
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Network(_) | ClientError::Timeout(_))
    }

    /// True when the endpoint itself appears to be missing (non-JSON body),
    /// so callers can show a distinct "service unavailable" message.
    pub fn is_service_unavailable(&self) -> bool {
        matches!(self, ClientError::ServiceUnavailable { .. })
    }

    /// True for a business rejection with the given status.
    pub fn is_rejection_with_status(&self, wanted: u16) -> bool {
        matches!(self, ClientError::Rejected { status, .. } if *status == wanted)
    }

    /// HTTP status of the response, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Rejected { status, .. }
            | ClientError::ServiceUnavailable { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorization() {
        assert!(ClientError::Network("refused".into()).is_transport());
        assert!(ClientError::Timeout(10).is_transport());
        assert!(!ClientError::Rejected {
            status: 401,
            message: "nope".into()
        }
        .is_transport());

        let unavailable = ClientError::ServiceUnavailable {
            endpoint: "/api/turnos".into(),
            status: 404,
        };
        assert!(unavailable.is_service_unavailable());
        assert_eq!(unavailable.status(), Some(404));

        let rejected = ClientError::Rejected {
            status: 400,
            message: "Turno ya cerrado".into(),
        };
        assert!(rejected.is_rejection_with_status(400));
        assert!(!rejected.is_rejection_with_status(404));
    }

    #[test]
    fn test_display_includes_server_message() {
        let err = ClientError::Rejected {
            status: 401,
            message: "Credenciales inválidas".into(),
        };
        assert_eq!(err.to_string(), "Credenciales inválidas (HTTP 401)");
    }
}
