//! # Error Types
//!
//! Domain-specific error types for carman-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  carman-core errors (this file)                                        │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  carman-store errors (separate crate)                                  │
//! │  └── StoreError       - Persisted key-value store failures             │
//! │                                                                         │
//! │  carman-client errors (separate crate)                                 │
//! │  └── ClientError      - Transport, response-shape, business rejection  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ClientError → caller              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (plate, establishment id, etc.)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
///
/// These errors represent domain rule violations. They should be caught and
/// translated to user-friendly messages by the caller.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A day-period tag that is not one of the five known values.
    #[error("Unknown shift period: '{0}'. Valid options: MAÑANA, MEDIODIA, TARDE, NOCHE, MADRUGADA")]
    UnknownShiftPeriod(String),

    /// A vehicle state tag that is not one of the six known values.
    #[error("Unknown vehicle state: '{0}'")]
    UnknownVehicleState(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before a request is ever built.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// Invalid format (e.g., malformed email, malformed plate).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat {
        field: &'static str,
        reason: &'static str,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::UnknownShiftPeriod("SIESTA".to_string());
        assert!(err.to_string().contains("SIESTA"));
        assert!(err.to_string().contains("MADRUGADA"));
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required { field: "email" };
        assert_eq!(err.to_string(), "email is required");

        let err = ValidationError::TooShort {
            field: "patente",
            min: 5,
        };
        assert_eq!(err.to_string(), "patente must be at least 5 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required { field: "password" };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
