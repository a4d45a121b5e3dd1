//! # Input Validation
//!
//! Early validation of user input, run before any request is built.
//! Rules live here so the client library and any future surface agree
//! on what a well-formed input is.

use crate::error::ValidationError;
use crate::vehicle::VehicleEntryForm;

/// Longest plate the backend accepts (old format `ABC123`, new `AB123CD`,
/// plus motorcycle plates).
const MAX_PLATE_LEN: usize = 10;

/// Validates login credentials before issuing the login request.
pub fn validate_credentials(email: &str, password: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::Required { field: "email" });
    }
    if !email.contains('@') {
        return Err(ValidationError::InvalidFormat {
            field: "email",
            reason: "missing '@'",
        });
    }
    if password.is_empty() {
        return Err(ValidationError::Required { field: "password" });
    }
    Ok(())
}

/// Normalizes a license plate: trimmed, upper case, no inner spaces.
pub fn normalize_plate(plate: &str) -> String {
    plate
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Validates a (normalized) license plate.
pub fn validate_plate(plate: &str) -> Result<(), ValidationError> {
    if plate.is_empty() {
        return Err(ValidationError::Required { field: "patente" });
    }
    if plate.len() < 5 {
        return Err(ValidationError::TooShort {
            field: "patente",
            min: 5,
        });
    }
    if plate.len() > MAX_PLATE_LEN {
        return Err(ValidationError::TooLong {
            field: "patente",
            max: MAX_PLATE_LEN,
        });
    }
    if !plate.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidFormat {
            field: "patente",
            reason: "only letters and digits allowed",
        });
    }
    Ok(())
}

/// Validates a vehicle check-in form.
pub fn validate_entry_form(form: &VehicleEntryForm) -> Result<(), ValidationError> {
    validate_plate(&form.patente)?;
    if form.sector.trim().is_empty() {
        return Err(ValidationError::Required { field: "sector" });
    }
    if form.establecimiento.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "establecimiento",
        });
    }
    Ok(())
}
