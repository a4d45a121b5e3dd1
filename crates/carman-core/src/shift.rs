//! # Shift Types
//!
//! A shift (`turno`) is one open work period scoped to an establishment.
//! The backend enforces "at most one open shift per establishment"; the
//! client only ever observes two states: *no active shift* or *shift exists*.
//!
//! Closing a shift has no client-visible "closed" record — the resource
//! simply disappears, observed as a transition back to "no active shift".

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

// =============================================================================
// Shift Period
// =============================================================================

/// The five-value period-of-day tag the backend accepts for a shift.
///
/// Serialized exactly as the backend spells them (Spanish, upper case,
/// including the Ñ in `MAÑANA`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShiftPeriod {
    #[serde(rename = "MAÑANA")]
    Manana,
    #[serde(rename = "MEDIODIA")]
    Mediodia,
    #[serde(rename = "TARDE")]
    Tarde,
    #[serde(rename = "NOCHE")]
    Noche,
    #[serde(rename = "MADRUGADA")]
    Madrugada,
}

impl ShiftPeriod {
    /// All periods in chronological order, for pickers and help text.
    pub const ALL: [ShiftPeriod; 5] = [
        ShiftPeriod::Manana,
        ShiftPeriod::Mediodia,
        ShiftPeriod::Tarde,
        ShiftPeriod::Noche,
        ShiftPeriod::Madrugada,
    ];

    /// The exact tag the backend expects on the wire.
    pub const fn wire_tag(&self) -> &'static str {
        match self {
            ShiftPeriod::Manana => "MAÑANA",
            ShiftPeriod::Mediodia => "MEDIODIA",
            ShiftPeriod::Tarde => "TARDE",
            ShiftPeriod::Noche => "NOCHE",
            ShiftPeriod::Madrugada => "MADRUGADA",
        }
    }

    /// Human-readable label for display.
    pub const fn label(&self) -> &'static str {
        match self {
            ShiftPeriod::Manana => "Mañana",
            ShiftPeriod::Mediodia => "Mediodía",
            ShiftPeriod::Tarde => "Tarde",
            ShiftPeriod::Noche => "Noche",
            ShiftPeriod::Madrugada => "Madrugada",
        }
    }
}

impl fmt::Display for ShiftPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_tag())
    }
}

impl FromStr for ShiftPeriod {
    type Err = CoreError;

    /// Accepts the wire spelling case-insensitively, with or without the
    /// tilde ("MAÑANA" and "manana" both parse).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MAÑANA" | "MANANA" => Ok(ShiftPeriod::Manana),
            "MEDIODIA" | "MEDIODÍA" => Ok(ShiftPeriod::Mediodia),
            "TARDE" => Ok(ShiftPeriod::Tarde),
            "NOCHE" => Ok(ShiftPeriod::Noche),
            "MADRUGADA" => Ok(ShiftPeriod::Madrugada),
            other => Err(CoreError::UnknownShiftPeriod(other.to_string())),
        }
    }
}

// =============================================================================
// Shift Records
// =============================================================================

/// Identity reference embedded in a shift record (who opened it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftAuthor {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// An open shift as returned by `GET /api/turnos/establecimiento/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    #[serde(rename = "_id")]
    pub id: String,

    /// Period-of-day tag.
    pub turno: ShiftPeriod,

    /// Establishment this shift is scoped to.
    pub establecimiento: String,

    /// Human-readable label: date + establishment + period.
    pub nombre: String,

    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(rename = "createdBy", default)]
    pub created_by: Option<ShiftAuthor>,
}

/// Body of `POST /api/turnos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewShiftRequest {
    pub establecimiento: String,
    pub turno: ShiftPeriod,
    pub nombre: String,
}

impl NewShiftRequest {
    /// Builds an open-shift request with the conventional name for `date`.
    pub fn for_date(date: NaiveDate, establishment_id: &str, period: ShiftPeriod) -> Self {
        NewShiftRequest {
            establecimiento: establishment_id.to_string(),
            turno: period,
            nombre: compose_shift_name(date, establishment_id, period),
        }
    }
}

// =============================================================================
// Shift Name Composition
// =============================================================================

/// Composes the human-readable shift name: `dd/mm/yyyy - <establishment> - <PERIOD>`.
///
/// The date is rendered day-first, matching what the backoffice displays.
pub fn compose_shift_name(date: NaiveDate, establishment: &str, period: ShiftPeriod) -> String {
    format!("{} - {} - {}", date.format("%d/%m/%Y"), establishment, period)
}

// =============================================================================
// Unit Tests
// =============================================================================
