//! # User and Establishment Types
//!
//! Identity and reference records as the Carman backend returns them.
//! These are read-mostly display entities; the client never mutates them.

use serde::{Deserialize, Serialize};

// =============================================================================
// User
// =============================================================================

/// The authenticated user's profile, from `GET /api/auth/user`.
///
/// Every field except `id` is optional in practice: the backend has evolved
/// and older accounts miss fields. Deserialization must never fail on an
/// otherwise valid profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub nombre: Option<String>,

    #[serde(default)]
    pub apellido: Option<String>,

    /// Role tag (e.g. "admin", "valet").
    #[serde(default)]
    pub rol: Option<String>,

    /// Establishments this user may operate.
    #[serde(default)]
    pub establecimientos: Vec<String>,

    #[serde(default)]
    pub active: Option<bool>,

    #[serde(default)]
    pub created_at: Option<String>,
}

impl User {
    /// Display name: "nombre apellido", falling back to the email, then id.
    pub fn display_name(&self) -> String {
        match (&self.nombre, &self.apellido) {
            (Some(n), Some(a)) => format!("{} {}", n, a),
            (Some(n), None) => n.clone(),
            _ => self
                .email
                .clone()
                .unwrap_or_else(|| self.id.clone()),
        }
    }

    /// Whether this user may operate the given establishment.
    pub fn can_operate(&self, establishment_id: &str) -> bool {
        self.establecimientos.iter().any(|e| e == establishment_id)
    }
}

// =============================================================================
// Establishment
// =============================================================================

/// A parking sector inside an establishment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    #[serde(rename = "_id")]
    pub id: String,
    pub nombre: String,
    #[serde(default)]
    pub capacidad: Option<String>,
}

/// An establishment, from `GET /api/masters/establecimientos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Establishment {
    #[serde(rename = "_id")]
    pub id: String,

    pub nombre: String,

    #[serde(default)]
    pub direccion: Option<String>,

    #[serde(default)]
    pub servicio: Option<String>,

    /// Number of valets assigned.
    #[serde(default)]
    pub valets: Option<u32>,

    #[serde(default)]
    pub sectores: Vec<Sector>,

    #[serde(default)]
    pub gerente: Option<String>,

    #[serde(default)]
    pub active: Option<bool>,

    #[serde(default)]
    pub ord: Option<i64>,
}

// =============================================================================
// Unit Tests
// =============================================================================
