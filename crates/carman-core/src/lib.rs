//! # carman-core: Pure Domain Logic for the Carman Valet Client
//!
//! This crate is the **heart** of the Carman client. It contains the domain
//! types and pure functions shared by every other crate, with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Carman Client Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     apps/carman-cli                             │   │
//! │  │            login ──► status ──► shift open/close                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    carman-client                                │   │
//! │  │    ApiClient, SessionManager, ShiftCoordinator, services        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ carman-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │   │
//! │  │   │   user    │  │   shift   │  │  vehicle  │  │ validation│   │   │
//! │  │   │   User    │  │  Shift    │  │  Vehicle  │  │   rules   │   │   │
//! │  │   │  Profile  │  │  Period   │  │  grouping │  │   checks  │   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO STORAGE • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`user`] - User identity and establishment reference types
//! - [`shift`] - Shift records, day periods, shift-name composition
//! - [`vehicle`] - Vehicle entries, state machine tags, grouping and stats
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Network, file system and storage access is FORBIDDEN here
//! 3. **Wire Fidelity**: Serde renames preserve the Spanish field names the
//!    Carman backend speaks (`patente`, `establecimiento`, `turno`, ...)
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod shift;
pub mod user;
pub mod validation;
pub mod vehicle;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use carman_core::Shift` instead of
// `use carman_core::shift::Shift`

pub use error::{CoreError, CoreResult, ValidationError};
pub use shift::{NewShiftRequest, Shift, ShiftPeriod};
pub use user::{Establishment, Sector, User};
pub use vehicle::{
    Brand, UrgencyLayer, Vehicle, VehicleLayers, VehicleMatch, VehicleState, VehicleStats,
};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Languages the client can present.
pub const SUPPORTED_LANGUAGES: [&str; 2] = ["es", "en"];

/// Default display language for server-facing labels (the backend speaks
/// Spanish; shift names and state tags are composed in Spanish).
pub const DEFAULT_LANGUAGE: &str = "es";
