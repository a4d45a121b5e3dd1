//! Well-known storage keys.
//!
//! The layout mirrors what the backend-facing client persists:
//! session credentials plus a handful of app-level preferences.

/// Bearer token for the current session. Written only by the Session Manager.
pub const AUTH_TOKEN: &str = "auth_token";

/// Refresh token, when the backend issues one. Written only by the Session Manager.
pub const REFRESH_TOKEN: &str = "refresh_token";

/// Serialized user profile (JSON). Written only by the Session Manager.
pub const USER_DATA: &str = "user_data";

/// Serialized selected establishment (JSON).
pub const ESTABLISHMENT_DATA: &str = "establishment_data";

/// Display language ("es" / "en").
pub const LANGUAGE: &str = "language";

/// Theme preference ("light" / "dark").
pub const THEME: &str = "theme";

/// The session keys purged together on logout or corrupted rehydration.
pub const SESSION_KEYS: [&str; 3] = [AUTH_TOKEN, REFRESH_TOKEN, USER_DATA];
