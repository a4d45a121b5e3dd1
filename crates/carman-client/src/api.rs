//! # HTTP Client
//!
//! Thin REST client for the Carman API: attaches the bearer token, parses
//! JSON, and normalizes every response into the typed [`ClientError`]
//! taxonomy so no caller ever deals with raw status codes or exceptions.
//!
//! ## Response Normalization
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Response Normalization                              │
//! │                                                                         │
//! │  connection failure / timeout ───────────► Err(Network / Timeout)       │
//! │                                                                         │
//! │  non-JSON body (HTML error page) ────────► Err(ServiceUnavailable)      │
//! │    The backend never serves HTML; a non-JSON body means the endpoint    │
//! │    is not deployed at all (infrastructure absence).                     │
//! │                                                                         │
//! │  non-2xx with JSON body ─────────────────► Err(Rejected { status,       │
//! │                                                 message from body })    │
//! │                                                                         │
//! │  2xx with JSON body ─────────────────────► Ok(payload)                  │
//! │    Some endpoints wrap the payload in a `data` envelope, some don't;    │
//! │    `unwrap_envelope` makes both look the same to typed callers.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Token Handling
//! The bearer token is read from the persisted store on every request.
//! This client never writes the token — the Session Manager is the single
//! writer for session keys.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use carman_core::{Brand, Establishment, Shift, User, Vehicle, VehicleMatch};
use carman_store::{keys, KeyValueStore};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

// =============================================================================
// Endpoints
// =============================================================================

pub mod endpoints {
    //! Path constants for every endpoint the client consumes.

    pub const LOGIN: &str = "/api/auth/login";
    pub const LOGOUT: &str = "/api/auth/logout";
    pub const REFRESH: &str = "/api/auth/refresh";
    pub const USER_PROFILE: &str = "/api/auth/user";

    pub const ESTABLISHMENTS: &str = "/api/masters/establecimientos";
    pub const BRANDS: &str = "/api/masters/marcas";

    pub const SHIFTS: &str = "/api/turnos";
    pub const SHIFTS_BY_ESTABLISHMENT: &str = "/api/turnos/establecimiento";
    pub const END_SHIFT: &str = "/api/turnos/finalizar";

    pub const VEHICLE_ENTRIES: &str = "/api/vehiculos/ingresos";
    pub const VEHICLE_ENTRY_STATE: &str = "/api/vehiculos/ingresos/estado";
    pub const SEARCH_PLATE: &str = "/api/vehiculos/buscar";

    pub const NOTIFICATIONS: &str = "/api/notificaciones";
    pub const UNREAD_NOTIFICATIONS: &str = "/api/notificaciones/unread";
}

// =============================================================================
// Wire Shapes
// =============================================================================

/// Payload of a successful `POST /api/auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    /// Opaque bearer credential; its presence alone makes the login valid.
    pub token: String,

    /// Refresh token; the backend may not issue one.
    #[serde(rename = "refreshToken", default)]
    pub refresh_token: Option<String>,
}

/// Payload of a successful `POST /api/auth/refresh`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    pub token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct ProfileEnvelope {
    user: User,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    #[serde(rename = "refreshToken")]
    refresh_token: &'a str,
}

// =============================================================================
// Api Client
// =============================================================================

/// Authenticated REST client for the Carman API.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
    store: Arc<dyn KeyValueStore>,
}

impl ApiClient {
    /// Builds a client with the fixed timeout from `config`.
    pub fn new(config: &ClientConfig, store: Arc<dyn KeyValueStore>) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| ClientError::InvalidConfig(err.to_string()))?;
        Ok(ApiClient {
            http,
            base_url: config.base_url.clone(),
            timeout_secs: config.timeout_secs,
            store,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =========================================================================
    // Request Plumbing
    // =========================================================================

    /// Reads the bearer token from the persisted store. A store failure is
    /// logged and degrades to an unauthenticated request rather than
    /// failing the call.
    async fn bearer(&self) -> Option<String> {
        match self.store.get(keys::AUTH_TOKEN).await {
            Ok(token) => token,
            Err(err) => {
                warn!(%err, "Could not read auth token from store");
                None
            }
        }
    }

    async fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = self.bearer().await {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(AUTHORIZATION, value);
            }
        }
        headers
    }

    fn map_transport(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout(self.timeout_secs)
        } else {
            ClientError::Network(err.to_string())
        }
    }

    /// Issues one request and normalizes the response.
    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ClientResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "API request");

        let mut request = self.http.request(method, &url).headers(self.headers().await);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|err| self.map_transport(err))?;
        let status = response.status();

        if !is_json_response(response.headers()) {
            // The API always speaks JSON; anything else is an HTML error page
            // from infrastructure in front of a missing endpoint.
            if status != StatusCode::NOT_FOUND {
                warn!(%url, status = status.as_u16(), "Non-JSON response");
            }
            return Err(ClientError::ServiceUnavailable {
                endpoint: path.to_string(),
                status: status.as_u16(),
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|err| ClientError::Malformed {
                endpoint: path.to_string(),
                reason: err.to_string(),
            })?;

        if !status.is_success() {
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                message: extract_error_message(status.as_u16(), &payload),
            });
        }

        debug!(%url, status = status.as_u16(), "API response");
        Ok(unwrap_envelope(payload))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let value = self.execute(Method::GET, path, None::<&()>).await?;
        decode(path, value)
    }

    async fn post<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let value = self.execute(Method::POST, path, Some(body)).await?;
        decode(path, value)
    }

    // =========================================================================
    // Auth Endpoints
    // =========================================================================

    /// `POST /api/auth/login` — credentials for a bearer token.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<LoginData> {
        self.post(endpoints::LOGIN, &LoginRequest { email, password })
            .await
    }

    /// `POST /api/auth/logout` — best-effort server-side invalidation.
    pub async fn logout(&self) -> ClientResult<()> {
        self.execute(Method::POST, endpoints::LOGOUT, None::<&()>)
            .await?;
        Ok(())
    }

    /// `POST /api/auth/refresh` — refresh token for a new token pair.
    pub async fn refresh(&self, refresh_token: &str) -> ClientResult<TokenPair> {
        self.post(endpoints::REFRESH, &RefreshRequest { refresh_token })
            .await
    }

    /// `GET /api/auth/user` — profile for the current token.
    pub async fn user_profile(&self) -> ClientResult<User> {
        let envelope: ProfileEnvelope = self.get(endpoints::USER_PROFILE).await?;
        Ok(envelope.user)
    }

    // =========================================================================
    // Masters Endpoints
    // =========================================================================

    /// `GET /api/masters/establecimientos`.
    pub async fn establishments(&self) -> ClientResult<Vec<Establishment>> {
        self.get(endpoints::ESTABLISHMENTS).await
    }

    /// `GET /api/masters/marcas`.
    pub async fn brands(&self) -> ClientResult<Vec<Brand>> {
        self.get(endpoints::BRANDS).await
    }

    // =========================================================================
    // Shift Endpoints
    // =========================================================================

    /// `GET /api/turnos/establecimiento/{id}` — raw read; a 2xx with a null
    /// body means no active shift. Business normalization (404 → `None`)
    /// lives in the Shift Coordinator.
    pub async fn active_shift(&self, establishment_id: &str) -> ClientResult<Option<Shift>> {
        let path = format!("{}/{}", endpoints::SHIFTS_BY_ESTABLISHMENT, establishment_id);
        let value = self.execute(Method::GET, &path, None::<&()>).await?;
        if value.is_null() {
            return Ok(None);
        }
        decode(&path, value).map(Some)
    }

    /// `POST /api/turnos` — open a shift.
    pub async fn open_shift(&self, request: &carman_core::NewShiftRequest) -> ClientResult<Shift> {
        self.post(endpoints::SHIFTS, request).await
    }

    /// `POST /api/turnos/finalizar/{id}` — close the establishment's shift.
    pub async fn close_shift(&self, establishment_id: &str) -> ClientResult<Shift> {
        let path = format!("{}/{}", endpoints::END_SHIFT, establishment_id);
        let value = self.execute(Method::POST, &path, None::<&()>).await?;
        decode(&path, value)
    }

    // =========================================================================
    // Vehicle Endpoints
    // =========================================================================

    /// `GET /api/vehiculos/ingresos?establecimiento={id}`.
    pub async fn vehicle_entries(&self, establishment_id: &str) -> ClientResult<Vec<Vehicle>> {
        let path = format!(
            "{}?establecimiento={}",
            endpoints::VEHICLE_ENTRIES,
            establishment_id
        );
        self.get(&path).await
    }

    /// `GET /api/vehiculos/ingresos/{id}`.
    pub async fn vehicle_entry(&self, entry_id: &str) -> ClientResult<Vehicle> {
        let path = format!("{}/{}", endpoints::VEHICLE_ENTRIES, entry_id);
        self.get(&path).await
    }

    /// `POST /api/vehiculos/ingresos` — check a vehicle in.
    pub async fn create_vehicle_entry(
        &self,
        form: &carman_core::vehicle::VehicleEntryForm,
    ) -> ClientResult<Vehicle> {
        self.post(endpoints::VEHICLE_ENTRIES, form).await
    }

    /// `PUT /api/vehiculos/ingresos/{id}` — correct plate/sector.
    pub async fn update_vehicle_entry(
        &self,
        entry_id: &str,
        patente: &str,
        sector: &str,
    ) -> ClientResult<()> {
        let path = format!("{}/{}", endpoints::VEHICLE_ENTRIES, entry_id);
        let body = serde_json::json!({ "patente": patente, "sector": sector });
        self.execute(Method::PUT, &path, Some(&body)).await?;
        Ok(())
    }

    /// `POST /api/vehiculos/ingresos/estado` — state transition.
    pub async fn update_vehicle_state(
        &self,
        update: &carman_core::vehicle::VehicleStateUpdate,
    ) -> ClientResult<()> {
        self.execute(Method::POST, endpoints::VEHICLE_ENTRY_STATE, Some(update))
            .await?;
        Ok(())
    }

    /// `GET /api/vehiculos/buscar/{plate}?establecimiento={id}`.
    pub async fn search_plate(
        &self,
        plate: &str,
        establishment_id: &str,
    ) -> ClientResult<VehicleMatch> {
        let path = format!(
            "{}/{}?establecimiento={}",
            endpoints::SEARCH_PLATE,
            plate,
            establishment_id
        );
        self.get(&path).await
    }

    // =========================================================================
    // Notification Endpoints
    // =========================================================================

    /// `GET /api/notificaciones`.
    pub async fn notifications(&self) -> ClientResult<Value> {
        self.execute(Method::GET, endpoints::NOTIFICATIONS, None::<&()>)
            .await
    }

    /// `GET /api/notificaciones/unread`.
    pub async fn unread_notifications(&self) -> ClientResult<Value> {
        self.execute(Method::GET, endpoints::UNREAD_NOTIFICATIONS, None::<&()>)
            .await
    }

    /// `PUT /api/notificaciones/{id}/read`.
    pub async fn mark_notification_read(&self, notification_id: &str) -> ClientResult<()> {
        let path = format!("{}/{}/read", endpoints::NOTIFICATIONS, notification_id);
        self.execute(Method::PUT, &path, None::<&()>).await?;
        Ok(())
    }
}

// =============================================================================
// Normalization Helpers
// =============================================================================

fn is_json_response(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.contains("application/json"))
        .unwrap_or(false)
}

/// Some endpoints wrap the payload as `{ "data": ..., "message": ... }`,
/// others return it bare. A non-null `data` field wins; otherwise the body
/// itself is the payload.
fn unwrap_envelope(payload: Value) -> Value {
    match payload {
        Value::Object(mut map) => match map.remove("data") {
            Some(data) if !data.is_null() => data,
            other => {
                if let Some(data) = other {
                    map.insert("data".to_string(), data);
                }
                Value::Object(map)
            }
        },
        other => other,
    }
}

/// Server-provided message when available, else a generic `HTTP {status}`.
fn extract_error_message(status: u16, payload: &Value) -> String {
    payload
        .get("message")
        .or_else(|| payload.get("error"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status))
}

fn decode<T: DeserializeOwned>(path: &str, value: Value) -> ClientResult<T> {
    serde_json::from_value(value).map_err(|err| ClientError::Malformed {
        endpoint: path.to_string(),
        reason: err.to_string(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
