//! Loopback mock of the Carman API.
//!
//! Serves the same JSON shapes as the production backend (including the
//! `data` envelope where the real API uses one) on an ephemeral port, with
//! per-test toggles for failure injection.

#![allow(dead_code)]

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use carman_client::{CarmanContext, ClientConfig};
use carman_store::MemoryStore;

/// Handle to a running mock server plus its mutable scenario state.
pub struct MockApi {
    pub base_url: String,
    pub state: Arc<MockState>,
}

#[derive(Default)]
pub struct MockState {
    // Failure injection
    pub fail_login: AtomicBool,
    pub fail_profile: AtomicBool,
    pub fail_refresh: AtomicBool,
    /// Serve the active-shift endpoint as an HTML error page.
    pub shift_endpoint_html: AtomicBool,

    // Artificial latency, for racing overlapping session mutations
    pub login_delay_ms: AtomicUsize,
    pub logout_delay_ms: AtomicUsize,

    // Call counters
    pub login_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    pub shift_reads: AtomicUsize,

    // World state
    pub shifts: Mutex<HashMap<String, Value>>,
    pub shift_seq: AtomicUsize,
    pub vehicles: Mutex<Vec<Value>>,
    pub vehicle_seq: AtomicUsize,
    pub notifications: Mutex<Vec<Value>>,
    pub state_updates: Mutex<Vec<Value>>,
}

impl MockApi {
    /// Starts the server on an ephemeral loopback port.
    pub async fn spawn() -> MockApi {
        let state = Arc::new(MockState::default());

        let router = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/logout", post(logout))
            .route("/api/auth/refresh", post(refresh))
            .route("/api/auth/user", get(user_profile))
            .route("/api/masters/establecimientos", get(establishments))
            .route("/api/masters/marcas", get(brands))
            .route("/api/turnos", post(open_shift))
            .route("/api/turnos/establecimiento/{id}", get(active_shift))
            .route("/api/turnos/finalizar/{id}", post(close_shift))
            .route("/api/vehiculos/ingresos", get(vehicle_entries).post(create_entry))
            .route("/api/vehiculos/ingresos/estado", post(update_state))
            .route(
                "/api/vehiculos/ingresos/{id}",
                get(vehicle_entry).put(update_entry),
            )
            .route("/api/vehiculos/buscar/{plate}", get(search_plate))
            .route("/api/notificaciones", get(notifications))
            .route("/api/notificaciones/unread", get(unread_notifications))
            .route("/api/notificaciones/{id}/read", put(mark_read))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        MockApi { base_url, state }
    }

    /// A context wired to this server over an in-memory store.
    pub fn context(&self) -> CarmanContext {
        self.context_with_store(Arc::new(MemoryStore::new()))
    }

    pub fn context_with_store(&self, store: Arc<dyn carman_store::KeyValueStore>) -> CarmanContext {
        let config = ClientConfig {
            base_url: self.base_url.clone(),
            timeout_secs: 5,
        };
        CarmanContext::with_store(config, store).unwrap()
    }

    /// Seeds an open shift so reads and closes have something to find.
    pub fn seed_shift(&self, establishment: &str, period: &str) {
        let shift = json!({
            "_id": format!("s{}", self.state.shift_seq.fetch_add(1, Ordering::SeqCst)),
            "turno": period,
            "establecimiento": establishment,
            "nombre": format!("07/03/2026 - {} - {}", establishment, period),
            "createdAt": "2026-03-07T12:00:00Z"
        });
        self.state
            .shifts
            .lock()
            .unwrap()
            .insert(establishment.to_string(), shift);
    }

    pub fn seed_notification(&self, id: &str, leida: bool) {
        self.state.notifications.lock().unwrap().push(json!({
            "_id": id,
            "titulo": "Aviso",
            "mensaje": "Mensaje de prueba",
            "leida": leida,
            "createdAt": "2026-03-07T12:00:00Z"
        }));
    }
}

// =============================================================================
// Response Helpers
// =============================================================================

fn data(value: Value) -> Response {
    Json(json!({ "data": value })).into_response()
}

fn rejection(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn html_page(status: StatusCode) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/html")],
        "<html><body>Not Found</body></html>",
    )
        .into_response()
}

// =============================================================================
// Auth Handlers
// =============================================================================

async fn pause(delay_ms: &AtomicUsize) {
    let ms = delay_ms.load(Ordering::SeqCst);
    if ms > 0 {
        tokio::time::sleep(std::time::Duration::from_millis(ms as u64)).await;
    }
}

async fn login(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.login_calls.fetch_add(1, Ordering::SeqCst);
    pause(&state.login_delay_ms).await;
    if state.fail_login.load(Ordering::SeqCst) {
        return rejection(StatusCode::UNAUTHORIZED, "Credenciales inválidas");
    }
    if body.get("email").and_then(Value::as_str).unwrap_or("").is_empty() {
        return rejection(StatusCode::BAD_REQUEST, "Email requerido");
    }
    data(json!({ "token": "T1", "refreshToken": "R1" }))
}

async fn logout(State(state): State<Arc<MockState>>) -> Response {
    state.logout_calls.fetch_add(1, Ordering::SeqCst);
    pause(&state.logout_delay_ms).await;
    Json(json!({ "message": "ok" })).into_response()
}

async fn refresh(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    if state.fail_refresh.load(Ordering::SeqCst)
        || body.get("refreshToken").and_then(Value::as_str) != Some("R1")
    {
        return rejection(StatusCode::UNAUTHORIZED, "Refresh token inválido");
    }
    data(json!({ "token": "T2", "refreshToken": "R2" }))
}

async fn user_profile(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if state.fail_profile.load(Ordering::SeqCst) {
        return rejection(StatusCode::INTERNAL_SERVER_ERROR, "Perfil no disponible");
    }
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("Bearer "))
        .unwrap_or(false);
    if !authorized {
        return rejection(StatusCode::UNAUTHORIZED, "No autenticado");
    }
    Json(json!({
        "user": {
            "_id": "u1",
            "email": "ana@carman.app",
            "nombre": "Ana",
            "apellido": "García",
            "rol": "valet",
            "establecimientos": ["e1"]
        }
    }))
    .into_response()
}

// =============================================================================
// Master Data Handlers
// =============================================================================

async fn establishments() -> Response {
    data(json!([
        {
            "_id": "e1",
            "nombre": "Palermo",
            "direccion": "Av. Libertador 1000",
            "sectores": [{ "_id": "sec1", "nombre": "Subsuelo", "capacidad": "40" }]
        },
        { "_id": "e2", "nombre": "Recoleta" }
    ]))
}

async fn brands() -> Response {
    data(json!([
        { "_id": "b1", "descripcion": "Toyota" },
        { "_id": "b2", "descripcion": "Ford" }
    ]))
}

// =============================================================================
// Shift Handlers
// =============================================================================

async fn active_shift(State(state): State<Arc<MockState>>, Path(id): Path<String>) -> Response {
    state.shift_reads.fetch_add(1, Ordering::SeqCst);
    if state.shift_endpoint_html.load(Ordering::SeqCst) {
        return html_page(StatusCode::NOT_FOUND);
    }
    match state.shifts.lock().unwrap().get(&id) {
        Some(shift) => data(shift.clone()),
        None => rejection(StatusCode::NOT_FOUND, "No hay turno activo"),
    }
}

async fn open_shift(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    let establishment = body
        .get("establecimiento")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    let shift = json!({
        "_id": format!("s{}", state.shift_seq.fetch_add(1, Ordering::SeqCst)),
        "turno": body.get("turno").cloned().unwrap_or(Value::Null),
        "establecimiento": establishment,
        "nombre": body.get("nombre").cloned().unwrap_or(Value::Null),
        "createdAt": "2026-03-07T12:00:00Z"
    });
    state
        .shifts
        .lock()
        .unwrap()
        .insert(establishment, shift.clone());
    (StatusCode::CREATED, Json(json!({ "data": shift }))).into_response()
}

async fn close_shift(State(state): State<Arc<MockState>>, Path(id): Path<String>) -> Response {
    match state.shifts.lock().unwrap().remove(&id) {
        Some(shift) => data(shift),
        None => rejection(StatusCode::BAD_REQUEST, "El turno ya está cerrado"),
    }
}

// =============================================================================
// Vehicle Handlers
// =============================================================================

async fn vehicle_entries(
    State(state): State<Arc<MockState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let wanted = params.get("establecimiento").cloned().unwrap_or_default();
    let entries: Vec<Value> = state
        .vehicles
        .lock()
        .unwrap()
        .iter()
        .filter(|v| {
            v.pointer("/establecimiento/_id").and_then(Value::as_str) == Some(wanted.as_str())
        })
        .cloned()
        .collect();
    data(Value::Array(entries))
}

async fn vehicle_entry(State(state): State<Arc<MockState>>, Path(id): Path<String>) -> Response {
    let vehicles = state.vehicles.lock().unwrap();
    match vehicles
        .iter()
        .find(|v| v.get("_id").and_then(Value::as_str) == Some(id.as_str()))
    {
        Some(vehicle) => data(vehicle.clone()),
        None => rejection(StatusCode::NOT_FOUND, "Ingreso no encontrado"),
    }
}

async fn create_entry(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    let vehicle = json!({
        "_id": format!("v{}", state.vehicle_seq.fetch_add(1, Ordering::SeqCst)),
        "patente": body.get("patente").cloned().unwrap_or(Value::Null),
        "sector": body.get("sector").cloned().unwrap_or(Value::Null),
        "establecimiento": {
            "_id": body.get("establecimiento").cloned().unwrap_or(Value::Null),
            "nombre": "Palermo"
        },
        "estado": "INGRESADO",
        "horaIngreso": "2026-03-07T14:00:00Z",
        "nroLlave": body.get("nroLlave").cloned().unwrap_or(Value::Null)
    });
    state.vehicles.lock().unwrap().push(vehicle.clone());
    (StatusCode::CREATED, Json(json!({ "data": vehicle }))).into_response()
}

async fn update_entry(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut vehicles = state.vehicles.lock().unwrap();
    match vehicles
        .iter_mut()
        .find(|v| v.get("_id").and_then(Value::as_str) == Some(id.as_str()))
    {
        Some(vehicle) => {
            if let (Some(obj), Some(plate)) = (vehicle.as_object_mut(), body.get("patente")) {
                obj.insert("patente".to_string(), plate.clone());
                if let Some(sector) = body.get("sector") {
                    obj.insert("sector".to_string(), sector.clone());
                }
            }
            Json(json!({ "message": "ok" })).into_response()
        }
        None => rejection(StatusCode::NOT_FOUND, "Ingreso no encontrado"),
    }
}

async fn update_state(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    let id = body
        .get("ingresoId")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    {
        let mut vehicles = state.vehicles.lock().unwrap();
        if let Some(vehicle) = vehicles
            .iter_mut()
            .find(|v| v.get("_id").and_then(Value::as_str) == Some(id.as_str()))
        {
            if let (Some(obj), Some(estado)) = (vehicle.as_object_mut(), body.get("estado")) {
                obj.insert("estado".to_string(), estado.clone());
            }
        }
    }
    state.state_updates.lock().unwrap().push(body);
    Json(json!({ "message": "ok" })).into_response()
}

async fn search_plate(
    State(state): State<Arc<MockState>>,
    Path(plate): Path<String>,
) -> Response {
    let vehicles = state.vehicles.lock().unwrap();
    match vehicles
        .iter()
        .find(|v| v.get("patente").and_then(Value::as_str) == Some(plate.as_str()))
    {
        Some(vehicle) => data(json!({
            "_id": vehicle.get("_id").cloned().unwrap_or(Value::Null),
            "patente": plate,
            "establecimiento": vehicle.pointer("/establecimiento/_id").cloned().unwrap_or(Value::Null)
        })),
        None => rejection(StatusCode::NOT_FOUND, "Vehículo no encontrado"),
    }
}

// =============================================================================
// Notification Handlers
// =============================================================================

async fn notifications(State(state): State<Arc<MockState>>) -> Response {
    data(Value::Array(state.notifications.lock().unwrap().clone()))
}

async fn unread_notifications(State(state): State<Arc<MockState>>) -> Response {
    let unread: Vec<Value> = state
        .notifications
        .lock()
        .unwrap()
        .iter()
        .filter(|n| n.get("leida").and_then(Value::as_bool) == Some(false))
        .cloned()
        .collect();
    data(Value::Array(unread))
}

async fn mark_read(State(state): State<Arc<MockState>>, Path(id): Path<String>) -> Response {
    let mut notifications = state.notifications.lock().unwrap();
    match notifications
        .iter_mut()
        .find(|n| n.get("_id").and_then(Value::as_str) == Some(id.as_str()))
    {
        Some(notification) => {
            if let Some(obj) = notification.as_object_mut() {
                obj.insert("leida".to_string(), Value::Bool(true));
            }
            Json(json!({ "message": "ok" })).into_response()
        }
        None => rejection(StatusCode::NOT_FOUND, "Notificación no encontrada"),
    }
}
