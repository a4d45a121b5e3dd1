//! # Vehicle Types and Grouping
//!
//! A vehicle entry (`ingreso`) walks a six-state lifecycle from check-in to
//! billing:
//!
//! ```text
//! INGRESADO ──► ESTACIONADO ──► SOLICITADO ──► EN CAMINO ──► ENTREGADO ──► FACTURADO
//!    (in)        (parked)       (requested)    (on the way)  (delivered)    (billed)
//! ```
//!
//! For the operator UI the six states collapse into three urgency layers:
//! red (vehicles arriving), yellow (owners waiting), green (done). The
//! grouping and the per-state stats live here so they stay pure and testable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::user::Establishment;

// =============================================================================
// Vehicle State
// =============================================================================

/// Lifecycle state of a vehicle entry, spelled as the backend does
/// (note the space in `EN CAMINO`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleState {
    #[serde(rename = "INGRESADO")]
    Ingresado,
    #[serde(rename = "ESTACIONADO")]
    Estacionado,
    #[serde(rename = "SOLICITADO")]
    Solicitado,
    #[serde(rename = "EN CAMINO")]
    EnCamino,
    #[serde(rename = "ENTREGADO")]
    Entregado,
    #[serde(rename = "FACTURADO")]
    Facturado,
}

impl VehicleState {
    pub const ALL: [VehicleState; 6] = [
        VehicleState::Ingresado,
        VehicleState::Estacionado,
        VehicleState::Solicitado,
        VehicleState::EnCamino,
        VehicleState::Entregado,
        VehicleState::Facturado,
    ];

    pub const fn wire_tag(&self) -> &'static str {
        match self {
            VehicleState::Ingresado => "INGRESADO",
            VehicleState::Estacionado => "ESTACIONADO",
            VehicleState::Solicitado => "SOLICITADO",
            VehicleState::EnCamino => "EN CAMINO",
            VehicleState::Entregado => "ENTREGADO",
            VehicleState::Facturado => "FACTURADO",
        }
    }

    /// Which urgency layer this state belongs to.
    pub const fn layer(&self) -> UrgencyLayer {
        match self {
            VehicleState::Ingresado | VehicleState::Estacionado => UrgencyLayer::Red,
            VehicleState::Solicitado | VehicleState::EnCamino => UrgencyLayer::Yellow,
            VehicleState::Entregado | VehicleState::Facturado => UrgencyLayer::Green,
        }
    }
}

impl fmt::Display for VehicleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_tag())
    }
}

impl FromStr for VehicleState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "INGRESADO" => Ok(VehicleState::Ingresado),
            "ESTACIONADO" => Ok(VehicleState::Estacionado),
            "SOLICITADO" => Ok(VehicleState::Solicitado),
            "EN CAMINO" => Ok(VehicleState::EnCamino),
            "ENTREGADO" => Ok(VehicleState::Entregado),
            "FACTURADO" => Ok(VehicleState::Facturado),
            other => Err(CoreError::UnknownVehicleState(other.to_string())),
        }
    }
}

/// The three operator-facing groupings of vehicle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLayer {
    /// Arriving: `INGRESADO`, `ESTACIONADO`.
    Red,
    /// Owner waiting: `SOLICITADO`, `EN CAMINO`.
    Yellow,
    /// Done: `ENTREGADO`, `FACTURADO`.
    Green,
}

// =============================================================================
// Vehicle Records
// =============================================================================

/// A vehicle brand, from `GET /api/masters/marcas`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    #[serde(rename = "_id")]
    pub id: String,
    pub descripcion: String,
    #[serde(default)]
    pub activo: Option<bool>,
}

/// One state change in a vehicle's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChange {
    #[serde(rename = "_id")]
    pub id: String,
    pub estado: String,
    pub fecha: DateTime<Utc>,
    #[serde(default)]
    pub empleado: Option<String>,
    #[serde(default)]
    pub observacion: Option<String>,
}

/// A vehicle entry, from `GET /api/vehiculos/ingresos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    #[serde(rename = "_id")]
    pub id: String,

    /// License plate, upper case.
    pub patente: String,

    /// Sector within the establishment where the vehicle is parked.
    pub sector: String,

    /// Populated establishment record.
    pub establecimiento: Establishment,

    pub estado: VehicleState,

    #[serde(rename = "horaIngreso")]
    pub hora_ingreso: DateTime<Utc>,

    #[serde(rename = "horaEgreso", default)]
    pub hora_egreso: Option<DateTime<Utc>>,

    #[serde(rename = "nroLlave", default)]
    pub nro_llave: Option<i64>,

    #[serde(default)]
    pub marca: Option<Brand>,

    #[serde(default)]
    pub modelo: Option<String>,

    #[serde(default)]
    pub color: Option<String>,

    #[serde(rename = "nombreConductor", default)]
    pub nombre_conductor: Option<String>,

    #[serde(default)]
    pub telefono: Option<String>,

    #[serde(rename = "quienSeLleva", default)]
    pub quien_se_lleva: Option<String>,

    #[serde(default)]
    pub vip: Option<bool>,

    #[serde(default)]
    pub recurrente: Option<bool>,

    #[serde(default)]
    pub inhabilitado: Option<bool>,

    #[serde(rename = "historialEstados", default)]
    pub historial_estados: Vec<StateChange>,

    #[serde(rename = "nroTicket", default)]
    pub nro_ticket: Option<i64>,

    #[serde(default)]
    pub empleado: Option<String>,

    #[serde(default)]
    pub turno: Option<String>,

    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Vehicle {
    /// Timestamp used for chronological ordering in the UI layers.
    fn sort_key(&self) -> DateTime<Utc> {
        self.created_at.unwrap_or(self.hora_ingreso)
    }
}

/// Form data for `POST /api/vehiculos/ingresos` (check-in).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleEntryForm {
    pub patente: String,
    pub sector: String,
    pub establecimiento: String,
    #[serde(rename = "nroLlave", skip_serializing_if = "Option::is_none")]
    pub nro_llave: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marca: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modelo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(rename = "nombreConductor", skip_serializing_if = "Option::is_none")]
    pub nombre_conductor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vip: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrente: Option<bool>,
}

/// Body of `POST /api/vehiculos/ingresos/estado` (state transition).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleStateUpdate {
    #[serde(rename = "ingresoId")]
    pub ingreso_id: String,
    pub estado: VehicleState,
    #[serde(rename = "horaEgreso", skip_serializing_if = "Option::is_none")]
    pub hora_egreso: Option<DateTime<Utc>>,
}

/// A known vehicle matched by plate search, from `GET /api/vehiculos/buscar`.
/// Unlike [`Vehicle`], `establecimiento` is a bare id here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleMatch {
    #[serde(rename = "_id")]
    pub id: String,
    pub patente: String,
    pub establecimiento: String,
    #[serde(default)]
    pub modelo: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(rename = "nombreConductor", default)]
    pub nombre_conductor: Option<String>,
    #[serde(default)]
    pub vip: Option<bool>,
    #[serde(default)]
    pub recurrente: Option<bool>,
    #[serde(default)]
    pub inhabilitado: Option<bool>,
}

// =============================================================================
// Grouping and Stats
// =============================================================================

/// Vehicles partitioned into the three urgency layers, each sorted by entry
/// time ascending (oldest first — the vehicle waiting longest leads).
#[derive(Debug, Clone, Default)]
pub struct VehicleLayers {
    pub red: Vec<Vehicle>,
    pub yellow: Vec<Vehicle>,
    pub green: Vec<Vehicle>,
}

impl VehicleLayers {
    /// Partitions `vehicles` by [`VehicleState::layer`].
    pub fn group(vehicles: Vec<Vehicle>) -> Self {
        let mut layers = VehicleLayers::default();
        for vehicle in vehicles {
            match vehicle.estado.layer() {
                UrgencyLayer::Red => layers.red.push(vehicle),
                UrgencyLayer::Yellow => layers.yellow.push(vehicle),
                UrgencyLayer::Green => layers.green.push(vehicle),
            }
        }
        for bucket in [&mut layers.red, &mut layers.yellow, &mut layers.green] {
            bucket.sort_by_key(|v| v.sort_key());
        }
        layers
    }

    /// Vehicles in one layer.
    pub fn layer(&self, layer: UrgencyLayer) -> &[Vehicle] {
        match layer {
            UrgencyLayer::Red => &self.red,
            UrgencyLayer::Yellow => &self.yellow,
            UrgencyLayer::Green => &self.green,
        }
    }
}

/// Aggregate counts over a set of vehicle entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VehicleStats {
    pub total: usize,
    pub ingresados: usize,
    pub estacionados: usize,
    pub solicitados: usize,
    pub en_camino: usize,
    pub entregados: usize,
    pub facturados: usize,
    pub vip: usize,
    pub recurrentes: usize,
    pub inhabilitados: usize,
}

impl VehicleStats {
    pub fn compute(vehicles: &[Vehicle]) -> Self {
        let mut stats = VehicleStats {
            total: vehicles.len(),
            ..VehicleStats::default()
        };
        for v in vehicles {
            match v.estado {
                VehicleState::Ingresado => stats.ingresados += 1,
                VehicleState::Estacionado => stats.estacionados += 1,
                VehicleState::Solicitado => stats.solicitados += 1,
                VehicleState::EnCamino => stats.en_camino += 1,
                VehicleState::Entregado => stats.entregados += 1,
                VehicleState::Facturado => stats.facturados += 1,
            }
            if v.vip.unwrap_or(false) {
                stats.vip += 1;
            }
            if v.recurrente.unwrap_or(false) {
                stats.recurrentes += 1;
            }
            if v.inhabilitado.unwrap_or(false) {
                stats.inhabilitados += 1;
            }
        }
        stats
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
