//! # Vehicle Service
//!
//! Vehicle entry lifecycle for the floor UI: check-in, state transitions,
//! plate corrections, and the grouped board view (red/yellow/green urgency
//! layers computed in `carman-core`).

use std::sync::Arc;
use tracing::{debug, info};

use carman_core::vehicle::{VehicleEntryForm, VehicleStateUpdate};
use carman_core::{validation, Vehicle, VehicleLayers, VehicleMatch, VehicleState, VehicleStats};

use crate::api::ApiClient;
use crate::error::ClientResult;

/// Vehicle entries and their lifecycle for one API.
pub struct VehicleService {
    api: Arc<ApiClient>,
}

impl VehicleService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        VehicleService { api }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// All entries for the establishment, in server order.
    pub async fn entries(&self, establishment_id: &str) -> ClientResult<Vec<Vehicle>> {
        let entries = self.api.vehicle_entries(establishment_id).await?;
        debug!(
            establishment = establishment_id,
            count = entries.len(),
            "Fetched vehicle entries"
        );
        Ok(entries)
    }

    /// Entries grouped into the three urgency layers for the board view.
    pub async fn board(&self, establishment_id: &str) -> ClientResult<VehicleLayers> {
        let entries = self.entries(establishment_id).await?;
        Ok(VehicleLayers::group(entries))
    }

    /// Aggregate counts for the establishment's entries.
    pub async fn stats(&self, establishment_id: &str) -> ClientResult<VehicleStats> {
        let entries = self.entries(establishment_id).await?;
        Ok(VehicleStats::compute(&entries))
    }

    pub async fn entry(&self, entry_id: &str) -> ClientResult<Vehicle> {
        self.api.vehicle_entry(entry_id).await
    }

    /// Looks up a plate within the establishment. The plate is normalized
    /// (trimmed, uppercased, inner whitespace stripped) before the request.
    pub async fn search_plate(
        &self,
        plate: &str,
        establishment_id: &str,
    ) -> ClientResult<VehicleMatch> {
        let plate = validation::normalize_plate(plate);
        validation::validate_plate(&plate)?;
        self.api.search_plate(&plate, establishment_id).await
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Checks a vehicle in. The form is validated and the plate normalized
    /// before anything goes on the wire.
    pub async fn check_in(&self, mut form: VehicleEntryForm) -> ClientResult<Vehicle> {
        form.patente = validation::normalize_plate(&form.patente);
        validation::validate_entry_form(&form)?;
        let vehicle = self.api.create_vehicle_entry(&form).await?;
        info!(plate = %form.patente, "Vehicle checked in");
        Ok(vehicle)
    }

    /// Corrects the plate and sector on an existing entry.
    pub async fn correct_entry(
        &self,
        entry_id: &str,
        plate: &str,
        sector: &str,
    ) -> ClientResult<()> {
        let plate = validation::normalize_plate(plate);
        validation::validate_plate(&plate)?;
        self.api.update_vehicle_entry(entry_id, &plate, sector).await?;
        info!(entry = entry_id, plate = %plate, "Vehicle entry corrected");
        Ok(())
    }

    /// Moves an entry to `state`. Delivery (`ENTREGADO`) stamps the exit
    /// time; every other transition leaves it unset.
    pub async fn set_state(&self, entry_id: &str, state: VehicleState) -> ClientResult<()> {
        let hora_egreso = match state {
            VehicleState::Entregado => Some(chrono::Utc::now()),
            _ => None,
        };
        let update = VehicleStateUpdate {
            ingreso_id: entry_id.to_string(),
            estado: state,
            hora_egreso,
        };
        self.api.update_vehicle_state(&update).await?;
        info!(entry = entry_id, state = %state, "Vehicle state updated");
        Ok(())
    }
}
