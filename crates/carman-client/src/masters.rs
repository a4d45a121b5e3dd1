//! # Master Data Service
//!
//! Read-only catalogs: establishments and vehicle brands. The establishment
//! the valet works at is remembered in the store so the app reopens where it
//! left off.

use std::sync::Arc;
use tracing::{debug, warn};

use carman_core::{Brand, Establishment};
use carman_store::{keys, KeyValueStore};

use crate::api::ApiClient;
use crate::error::ClientResult;

/// Read-only master data (establishments, brands) plus the persisted
/// establishment selection.
pub struct MasterDataService {
    api: Arc<ApiClient>,
    store: Arc<dyn KeyValueStore>,
}

impl MasterDataService {
    pub fn new(api: Arc<ApiClient>, store: Arc<dyn KeyValueStore>) -> Self {
        MasterDataService { api, store }
    }

    /// Establishments visible to the current user.
    pub async fn establishments(&self) -> ClientResult<Vec<Establishment>> {
        let establishments = self.api.establishments().await?;
        debug!(count = establishments.len(), "Fetched establishments");
        Ok(establishments)
    }

    /// Vehicle brand catalog, used to populate the entry form.
    pub async fn brands(&self) -> ClientResult<Vec<Brand>> {
        self.api.brands().await
    }

    // =========================================================================
    // Establishment Selection
    // =========================================================================

    /// Persists the establishment the valet is working at.
    pub async fn select_establishment(&self, establishment: &Establishment) -> ClientResult<()> {
        carman_store::set_json(self.store.as_ref(), keys::ESTABLISHMENT_DATA, establishment)
            .await?;
        debug!(establishment = %establishment.id, "Establishment selected");
        Ok(())
    }

    /// The persisted selection, if any. A corrupted entry is purged and
    /// treated as no selection.
    pub async fn selected_establishment(&self) -> ClientResult<Option<Establishment>> {
        match carman_store::get_json(self.store.as_ref(), keys::ESTABLISHMENT_DATA).await {
            Ok(selection) => Ok(selection),
            Err(err) => {
                warn!(%err, "Persisted establishment unreadable, clearing selection");
                self.store.remove(keys::ESTABLISHMENT_DATA).await?;
                Ok(None)
            }
        }
    }

    pub async fn clear_establishment(&self) -> ClientResult<()> {
        self.store.remove(keys::ESTABLISHMENT_DATA).await?;
        Ok(())
    }
}
