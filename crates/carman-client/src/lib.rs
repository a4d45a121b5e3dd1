//! # carman-client: Coordination Layer of the Carman Valet Client
//!
//! Everything between the pure domain ([`carman_core`]) and a user interface:
//! the HTTP client, the session state machine, the shift coordinator and the
//! thin data services.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         carman-client                                   │
//! │                                                                         │
//! │                        ┌──────────────────┐                             │
//! │         UI / CLI ─────►│  CarmanContext   │  one explicit wiring point  │
//! │                        └────────┬─────────┘  (no global singletons)     │
//! │                                 │                                       │
//! │     ┌───────────────┬───────────┼──────────────┬──────────────┐         │
//! │     ▼               ▼           ▼              ▼              ▼         │
//! │  SessionManager  ShiftCoord  MasterData   VehicleService  Notifications │
//! │     │               │           │              │              │         │
//! │     └───────────────┴─────┬─────┴──────────────┴──────────────┘         │
//! │                           ▼                                             │
//! │                     ApiClient ──────► Carman REST API                   │
//! │                           │                                             │
//! │                     KeyValueStore ──► durable client state              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```no_run
//! use carman_client::{CarmanContext, ClientConfig};
//!
//! # async fn demo() -> carman_client::ClientResult<()> {
//! let config = ClientConfig::load_or_default(None).validated()?;
//! let ctx = CarmanContext::open(config).await?;
//!
//! ctx.session.initialize().await?;
//! let snapshot = ctx.session.login("ana@carman.app", "secret").await?;
//! assert!(snapshot.is_authenticated);
//!
//! let shift = ctx.shifts.active_shift("est-1").await?;
//! println!("active shift: {:?}", shift);
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod api;
pub mod config;
pub mod error;
pub mod masters;
pub mod notifications;
pub mod session;
pub mod shift;
pub mod vehicles;

// =============================================================================
// Re-exports
// =============================================================================

pub use api::{ApiClient, LoginData, TokenPair};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use masters::MasterDataService;
pub use notifications::{Notification, NotificationService};
pub use session::{SessionManager, SessionSnapshot};
pub use shift::{CloseOutcome, ShiftCoordinator};
pub use vehicles::VehicleService;

use std::sync::Arc;

use carman_store::{FileStore, KeyValueStore};

// =============================================================================
// Context
// =============================================================================

/// Explicitly constructed wiring of store, HTTP client and services.
/// Build one at startup and pass it (or clones of its `Arc` fields) to
/// whatever consumes the client.
pub struct CarmanContext {
    pub store: Arc<dyn KeyValueStore>,
    pub api: Arc<ApiClient>,
    pub session: Arc<SessionManager>,
    pub shifts: Arc<ShiftCoordinator>,
    pub masters: Arc<MasterDataService>,
    pub vehicles: Arc<VehicleService>,
    pub notifications: Arc<NotificationService>,
}

impl CarmanContext {
    /// Context backed by the platform-default file store.
    pub async fn open(config: ClientConfig) -> ClientResult<Self> {
        let store = FileStore::open_default().await?;
        Self::with_store(config, Arc::new(store))
    }

    /// Context over an arbitrary store (in-memory for tests, a file store
    /// at a custom path, ...).
    pub fn with_store(
        config: ClientConfig,
        store: Arc<dyn KeyValueStore>,
    ) -> ClientResult<Self> {
        let api = Arc::new(ApiClient::new(&config, store.clone())?);
        Ok(CarmanContext {
            session: Arc::new(SessionManager::new(api.clone(), store.clone())),
            shifts: Arc::new(ShiftCoordinator::new(api.clone())),
            masters: Arc::new(MasterDataService::new(api.clone(), store.clone())),
            vehicles: Arc::new(VehicleService::new(api.clone())),
            notifications: Arc::new(NotificationService::new(api.clone())),
            api,
            store,
        })
    }
}
