//! # Shift Coordinator
//!
//! Answers "is there an active shift for this establishment?" and owns the
//! open/close transitions. Reads are normalized so the UI only ever sees
//! `Some(shift)` / `None` / a transport error; writes invalidate the whole
//! read cache.
//!
//! ## Read Normalization
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   active_shift normalization                            │
//! │                                                                         │
//! │  2xx with shift body ─────────────► Ok(Some(shift))                     │
//! │  2xx with null body ──────────────► Ok(None)                            │
//! │  404 / business rejection ────────► Ok(None)   "no shift open"          │
//! │  non-JSON body (endpoint missing) ► Ok(None)   degraded, logged         │
//! │  network failure / timeout ───────► Err        the only real errors     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Cache
//! Responses are cached per establishment with a configurable staleness
//! window (zero by default, i.e. always refetch). Any successful mutation —
//! even for one establishment — clears the whole cache: shifts are cheap to
//! refetch and a stale "shift open" answer is worse than an extra request.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use carman_core::{NewShiftRequest, Shift, ShiftPeriod};

use crate::api::ApiClient;
use crate::error::ClientResult;

/// Outcome of a close request. Closing an already-closed shift is success,
/// not an error: the caller wanted the shift closed and it is.
#[derive(Debug, Clone, PartialEq)]
pub enum CloseOutcome {
    /// The shift was open and is now closed.
    Closed(Shift),
    /// The shift was already closed (or gone) before the request.
    AlreadyClosed,
}

#[derive(Debug, Clone)]
struct CachedShift {
    fetched_at: Instant,
    shift: Option<Shift>,
}

/// Coordinates active-shift reads and open/close transitions.
pub struct ShiftCoordinator {
    api: Arc<ApiClient>,
    staleness: Duration,
    cache: RwLock<HashMap<String, CachedShift>>,
}

impl ShiftCoordinator {
    /// Coordinator that refetches on every read.
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self::with_staleness(api, Duration::ZERO)
    }

    /// Coordinator that serves cached answers younger than `staleness`.
    pub fn with_staleness(api: Arc<ApiClient>, staleness: Duration) -> Self {
        ShiftCoordinator {
            api,
            staleness,
            cache: RwLock::new(HashMap::new()),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Active shift for the establishment, or `None` when no shift is open.
    /// Only transport failures surface as errors; see module docs.
    pub async fn active_shift(&self, establishment_id: &str) -> ClientResult<Option<Shift>> {
        if self.staleness > Duration::ZERO {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.get(establishment_id) {
                if cached.fetched_at.elapsed() < self.staleness {
                    debug!(establishment = establishment_id, "Active shift served from cache");
                    return Ok(cached.shift.clone());
                }
            }
        }

        let shift = match self.api.active_shift(establishment_id).await {
            Ok(shift) => shift,
            Err(err) if err.is_transport() => return Err(err),
            Err(err) => {
                // 404, business rejections and a missing endpoint all mean
                // the same thing to the caller: no shift to work against.
                debug!(establishment = establishment_id, %err, "Treating shift read failure as no active shift");
                None
            }
        };

        let mut cache = self.cache.write().await;
        cache.insert(
            establishment_id.to_string(),
            CachedShift {
                fetched_at: Instant::now(),
                shift: shift.clone(),
            },
        );
        Ok(shift)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Opens a shift for today with the conventional generated name
    /// (`dd/mm/yyyy - establishment - PERIOD`).
    pub async fn open_shift(
        &self,
        establishment_id: &str,
        period: ShiftPeriod,
    ) -> ClientResult<Shift> {
        let request = NewShiftRequest::for_date(
            chrono::Utc::now().date_naive(),
            establishment_id,
            period,
        );
        let shift = self.api.open_shift(&request).await?;
        info!(establishment = establishment_id, period = %period, "Shift opened");
        self.invalidate_all().await;
        Ok(shift)
    }

    /// Closes the establishment's active shift. A 400 rejection means the
    /// shift was already closed, which is reported as success.
    pub async fn close_shift(&self, establishment_id: &str) -> ClientResult<CloseOutcome> {
        let outcome = match self.api.close_shift(establishment_id).await {
            Ok(shift) => CloseOutcome::Closed(shift),
            Err(err) if err.is_rejection_with_status(400) => {
                warn!(establishment = establishment_id, %err, "Shift was already closed");
                CloseOutcome::AlreadyClosed
            }
            Err(err) => return Err(err),
        };
        info!(establishment = establishment_id, "Shift close settled");
        self.invalidate_all().await;
        Ok(outcome)
    }

    /// Drops every cached answer. Called after every successful mutation and
    /// available to callers that know the world changed (e.g. a push
    /// notification about another device's mutation).
    pub async fn invalidate_all(&self) {
        let mut cache = self.cache.write().await;
        let dropped = cache.len();
        cache.clear();
        if dropped > 0 {
            debug!(dropped, "Shift cache invalidated");
        }
    }
}
