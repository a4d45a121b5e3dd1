//! # Session Manager
//!
//! Owns the authenticated-session state machine: login, logout, restore on
//! startup, and token refresh. All session state flows through this one
//! component; the HTTP layer only ever *reads* the token it persists.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Session Lifecycle                                │
//! │                                                                         │
//! │                 initialize()                                            │
//! │   (startup) ──────────────────► token + user in store?                  │
//! │                                   │yes              │no                 │
//! │                                   ▼                 ▼                   │
//! │   ┌────────────────┐   login   ┌─────────────────────┐                  │
//! │   │ Authenticated  │◄──────────│  Unauthenticated    │                  │
//! │   │ token + user?  │──────────►│  (store purged)     │                  │
//! │   └────────────────┘  logout / └─────────────────────┘                  │
//! │          ▲             failed refresh                                   │
//! │          └── refresh_auth_token (token rotates, user untouched)         │
//! │                                                                         │
//! │  WRITE ORDER: store first, then in-memory state, then observers.        │
//! │  A crash between the two leaves the store authoritative for restart.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrent Mutations
//! Every mutating operation takes a generation ticket before its first await.
//! Before committing state it re-checks that no newer operation has started;
//! a superseded operation discards its result and returns
//! [`ClientError::Superseded`] instead of clobbering newer state.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use carman_core::{validation, User};
use carman_store::{keys, KeyValueStore};

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};

// =============================================================================
// Snapshot
// =============================================================================

/// Point-in-time view of the session, handed to observers by value so they
/// can never see a half-applied transition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub is_authenticated: bool,
    pub user: Option<User>,
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    /// True while a login is in flight.
    pub is_loading: bool,
}

impl SessionSnapshot {
    fn unauthenticated() -> Self {
        SessionSnapshot::default()
    }
}

type Observer = Box<dyn Fn(&SessionSnapshot) + Send + Sync>;

// =============================================================================
// Session Manager
// =============================================================================

/// Single owner of session state. Cheap to share via [`Arc`].
pub struct SessionManager {
    api: Arc<ApiClient>,
    store: Arc<dyn KeyValueStore>,
    state: RwLock<SessionSnapshot>,
    observers: Mutex<Vec<(u64, Observer)>>,
    next_observer_id: AtomicU64,
    /// Monotonic ticket for mutating operations; see module docs.
    generation: AtomicU64,
}

impl SessionManager {
    pub fn new(api: Arc<ApiClient>, store: Arc<dyn KeyValueStore>) -> Self {
        SessionManager {
            api,
            store,
            state: RwLock::new(SessionSnapshot::unauthenticated()),
            observers: Mutex::new(Vec::new()),
            next_observer_id: AtomicU64::new(1),
            generation: AtomicU64::new(0),
        }
    }

    /// Current session snapshot.
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated
    }

    // =========================================================================
    // Generation Guard
    // =========================================================================

    fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    /// Commits `next` as the session state unless a newer operation has
    /// started, in which case the result is discarded.
    async fn commit(&self, ticket: u64, next: SessionSnapshot) -> ClientResult<()> {
        if !self.is_current(ticket) {
            debug!(ticket, "Discarding superseded session transition");
            return Err(ClientError::Superseded);
        }
        {
            let mut state = self.state.write().await;
            *state = next.clone();
        }
        self.notify(&next);
        Ok(())
    }

    // =========================================================================
    // Observers
    // =========================================================================

    /// Registers an observer called after every committed transition.
    /// Returns an id for [`Self::unsubscribe`].
    pub fn subscribe<F>(&self, observer: F) -> u64
    where
        F: Fn(&SessionSnapshot) + Send + Sync + 'static,
    {
        let id = self.next_observer_id.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut observers) = self.observers.lock() {
            observers.push((id, Box::new(observer)));
        }
        id
    }

    pub fn unsubscribe(&self, id: u64) {
        if let Ok(mut observers) = self.observers.lock() {
            observers.retain(|(observer_id, _)| *observer_id != id);
        }
    }

    /// Fans the snapshot out to every observer. A panicking observer is
    /// logged and skipped; it never poisons the session or its peers.
    fn notify(&self, snapshot: &SessionSnapshot) {
        let observers = match self.observers.lock() {
            Ok(observers) => observers,
            Err(poisoned) => poisoned.into_inner(),
        };
        for (id, observer) in observers.iter() {
            if catch_unwind(AssertUnwindSafe(|| observer(snapshot))).is_err() {
                error!(observer = id, "Session observer panicked");
            }
        }
    }

    // =========================================================================
    // Startup Restore
    // =========================================================================

    /// Restores a persisted session, if any. Returns whether a session was
    /// restored. Idempotent; corrupted session data is purged and treated
    /// as no session.
    pub async fn initialize(&self) -> ClientResult<bool> {
        let ticket = self.begin();

        let token = self.store.get(keys::AUTH_TOKEN).await?;
        let user = match carman_store::get_json::<User>(self.store.as_ref(), keys::USER_DATA).await
        {
            Ok(user) => user,
            Err(err) => {
                warn!(%err, "Persisted user data unreadable, purging session");
                self.purge_session_keys().await;
                None
            }
        };

        // A token without a user (or vice versa) is a half-written session;
        // treat it as none at all.
        let (token, user) = match (token, user) {
            (Some(token), Some(user)) => (token, user),
            _ => {
                self.commit(ticket, SessionSnapshot::unauthenticated()).await?;
                return Ok(false);
            }
        };

        let refresh_token = self.store.get(keys::REFRESH_TOKEN).await?;
        info!(user = %user.display_name(), "Session restored from store");
        self.commit(
            ticket,
            SessionSnapshot {
                is_authenticated: true,
                user: Some(user),
                token: Some(token),
                refresh_token,
                is_loading: false,
            },
        )
        .await?;
        Ok(true)
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Authenticates with the backend and persists the session.
    ///
    /// The login is valid as soon as a token arrives; a profile fetch that
    /// fails afterwards leaves an authenticated session without a user
    /// profile rather than failing the login.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<SessionSnapshot> {
        validation::validate_credentials(email, password)?;
        let ticket = self.begin();

        {
            let mut state = self.state.write().await;
            state.is_loading = true;
            let loading = state.clone();
            drop(state);
            self.notify(&loading);
        }

        let login = match self.api.login(email, password).await {
            Ok(login) => login,
            Err(err) => {
                warn!(%err, "Login failed");
                self.clear_loading(ticket).await;
                return Err(err);
            }
        };

        if !self.is_current(ticket) {
            return Err(ClientError::Superseded);
        }

        // Store first, then memory: the store is what survives a restart.
        let user = match self.persist_login(&login).await {
            Ok(user) => user,
            Err(err) => {
                warn!(%err, "Could not persist session");
                self.clear_loading(ticket).await;
                return Err(err);
            }
        };

        let snapshot = SessionSnapshot {
            is_authenticated: true,
            user,
            token: Some(login.token),
            refresh_token: login.refresh_token,
            is_loading: false,
        };
        self.commit(ticket, snapshot.clone()).await?;
        info!("Login succeeded");
        Ok(snapshot)
    }

    /// Writes the session keys, then fetches the profile. A failed profile
    /// fetch is tolerated (the session stands without one); a failed store
    /// write is not.
    async fn persist_login(&self, login: &crate::api::LoginData) -> ClientResult<Option<User>> {
        self.store.set(keys::AUTH_TOKEN, &login.token).await?;
        match &login.refresh_token {
            Some(refresh) => self.store.set(keys::REFRESH_TOKEN, refresh).await?,
            // Drop any refresh token left over from a previous account.
            None => self.store.remove(keys::REFRESH_TOKEN).await?,
        }

        match self.api.user_profile().await {
            Ok(user) => {
                carman_store::set_json(self.store.as_ref(), keys::USER_DATA, &user).await?;
                Ok(Some(user))
            }
            Err(err) => {
                warn!(%err, "Profile fetch failed after login, continuing without profile");
                self.store.remove(keys::USER_DATA).await?;
                Ok(None)
            }
        }
    }

    /// Clears the login-in-flight flag and notifies, unless a newer
    /// operation owns the state by now.
    async fn clear_loading(&self, ticket: u64) {
        if !self.is_current(ticket) {
            return;
        }
        let mut state = self.state.write().await;
        state.is_loading = false;
        let cleared = state.clone();
        drop(state);
        self.notify(&cleared);
    }

    // =========================================================================
    // Logout
    // =========================================================================

    /// Ends the session. The server call is best-effort; local state and
    /// persisted session keys are cleared unless a newer session operation
    /// completed meanwhile (its state wins). Never fails.
    pub async fn logout(&self) {
        let ticket = self.begin();

        if let Err(err) = self.api.logout().await {
            debug!(%err, "Server-side logout failed, clearing locally anyway");
        }

        // A login that completed while the server call was in flight owns
        // the persisted keys now; a stale logout must not erase them.
        if !self.is_current(ticket) {
            debug!(ticket, "Discarding superseded logout");
            return;
        }

        self.purge_session_keys().await;
        if self
            .commit(ticket, SessionSnapshot::unauthenticated())
            .await
            .is_ok()
        {
            info!("Logged out");
        }
    }

    /// Removes the session keys from the store. Preferences (language,
    /// theme) survive logout.
    async fn purge_session_keys(&self) {
        for key in keys::SESSION_KEYS {
            if let Err(err) = self.store.remove(key).await {
                warn!(key, %err, "Could not remove session key");
            }
        }
    }

    // =========================================================================
    // Token Refresh
    // =========================================================================

    /// Rotates the token pair. On any failure the session is terminated:
    /// a client that cannot refresh is a client whose credentials are gone.
    pub async fn refresh_auth_token(&self) -> ClientResult<String> {
        let refresh_token = match self.store.get(keys::REFRESH_TOKEN).await? {
            Some(token) => token,
            None => {
                warn!("Refresh requested without a refresh token");
                self.logout().await;
                return Err(ClientError::MissingRefreshToken);
            }
        };

        let ticket = self.begin();
        let pair = match self.api.refresh(&refresh_token).await {
            Ok(pair) => pair,
            Err(err) => {
                warn!(%err, "Token refresh failed, ending session");
                self.logout().await;
                return Err(err);
            }
        };

        if !self.is_current(ticket) {
            return Err(ClientError::Superseded);
        }

        self.store.set(keys::AUTH_TOKEN, &pair.token).await?;
        self.store.set(keys::REFRESH_TOKEN, &pair.refresh_token).await?;

        let next = {
            let mut state = self.state.write().await;
            state.token = Some(pair.token.clone());
            state.refresh_token = Some(pair.refresh_token);
            state.clone()
        };
        self.notify(&next);
        debug!("Token pair rotated");
        Ok(pair.token)
    }
}
