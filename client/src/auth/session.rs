//! The session store: single source of truth for "who is authenticated".
//!
//! One owned store instance is shared across the component tree; every read
//! of the current user goes through it, and every mutation happens inside it,
//! so all subscribers observe the same value. Identity is made durable across
//! reloads by persisting the bearer credential through `CredentialStorage`.

use crate::api::{ApiClient, AuthApi};
use crate::auth::models::{Credential, LoginRequest, User};
use crate::errors::{ClientResult, Error};
use crate::storage::CredentialStorage;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{debug, warn};
use validator::Validate;

/// Authentication lifecycle of the client process.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    /// No credential and no user; the normal logged-out state.
    #[default]
    Anonymous,
    /// A credential exists and identity resolution is in flight.
    Resolving,
    /// Identity resolved; the embedded user is current.
    Authenticated(User),
}

impl SessionState {
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

struct SessionInner {
    api: Arc<dyn AuthApi>,
    storage: Box<dyn CredentialStorage>,
    state: watch::Sender<SessionState>,
    /// Bumped whenever the session restarts (login, logout, expiry); an
    /// in-flight identity resolution only applies its result if the epoch it
    /// started under is still current.
    epoch: AtomicU64,
}

/// Single owner of the live session.
///
/// Cheap to clone; clones share one underlying state. Screens read the
/// current user through `current_user()` or react to transitions through
/// `subscribe()`; they never mutate session state directly.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

impl SessionStore {
    /// Wires a store to the shared API client and installs the global
    /// unauthorized interceptor: any request the server rejects as
    /// unauthenticated drops the session back to anonymous.
    pub fn new(api: Arc<ApiClient>, storage: Box<dyn CredentialStorage>) -> Self {
        let store = Self::with_collaborators(api.clone(), storage);
        let weak = Arc::downgrade(&store.inner);
        api.set_unauthorized_hook(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.expire();
            }
        }));
        store
    }

    /// Wires a store to any identity collaborator. Installing an
    /// unauthorized interceptor is the caller's responsibility.
    pub fn with_collaborators(
        api: Arc<dyn AuthApi>,
        storage: Box<dyn CredentialStorage>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Anonymous);
        SessionStore {
            inner: Arc::new(SessionInner {
                api,
                storage,
                state,
                epoch: AtomicU64::new(0),
            }),
        }
    }

    /// Restores a persisted session at application start.
    ///
    /// No stored credential is the normal logged-out state, not a failure. A
    /// stored credential the server rejects is removed and the store settles
    /// anonymous; that failure is swallowed here because its only visible
    /// effect is "user must log in".
    pub async fn restore(&self) -> ClientResult<()> {
        let credential = match self.inner.storage.load() {
            Ok(Some(credential)) => credential,
            Ok(None) => {
                debug!("no stored credential; starting anonymous");
                return Ok(());
            }
            Err(err) => {
                warn!("credential store unreadable, starting anonymous: {err}");
                return Ok(());
            }
        };

        let epoch = self.inner.begin_resolving(&credential);
        match self.inner.api.fetch_current_user().await {
            Ok(user) => {
                debug!(username = %user.username, "restored session");
                self.inner.complete(epoch, user);
            }
            Err(err) => {
                debug!("stored credential rejected: {err}");
                self.inner.abandon(epoch);
            }
        }
        Ok(())
    }

    /// Exchanges credentials for a bearer token, persists it, and resolves
    /// the identity behind it. Returns the resolved user.
    ///
    /// Every failure mode, from rejected credentials to an unreachable auth
    /// endpoint to a failed identity lookup, surfaces as
    /// `Error::Authentication` with no partial session state retained. The
    /// login screen shows one generic message either way.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        tenant_id: i64,
    ) -> ClientResult<User> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
            tenant_id,
        };

        if let Err(validation_errors) = request.validate() {
            let error_messages: Vec<String> = validation_errors
                .field_errors()
                .into_iter()
                .flat_map(|(field, errors)| {
                    errors.iter().map(move |error| {
                        format!(
                            "{}: {}",
                            field,
                            error.message.as_ref().unwrap_or(&"Invalid value".into())
                        )
                    })
                })
                .collect();
            return Err(Error::validation(error_messages.join(", ")));
        }

        // Invalidate any resolution still in flight from restore()
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);

        let credential = self.inner.api.exchange_credentials(&request).await?;

        // A persist failure costs reload survival, not the login itself
        if let Err(err) = self.inner.storage.save(&credential) {
            warn!("credential not persisted; session will not survive a reload: {err}");
        }

        let epoch = self.inner.begin_resolving(&credential);
        match self.inner.api.fetch_current_user().await {
            Ok(user) => {
                if self.inner.complete(epoch, user.clone()) {
                    debug!(username = %user.username, "login succeeded");
                    Ok(user)
                } else {
                    Err(Error::authentication(
                        "login superseded by a concurrent session change",
                    ))
                }
            }
            Err(err) => {
                self.inner.abandon(epoch);
                Err(Error::authentication(format!(
                    "identity resolution failed after login: {err}"
                )))
            }
        }
    }

    /// Replaces the current user with a fresher record, e.g. after a profile
    /// edit returns the updated principal. Subscribers observe the new value
    /// immediately.
    pub fn set_user(&self, user: User) {
        if user.role.is_none() {
            warn!(
                username = %user.username,
                "user carries no role; all permission checks will deny"
            );
        }
        self.inner
            .state
            .send_replace(SessionState::Authenticated(user));
    }

    /// Synchronous read of the current user, `None` while anonymous or
    /// resolving.
    pub fn current_user(&self) -> Option<User> {
        self.inner.state.borrow().user().cloned()
    }

    /// Reactive view of the session lifecycle; await `changed()` on the
    /// receiver to observe transitions.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Best-effort local teardown: storage cleared, header detached, state
    /// anonymous. Always succeeds from the caller's perspective; no server
    /// round trip is involved.
    pub fn logout(&self) {
        debug!("logging out");
        self.inner.reset();
    }
}

impl SessionInner {
    /// Attaches the credential and enters `Resolving`; returns the epoch the
    /// caller must present to apply the outcome.
    fn begin_resolving(&self, credential: &Credential) -> u64 {
        self.api.set_bearer(credential);
        self.state.send_replace(SessionState::Resolving);
        self.epoch.load(Ordering::SeqCst)
    }

    /// Publishes the resolved user unless the session restarted while the
    /// lookup was in flight. A stale response must not resurrect a user
    /// after logout.
    fn complete(&self, epoch: u64, user: User) -> bool {
        if self.epoch.load(Ordering::SeqCst) != epoch {
            debug!("discarding stale identity resolution");
            return false;
        }
        self.state.send_replace(SessionState::Authenticated(user));
        true
    }

    /// Rolls a failed resolution back to anonymous, dropping the stored
    /// credential and the attached header with it.
    fn abandon(&self, epoch: u64) {
        if self.epoch.load(Ordering::SeqCst) != epoch {
            return;
        }
        self.reset();
    }

    /// Entry point for the global 401 interceptor: a bearer the server stops
    /// accepting silently returns the session to anonymous.
    fn expire(&self) {
        if matches!(*self.state.borrow(), SessionState::Anonymous) {
            return;
        }
        warn!("credential rejected by the API; returning to anonymous");
        self.reset();
    }

    fn reset(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        if let Err(err) = self.storage.clear() {
            warn!("failed to clear stored credential: {err}");
        }
        self.api.clear_bearer();
        self.state.send_replace(SessionState::Anonymous);
    }
}
