//! Session state aggregation.
//!
//! [`PlayerSession`] holds the current identity, profile, and categorized
//! game lists, recomputing dependent state whenever the identity or profile
//! changes. Consumers subscribe to immutable snapshots over a watch channel;
//! the aggregate itself is mutated only by the session's own handlers.

use crate::api::HiveApi;
use crate::auth::{AuthProvider, AuthUser};
use crate::error::ApiError;
use crate::game::GameLists;
use crate::user::UserData;
use derive_getters::Getters;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Authentication phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
pub enum SessionPhase {
    /// No identity.
    #[default]
    SignedOut,
    /// A sign-in call is in flight.
    Authenticating,
    /// An identity is active; the profile may still be loading.
    SignedIn,
}

/// Immutable view of the session aggregate.
#[derive(Debug, Clone, Default, Getters)]
pub struct SessionSnapshot {
    /// Authentication phase.
    phase: SessionPhase,
    /// Current identity, if any.
    uid: Option<String>,
    /// Current profile; `None` while signed out or still loading.
    user: Option<UserData>,
    /// Whether the profile exists but has no username yet.
    incomplete_profile: bool,
    /// The user's games, partitioned by lifecycle stage.
    games: GameLists,
}

/// Navigation side effect invoked after sign-out.
pub trait Navigator: Send + Sync {
    /// Navigates the UI to the given path.
    fn navigate(&self, path: &str);
}

/// Navigator that goes nowhere, for headless contexts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, _path: &str) {}
}

struct SessionInner {
    phase: SessionPhase,
    uid: Option<String>,
    user: Option<UserData>,
    games: GameLists,
    /// Bumped on every identity change; in-flight fetches that started under
    /// an older epoch discard their result instead of applying it.
    epoch: u64,
}

impl SessionInner {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            uid: self.uid.clone(),
            user: self.user.clone(),
            incomplete_profile: self
                .user
                .as_ref()
                .map(UserData::incomplete_profile)
                .unwrap_or(false),
            games: self.games.clone(),
        }
    }
}

/// The session state aggregator.
pub struct PlayerSession {
    auth: Arc<dyn AuthProvider>,
    api: Arc<dyn HiveApi>,
    navigator: Arc<dyn Navigator>,
    inner: Mutex<SessionInner>,
    tx: watch::Sender<SessionSnapshot>,
}

impl std::fmt::Debug for PlayerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerSession")
            .field("snapshot", &self.snapshot())
            .finish_non_exhaustive()
    }
}

impl PlayerSession {
    /// Creates a signed-out session over the given collaborators.
    pub fn new(auth: Arc<dyn AuthProvider>, api: Arc<dyn HiveApi>) -> Self {
        Self::with_navigator(auth, api, Arc::new(NoopNavigator))
    }

    /// Creates a session with a navigation side effect for sign-out.
    #[instrument(skip_all)]
    pub fn with_navigator(
        auth: Arc<dyn AuthProvider>,
        api: Arc<dyn HiveApi>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let inner = SessionInner {
            phase: SessionPhase::SignedOut,
            uid: None,
            user: None,
            games: GameLists::default(),
            epoch: 0,
        };
        let (tx, _rx) = watch::channel(inner.snapshot());
        Self {
            auth,
            api,
            navigator,
            inner: Mutex::new(inner),
            tx,
        }
    }

    /// Subscribes to session snapshots.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot()
    }

    /// Signs in through the provider's interactive flow.
    ///
    /// Ensures a persisted profile exists for the identity, transitions to
    /// `SignedIn`, and refreshes the game lists. Errors propagate to the
    /// caller with the phase restored.
    #[instrument(skip(self))]
    pub async fn sign_in_with_provider(&self) -> Result<UserData, ApiError> {
        self.begin_authenticating();
        let identity = match self.auth.sign_in().await {
            Ok(identity) => identity,
            Err(e) => {
                self.abort_sign_in();
                return Err(e.into());
            }
        };
        let user = match self.api.ensure_user(&identity).await {
            Ok(user) => user,
            Err(e) => {
                self.abort_sign_in();
                return Err(e);
            }
        };
        info!(uid = %user.uid(), "Signed in");
        let epoch = self.apply_signed_in(identity.uid, user.clone());
        self.refresh_games(&user, epoch).await;
        Ok(user)
    }

    /// Signs in anonymously as a guest.
    #[instrument(skip(self))]
    pub async fn sign_in_as_guest(&self) -> Result<UserData, ApiError> {
        self.begin_authenticating();
        let identity = match self.auth.sign_in_anonymously().await {
            Ok(identity) => identity,
            Err(e) => {
                self.abort_sign_in();
                return Err(e.into());
            }
        };
        let user = match self.api.ensure_guest(&identity).await {
            Ok(user) => user,
            Err(e) => {
                self.abort_sign_in();
                return Err(e);
            }
        };
        info!(uid = %user.uid(), "Signed in as guest");
        let epoch = self.apply_signed_in(identity.uid, user.clone());
        self.refresh_games(&user, epoch).await;
        Ok(user)
    }

    /// Signs out and optionally navigates to a page.
    ///
    /// Sign-out is best-effort: a provider failure is logged and swallowed,
    /// and the session aggregate is cleared regardless.
    #[instrument(skip(self))]
    pub async fn sign_out(&self, redirect: Option<&str>) {
        if let Err(e) = self.auth.sign_out().await {
            warn!(error = %e, "Provider sign-out failed; clearing session anyway");
        }
        {
            let mut inner = self.lock();
            inner.epoch += 1;
            inner.phase = SessionPhase::SignedOut;
            inner.uid = None;
            inner.user = None;
            inner.games = GameLists::default();
            self.tx.send_replace(inner.snapshot());
        }
        info!("Signed out");
        if let Some(path) = redirect {
            debug!(path, "Redirecting after sign-out");
            self.navigator.navigate(path);
        }
    }

    /// Sets the current user's username, completing the profile.
    #[instrument(skip(self))]
    pub async fn set_username(&self, username: &str) -> Result<UserData, ApiError> {
        let (uid, epoch) = {
            let inner = self.lock();
            match &inner.uid {
                Some(uid) => (uid.clone(), inner.epoch),
                None => return Err(ApiError::AuthenticationRequired),
            }
        };
        let user = self.api.update_username(&uid, username).await?;
        let mut inner = self.lock();
        if inner.epoch == epoch {
            inner.user = Some(user.clone());
            self.tx.send_replace(inner.snapshot());
        }
        Ok(user)
    }

    /// Reconciles an auth-state notification.
    ///
    /// Called for every identity change the provider reports, including ones
    /// not originated by this session's own sign-in and sign-out calls. An
    /// unchanged uid is a no-op; a new identity invalidates in-flight fetches
    /// and triggers a profile refresh; a cleared identity empties the
    /// aggregate. A null identity never issues a profile fetch.
    #[instrument(skip_all, fields(uid = user.as_ref().map(|u| u.uid.as_str()).unwrap_or("<none>")))]
    pub async fn handle_auth_change(&self, user: Option<AuthUser>) {
        let uid = user.map(|u| u.uid);
        let epoch = {
            let mut inner = self.lock();
            if inner.uid == uid {
                debug!("Identity unchanged");
                return;
            }
            inner.epoch += 1;
            inner.uid = uid.clone();
            inner.user = None;
            inner.games = GameLists::default();
            inner.phase = if uid.is_some() {
                SessionPhase::SignedIn
            } else {
                SessionPhase::SignedOut
            };
            self.tx.send_replace(inner.snapshot());
            inner.epoch
        };
        if let Some(uid) = uid {
            self.refresh_profile(&uid, epoch).await;
        }
    }

    /// Spawns a task forwarding the provider's auth-state notifications into
    /// [`PlayerSession::handle_auth_change`].
    ///
    /// The returned guard unsubscribes when dropped.
    pub fn listen(self: &Arc<Self>) -> AuthListener {
        let session = Arc::clone(self);
        let mut rx = self.auth.subscribe();
        let handle = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let user = rx.borrow_and_update().clone();
                session.handle_auth_change(user).await;
            }
            debug!("Auth channel closed; listener exiting");
        });
        AuthListener { handle }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionInner> {
        self.inner.lock().expect("session state poisoned")
    }

    fn begin_authenticating(&self) {
        let mut inner = self.lock();
        inner.phase = SessionPhase::Authenticating;
        self.tx.send_replace(inner.snapshot());
    }

    fn abort_sign_in(&self) {
        let mut inner = self.lock();
        inner.phase = if inner.uid.is_some() {
            SessionPhase::SignedIn
        } else {
            SessionPhase::SignedOut
        };
        self.tx.send_replace(inner.snapshot());
    }

    fn apply_signed_in(&self, uid: String, user: UserData) -> u64 {
        let mut inner = self.lock();
        inner.epoch += 1;
        inner.phase = SessionPhase::SignedIn;
        inner.uid = Some(uid);
        inner.user = Some(user);
        self.tx.send_replace(inner.snapshot());
        inner.epoch
    }

    /// Fetches the profile for a new identity and, if still current, applies
    /// it and refreshes the game lists.
    async fn refresh_profile(&self, uid: &str, epoch: u64) {
        debug!(uid, "Fetching profile");
        match self.api.get_user(uid).await {
            Ok(user) => {
                let applied = {
                    let mut inner = self.lock();
                    if inner.epoch != epoch {
                        debug!(uid, "Discarding stale profile fetch");
                        false
                    } else {
                        inner.user = Some(user.clone());
                        self.tx.send_replace(inner.snapshot());
                        true
                    }
                };
                if applied {
                    self.refresh_games(&user, epoch).await;
                }
            }
            Err(e) => warn!(uid, error = %e, "Profile fetch failed"),
        }
    }

    /// Fetches and partitions the user's games, applying the result only if
    /// the identity has not changed since the fetch started.
    async fn refresh_games(&self, user: &UserData, epoch: u64) {
        match self.api.user_games(user.uid()).await {
            Ok(games) => {
                let lists = GameLists::partition(games);
                let mut inner = self.lock();
                if inner.epoch != epoch {
                    debug!(uid = %user.uid(), "Discarding stale game list fetch");
                    return;
                }
                inner.games = lists;
                self.tx.send_replace(inner.snapshot());
            }
            Err(e) => {
                warn!(uid = %user.uid(), error = %e, "Game list fetch failed; lists unchanged")
            }
        }
    }
}

/// Handle on a running auth-state subscription.
///
/// Dropping the guard (or calling [`AuthListener::unsubscribe`]) stops the
/// forwarding task.
#[derive(Debug)]
pub struct AuthListener {
    handle: JoinHandle<()>,
}

impl AuthListener {
    /// Stops forwarding auth-state notifications.
    pub fn unsubscribe(self) {
        self.handle.abort();
    }
}

impl Drop for AuthListener {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
