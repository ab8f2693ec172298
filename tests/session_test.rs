//! Tests for session state aggregation.

use async_trait::async_trait;
use hive_client::{
    ApiError, AuthError, AuthProvider, AuthUser, Game, GameMeta, GameMoveResponse, GameOptions,
    HiveApi, Navigator, PlayerSession, SessionPhase, StaticAuth, UserData,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::timeout;

/// In-memory stand-in for the Hive server.
#[derive(Default)]
struct FakeApi {
    users: Mutex<HashMap<String, UserData>>,
    games: Mutex<HashMap<String, Vec<Game>>>,
    profile_delays: Mutex<HashMap<String, Duration>>,
    ensure_calls: AtomicUsize,
    get_user_calls: AtomicUsize,
}

impl FakeApi {
    fn with_user(self, user: UserData) -> Self {
        self.users
            .lock()
            .expect("users poisoned")
            .insert(user.uid().clone(), user);
        self
    }

    fn with_games(self, uid: &str, games: Vec<Game>) -> Self {
        self.games
            .lock()
            .expect("games poisoned")
            .insert(uid.to_string(), games);
        self
    }

    fn with_profile_delay(self, uid: &str, delay: Duration) -> Self {
        self.profile_delays
            .lock()
            .expect("delays poisoned")
            .insert(uid.to_string(), delay);
        self
    }

    fn user_count(&self) -> usize {
        self.users.lock().expect("users poisoned").len()
    }

    fn upsert(&self, identity: &AuthUser) -> UserData {
        self.ensure_calls.fetch_add(1, Ordering::SeqCst);
        self.users
            .lock()
            .expect("users poisoned")
            .entry(identity.uid.clone())
            .or_insert_with(|| UserData::new(identity.uid.clone(), String::new()))
            .clone()
    }
}

#[async_trait]
impl HiveApi for FakeApi {
    async fn get_user(&self, uid: &str) -> Result<UserData, ApiError> {
        self.get_user_calls.fetch_add(1, Ordering::SeqCst);
        let delay = self
            .profile_delays
            .lock()
            .expect("delays poisoned")
            .get(uid)
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.users
            .lock()
            .expect("users poisoned")
            .get(uid)
            .cloned()
            .ok_or(ApiError::Http { status: 404 })
    }

    async fn ensure_user(&self, identity: &AuthUser) -> Result<UserData, ApiError> {
        Ok(self.upsert(identity))
    }

    async fn ensure_guest(&self, identity: &AuthUser) -> Result<UserData, ApiError> {
        Ok(self.upsert(identity))
    }

    async fn update_username(&self, uid: &str, username: &str) -> Result<UserData, ApiError> {
        let user = UserData::new(uid.to_string(), username.to_string());
        self.users
            .lock()
            .expect("users poisoned")
            .insert(uid.to_string(), user.clone());
        Ok(user)
    }

    async fn user_games(&self, uid: &str) -> Result<Vec<Game>, ApiError> {
        Ok(self
            .games
            .lock()
            .expect("games poisoned")
            .get(uid)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_game(&self, game: &Game) -> Result<Game, ApiError> {
        Ok(game.clone())
    }

    async fn play_move(&self, _gid: &str, _notation: &str) -> Result<GameMoveResponse, ApiError> {
        Err(ApiError::Http { status: 501 })
    }
}

/// Navigator that records where it was sent.
#[derive(Default)]
struct RecordingNavigator {
    paths: Mutex<Vec<String>>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.paths
            .lock()
            .expect("paths poisoned")
            .push(path.to_string());
    }
}

/// Provider whose sign-out always fails; everything else delegates.
struct FailingSignOutAuth {
    inner: StaticAuth,
}

#[async_trait]
impl AuthProvider for FailingSignOutAuth {
    fn current_user(&self) -> Option<AuthUser> {
        self.inner.current_user()
    }

    async fn id_token(&self) -> Result<String, AuthError> {
        self.inner.id_token().await
    }

    async fn sign_in(&self) -> Result<AuthUser, AuthError> {
        self.inner.sign_in().await
    }

    async fn sign_in_anonymously(&self) -> Result<AuthUser, AuthError> {
        self.inner.sign_in_anonymously().await
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        Err(AuthError::new("provider unavailable"))
    }

    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.inner.subscribe()
    }
}

/// Provider whose interactive sign-in always fails.
struct FailingSignInAuth {
    inner: StaticAuth,
}

#[async_trait]
impl AuthProvider for FailingSignInAuth {
    fn current_user(&self) -> Option<AuthUser> {
        self.inner.current_user()
    }

    async fn id_token(&self) -> Result<String, AuthError> {
        self.inner.id_token().await
    }

    async fn sign_in(&self) -> Result<AuthUser, AuthError> {
        Err(AuthError::new("popup closed"))
    }

    async fn sign_in_anonymously(&self) -> Result<AuthUser, AuthError> {
        self.inner.sign_in_anonymously().await
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.inner.sign_out().await
    }

    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.inner.subscribe()
    }
}

fn game(gid: &str, started: bool, ended: bool) -> Game {
    Game::new(
        gid.to_string(),
        "w".to_string(),
        "b".to_string(),
        String::new(),
        GameOptions::default(),
        GameMeta::new(started, ended),
    )
}

#[tokio::test]
async fn test_guest_sign_in_populates_session() {
    let auth = Arc::new(StaticAuth::new("guest-1", "tok"));
    let api = Arc::new(FakeApi::default().with_games(
        "guest-1",
        vec![
            game("g1", true, false),
            game("g2", true, true),
            game("g3", false, false),
        ],
    ));
    let session = PlayerSession::new(auth, api);

    let user = session.sign_in_as_guest().await.expect("Sign-in failed");
    assert_eq!(user.uid(), "guest-1");

    let snap = session.snapshot();
    assert_eq!(*snap.phase(), SessionPhase::SignedIn);
    assert_eq!(snap.uid().as_deref(), Some("guest-1"));
    assert!(snap.user().is_some());
    // A freshly ensured profile has no username yet.
    assert!(*snap.incomplete_profile());
    assert_eq!(snap.games().active_games().len(), 1);
    assert_eq!(snap.games().completed_games().len(), 1);
    assert_eq!(snap.games().invitations().len(), 1);
}

#[tokio::test]
async fn test_ensure_is_idempotent_across_sign_ins() {
    let auth = Arc::new(StaticAuth::new("u1", "tok"));
    let api = Arc::new(FakeApi::default());
    let session = PlayerSession::new(auth, api.clone());

    let first = session
        .sign_in_with_provider()
        .await
        .expect("First sign-in failed");
    session.sign_out(None).await;
    let second = session
        .sign_in_with_provider()
        .await
        .expect("Second sign-in failed");

    assert_eq!(first.uid(), second.uid());
    assert_eq!(api.user_count(), 1);
    assert_eq!(api.ensure_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_sign_out_clears_everything_and_navigates() {
    let auth = Arc::new(StaticAuth::new("u1", "tok"));
    let api = Arc::new(FakeApi::default().with_games("u1", vec![game("g1", true, false)]));
    let navigator = Arc::new(RecordingNavigator::default());
    let session = PlayerSession::with_navigator(auth, api, navigator.clone());

    session
        .sign_in_with_provider()
        .await
        .expect("Sign-in failed");
    assert!(!session.snapshot().games().is_empty());

    session.sign_out(Some("/home")).await;

    let snap = session.snapshot();
    assert_eq!(*snap.phase(), SessionPhase::SignedOut);
    assert!(snap.uid().is_none());
    assert!(snap.user().is_none());
    assert!(!*snap.incomplete_profile());
    assert!(snap.games().is_empty());
    assert_eq!(
        *navigator.paths.lock().expect("paths poisoned"),
        vec!["/home".to_string()]
    );
}

#[tokio::test]
async fn test_sign_out_failure_is_swallowed() {
    let auth = Arc::new(FailingSignOutAuth {
        inner: StaticAuth::new("u1", "tok"),
    });
    let api = Arc::new(FakeApi::default());
    let session = PlayerSession::new(auth, api);

    session
        .sign_in_with_provider()
        .await
        .expect("Sign-in failed");
    // Provider failure must not escape, and the aggregate clears regardless.
    session.sign_out(None).await;

    let snap = session.snapshot();
    assert_eq!(*snap.phase(), SessionPhase::SignedOut);
    assert!(snap.user().is_none());
}

#[tokio::test]
async fn test_sign_in_error_propagates_and_restores_phase() {
    let auth = Arc::new(FailingSignInAuth {
        inner: StaticAuth::new("u1", "tok"),
    });
    let api = Arc::new(FakeApi::default());
    let session = PlayerSession::new(auth, api);

    let result = session.sign_in_with_provider().await;
    assert!(result.is_err());
    assert_eq!(*session.snapshot().phase(), SessionPhase::SignedOut);
}

#[tokio::test]
async fn test_null_identity_never_fetches_profile() {
    let auth = Arc::new(StaticAuth::new("u1", "tok"));
    let api = Arc::new(FakeApi::default());
    let session = PlayerSession::new(auth, api.clone());

    session.handle_auth_change(None).await;

    assert_eq!(api.get_user_calls.load(Ordering::SeqCst), 0);
    assert!(session.snapshot().user().is_none());
}

#[tokio::test]
async fn test_external_notification_fetches_profile_and_games() {
    let auth = Arc::new(StaticAuth::new("u9", "tok"));
    let api = Arc::new(
        FakeApi::default()
            .with_user(UserData::new("u9".to_string(), "bee".to_string()))
            .with_games("u9", vec![game("g1", true, false)]),
    );
    let session = PlayerSession::new(auth, api);

    session
        .handle_auth_change(Some(AuthUser::registered("u9")))
        .await;

    let snap = session.snapshot();
    assert_eq!(*snap.phase(), SessionPhase::SignedIn);
    assert_eq!(
        snap.user().as_ref().map(|u| u.username().as_str()),
        Some("bee")
    );
    assert!(!*snap.incomplete_profile());
    assert_eq!(snap.games().active_games().len(), 1);
}

#[tokio::test]
async fn test_stale_profile_fetch_discarded() {
    let auth = Arc::new(StaticAuth::new("u1", "tok"));
    let api = Arc::new(
        FakeApi::default()
            .with_user(UserData::new("slow".to_string(), "tortoise".to_string()))
            .with_user(UserData::new("fast".to_string(), "hare".to_string()))
            .with_profile_delay("slow", Duration::from_millis(150)),
    );
    let session = PlayerSession::new(auth, api);

    // The slow identity's fetch is still in flight when the fast identity
    // supersedes it; the late result must be discarded.
    tokio::join!(
        session.handle_auth_change(Some(AuthUser::registered("slow"))),
        async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            session
                .handle_auth_change(Some(AuthUser::registered("fast")))
                .await;
        }
    );

    let snap = session.snapshot();
    assert_eq!(snap.uid().as_deref(), Some("fast"));
    assert_eq!(
        snap.user().as_ref().map(|u| u.username().as_str()),
        Some("hare")
    );
}

#[tokio::test]
async fn test_listener_forwards_notifications_until_unsubscribed() {
    let auth = Arc::new(StaticAuth::new("u1", "tok"));
    let api = Arc::new(FakeApi::default().with_user(UserData::new(
        "u1".to_string(),
        "bee".to_string(),
    )));
    let session = Arc::new(PlayerSession::new(auth.clone(), api));
    let listener = session.listen();
    let mut rx = session.subscribe();

    auth.set_user(Some(AuthUser::registered("u1")));
    timeout(Duration::from_secs(1), async {
        loop {
            rx.changed().await.expect("Snapshot channel closed");
            if rx.borrow_and_update().user().is_some() {
                break;
            }
        }
    })
    .await
    .expect("Profile never applied");

    listener.unsubscribe();
    auth.set_user(None);
    tokio::time::sleep(Duration::from_millis(50)).await;

    // The sign-out notification arrived after teardown, so the session
    // still holds the identity.
    assert_eq!(*session.snapshot().phase(), SessionPhase::SignedIn);
}

#[tokio::test]
async fn test_set_username_completes_profile() {
    let auth = Arc::new(StaticAuth::new("u1", "tok"));
    let api = Arc::new(FakeApi::default());
    let session = PlayerSession::new(auth, api);

    session.sign_in_as_guest().await.expect("Sign-in failed");
    assert!(*session.snapshot().incomplete_profile());

    let user = session.set_username("bee").await.expect("Update failed");
    assert_eq!(user.username(), "bee");

    let snap = session.snapshot();
    assert!(!*snap.incomplete_profile());
    assert_eq!(
        snap.user().as_ref().map(|u| u.username().as_str()),
        Some("bee")
    );
}

#[tokio::test]
async fn test_set_username_requires_identity() {
    let auth = Arc::new(StaticAuth::new("u1", "tok"));
    let api = Arc::new(FakeApi::default());
    let session = PlayerSession::new(auth, api);

    let err = session
        .set_username("bee")
        .await
        .expect_err("Signed-out update should fail");
    assert!(matches!(err, ApiError::AuthenticationRequired));
}
