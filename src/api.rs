//! Remote operations exposed by the Hive server.

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::game::{Game, GameMoveResponse};
use crate::transport::ApiClient;
use crate::user::UserData;
use async_trait::async_trait;
use tracing::{info, instrument};

/// The server's endpoint surface.
///
/// Consumed as `Arc<dyn HiveApi>` so callers can substitute a fake in tests.
#[async_trait]
pub trait HiveApi: Send + Sync {
    /// Fetches a user profile by uid.
    async fn get_user(&self, uid: &str) -> Result<UserData, ApiError>;

    /// Idempotent profile upsert for a fully authenticated identity.
    ///
    /// Creates a profile with an empty username if none exists; otherwise
    /// returns the existing one.
    async fn ensure_user(&self, identity: &AuthUser) -> Result<UserData, ApiError>;

    /// Idempotent profile upsert for a guest identity.
    ///
    /// Same contract as [`HiveApi::ensure_user`] through the guest creation
    /// path; the server enforces any guest-specific constraints.
    async fn ensure_guest(&self, identity: &AuthUser) -> Result<UserData, ApiError>;

    /// Sets the user's username, completing the profile.
    async fn update_username(&self, uid: &str, username: &str) -> Result<UserData, ApiError>;

    /// Fetches the user's full game set.
    async fn user_games(&self, uid: &str) -> Result<Vec<Game>, ApiError>;

    /// Creates a new game.
    async fn create_game(&self, game: &Game) -> Result<Game, ApiError>;

    /// Submits a move for a game and returns the authoritative result.
    async fn play_move(&self, gid: &str, notation: &str) -> Result<GameMoveResponse, ApiError>;
}

#[async_trait]
impl HiveApi for ApiClient {
    #[instrument(skip(self))]
    async fn get_user(&self, uid: &str) -> Result<UserData, ApiError> {
        self.get_json(&format!("/api/user/{}", uid), false).await
    }

    #[instrument(skip_all, fields(uid = %identity.uid))]
    async fn ensure_user(&self, identity: &AuthUser) -> Result<UserData, ApiError> {
        let user = self
            .post_json(
                "/api/user",
                &serde_json::json!({ "uid": identity.uid }),
                true,
            )
            .await?;
        info!(uid = %identity.uid, "Ensured user profile");
        Ok(user)
    }

    #[instrument(skip_all, fields(uid = %identity.uid))]
    async fn ensure_guest(&self, identity: &AuthUser) -> Result<UserData, ApiError> {
        let user = self
            .post_json(
                "/api/user/guest",
                &serde_json::json!({ "uid": identity.uid }),
                true,
            )
            .await?;
        info!(uid = %identity.uid, "Ensured guest profile");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn update_username(&self, uid: &str, username: &str) -> Result<UserData, ApiError> {
        self.post_json(
            &format!("/api/user/{}/username", uid),
            &serde_json::json!({ "username": username }),
            true,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn user_games(&self, uid: &str) -> Result<Vec<Game>, ApiError> {
        self.get_json(&format!("/api/user/{}/games", uid), false)
            .await
    }

    #[instrument(skip_all, fields(gid = %game.gid()))]
    async fn create_game(&self, game: &Game) -> Result<Game, ApiError> {
        self.post_json("/api/game", game, false).await
    }

    #[instrument(skip(self))]
    async fn play_move(&self, gid: &str, notation: &str) -> Result<GameMoveResponse, ApiError> {
        self.post_json(
            &format!("/api/board/{}/move/{}", gid, notation),
            &serde_json::json!({}),
            true,
        )
        .await
    }
}
