//! Hive client - data access layer for the Hive board game server
//!
//! This library bridges an external authentication provider and the Hive
//! HTTP API into reactive session state for a game UI.
//!
//! # Architecture
//!
//! - **Transport**: JSON-over-HTTP helper attaching the auth token header
//! - **Api**: the server's endpoint surface (profiles, games, moves)
//! - **Game**: game records, list partitioning, and move resolution
//!   (forced passes, end detection, winner assignment)
//! - **Session**: identity, profile, and game lists aggregated behind a
//!   watch channel, reconciled on every auth-state notification
//!
//! # Example
//!
//! ```no_run
//! use hive_client::{ApiClient, ClientConfig, PlayerSession, StaticAuth};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), hive_client::ApiError> {
//! let auth = Arc::new(StaticAuth::new("some-uid", "some-token"));
//! let config = ClientConfig::new("http://localhost:8080");
//! let api = Arc::new(ApiClient::new(config, auth.clone()));
//!
//! let session = Arc::new(PlayerSession::new(auth, api));
//! let _listener = session.listen();
//!
//! let user = session.sign_in_as_guest().await?;
//! println!("signed in as {}", user.uid());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod api;
mod auth;
mod config;
mod error;
mod game;
mod session;
mod transport;
mod user;

// Crate-level exports - Errors
pub use error::{ApiError, AuthError, RulesError, StalemateError};

// Crate-level exports - Configuration
pub use config::{API_URL_VAR, ClientConfig, ConfigError};

// Crate-level exports - Authentication seam
pub use auth::{AuthProvider, AuthUser, StaticAuth};

// Crate-level exports - Transport and endpoint surface
pub use api::HiveApi;
pub use transport::{ApiClient, TOKEN_HEADER};

// Crate-level exports - User profiles
pub use user::UserData;

// Crate-level exports - Games and move resolution
pub use game::{
    Color, DRAW_MARKER, Game, GameLists, GameMeta, GameMoveResponse, GameOptions, GameOutcome,
    Move, MoveResolution, MoveSubmitter, PASS_NOTATION, PositionStatus, Rules,
    determine_game_result, resolve_move,
};

// Crate-level exports - Session aggregation
pub use session::{
    AuthListener, Navigator, NoopNavigator, PlayerSession, SessionPhase, SessionSnapshot,
};
