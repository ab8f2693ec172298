//! Error types for the data-access layer.

use derive_more::{Display, Error};

/// Errors surfaced by the client to its callers.
#[derive(Debug, Display, Error)]
pub enum ApiError {
    /// An authenticated call was attempted while no user is signed in.
    #[display("user not logged in")]
    AuthenticationRequired,

    /// The server answered with a non-success status code.
    #[display("unsuccessful response code {status}")]
    Http {
        /// HTTP status code returned by the server.
        status: u16,
    },

    /// The forced-pass cycle guard refused to auto-resolve a position.
    #[display("{_0}")]
    Stalemate(#[error(source)] StalemateError),

    /// The authentication provider failed.
    #[display("{_0}")]
    Auth(#[error(source)] AuthError),

    /// The move-validation engine rejected a move or a game record.
    #[display("{_0}")]
    Rules(#[error(source)] RulesError),

    /// The HTTP request itself failed before a response was received.
    #[display("request failed: {_0}")]
    Request(#[error(source)] reqwest::Error),
}

impl From<StalemateError> for ApiError {
    fn from(err: StalemateError) -> Self {
        Self::Stalemate(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self::Auth(err)
    }
}

impl From<RulesError> for ApiError {
    fn from(err: RulesError) -> Self {
        Self::Rules(err)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(err)
    }
}

/// Authentication provider error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Auth error: {} at {}:{}", message, file, line)]
pub struct AuthError {
    /// Error message.
    pub message: String,
    /// Line number where the error occurred.
    pub line: u32,
    /// Source file where the error occurred.
    pub file: &'static str,
}

impl AuthError {
    /// Creates a new authentication error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Move-validation engine error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Rules error: {} at {}:{}", message, file, line)]
pub struct RulesError {
    /// Error message.
    pub message: String,
    /// Line number where the error occurred.
    pub line: u32,
    /// Source file where the error occurred.
    pub file: &'static str,
}

impl RulesError {
    /// Creates a new rules error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Raised when resolving a move would pass forever without ending the game.
///
/// Deadlocked positions have no settled rule; the guard reports them instead
/// of spinning.
#[derive(Debug, Clone, Display, Error)]
#[display("this move ends the game in a stalemate; please notify the developers, \
           you have stumbled upon a very unique case ({} at {}:{})", message, file, line)]
pub struct StalemateError {
    /// Description of the repeated position.
    pub message: String,
    /// Line number where the guard tripped.
    pub line: u32,
    /// Source file where the guard tripped.
    pub file: &'static str,
}

impl StalemateError {
    /// Creates a new stalemate guard error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
