//! Game records, moves, and derived game logic.

mod lists;
mod play;
mod resolve;

pub use lists::GameLists;
pub use play::MoveSubmitter;
pub use resolve::{MoveResolution, PositionStatus, Rules, determine_game_result, resolve_move};

use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};

/// Notation of the automatic pass move.
pub const PASS_NOTATION: &str = "pass";

/// Marker stored in a game result when neither side wins.
pub const DRAW_MARKER: &str = "draw";

/// Which side a player controls. White moves first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Color {
    /// The side that opens the game.
    White,
    /// The side that moves second.
    Black,
}

impl Color {
    /// Returns the other side.
    pub fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }
}

/// Rule options a game was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Getters, new)]
#[serde(rename_all = "camelCase")]
pub struct GameOptions {
    /// Tournament opening rule (no queen on the first move).
    tournament: bool,
    /// Ladybug expansion piece in play.
    ladybug: bool,
    /// Mosquito expansion piece in play.
    mosquito: bool,
    /// Pillbug expansion piece in play.
    pillbug: bool,
}

/// Result recorded on a finished game: the winner's uid, or a draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameOutcome {
    /// The given uid won.
    Winner(String),
    /// Neither side won.
    Draw,
}

impl GameOutcome {
    /// The string stored in the game record's result field.
    ///
    /// A draw is stored as [`DRAW_MARKER`]; anything else is a uid. Servers
    /// therefore never assign the marker string as a user id.
    pub fn as_field(&self) -> &str {
        match self {
            Self::Winner(uid) => uid,
            Self::Draw => DRAW_MARKER,
        }
    }

    /// Parses the stored result field.
    pub fn from_field(field: &str) -> Self {
        if field == DRAW_MARKER {
            Self::Draw
        } else {
            Self::Winner(field.to_string())
        }
    }
}

impl Serialize for GameOutcome {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_field())
    }
}

impl<'de> Deserialize<'de> for GameOutcome {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let field = String::deserialize(deserializer)?;
        Ok(Self::from_field(&field))
    }
}

/// Status metadata on a game record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct GameMeta {
    is_started: bool,
    is_ended: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[new(default)]
    result: Option<GameOutcome>,
}

impl GameMeta {
    /// Whether both players have joined and play has begun.
    pub fn is_started(&self) -> bool {
        self.is_started
    }

    /// Whether the game is over.
    pub fn is_ended(&self) -> bool {
        self.is_ended
    }

    /// Result of a finished game, if recorded.
    pub fn result(&self) -> Option<&GameOutcome> {
        self.result.as_ref()
    }
}

/// A game record.
///
/// Owned by the server; the client holds read-only snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, new)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    /// Server-assigned game id.
    gid: String,
    /// Uid of the player with the white pieces.
    white_uid: String,
    /// Uid of the player with the black pieces.
    black_uid: String,
    /// Semicolon-separated move history.
    notation: String,
    /// Rule options the game was created with.
    options: GameOptions,
    /// Status metadata.
    meta: GameMeta,
}

impl Game {
    /// Whether both players have joined and play has begun.
    pub fn is_started(&self) -> bool {
        self.meta.is_started()
    }

    /// Whether the game is over.
    pub fn is_ended(&self) -> bool {
        self.meta.is_ended()
    }

    /// Number of moves played so far.
    pub fn move_count(&self) -> usize {
        self.notation.split(';').filter(|m| !m.is_empty()).count()
    }

    /// Side to move, derived from the move count. White moves first.
    pub fn color_turn(&self) -> Color {
        if self.move_count() % 2 == 0 {
            Color::White
        } else {
            Color::Black
        }
    }

    /// Uid of the player controlling the given side.
    pub fn uid_for(&self, color: Color) -> &str {
        match color {
            Color::White => &self.white_uid,
            Color::Black => &self.black_uid,
        }
    }
}

/// A single move to submit: a notation string naming the action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
#[serde(rename_all = "camelCase")]
pub struct Move {
    /// Move notation, e.g. `wA1 bQ-` or [`PASS_NOTATION`].
    notation: String,
}

impl Move {
    /// The automatic pass move.
    pub fn pass() -> Self {
        Self::new(PASS_NOTATION.to_string())
    }

    /// Whether this move is a pass.
    pub fn is_pass(&self) -> bool {
        self.notation == PASS_NOTATION
    }
}

/// Server response to a submitted move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, new)]
#[serde(rename_all = "camelCase")]
pub struct GameMoveResponse {
    /// The updated game record.
    game: Game,
    /// Legal moves in the resulting position; empty iff the game has ended.
    valid_next_moves: Vec<Move>,
}
