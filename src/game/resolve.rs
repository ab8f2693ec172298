//! Move consequence resolution.
//!
//! Submitting a move can have derived consequences the caller never spells
//! out: the opponent may be forced to pass, and the game may end. The server
//! applies these authoritatively; this module models the same contract on the
//! client so a doomed submission can be refused before it leaves the process.

use super::{Color, Game, GameOutcome, Move};
use crate::error::{ApiError, RulesError, StalemateError};
use derive_getters::Getters;
use std::collections::HashSet;
use tracing::{debug, instrument, warn};

/// Terminal status of a position as judged by the rules engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionStatus {
    /// The game continues.
    InProgress,
    /// White has won.
    WhiteWins,
    /// Black has won.
    BlackWins,
    /// Neither side can win.
    Draw,
}

/// External move-validation engine.
///
/// The game rules themselves live in a separate library; this trait is the
/// seam it plugs into. Implementations judge positions, enumerate legal
/// moves, and apply notation to a board they own the representation of.
pub trait Rules {
    /// Opaque board state built from a game's notation.
    type Board;

    /// Builds the board a game's notation describes.
    fn build_board(
        &self,
        notation: &str,
        options: &super::GameOptions,
    ) -> Result<Self::Board, RulesError>;

    /// Applies a move (including a pass) to the board.
    fn apply_move(&self, board: &mut Self::Board, mv: &Move) -> Result<(), RulesError>;

    /// Whether the given side has at least one legal move.
    fn can_move(&self, board: &Self::Board, color: Color) -> bool;

    /// Enumerates the legal moves for the given side.
    fn valid_moves(&self, board: &Self::Board, color: Color) -> Vec<Move>;

    /// Judges whether the position ends the game.
    fn position_status(&self, board: &Self::Board) -> PositionStatus;

    /// Canonical encoding of the position.
    ///
    /// Must identify the position alone, not the move history that reached
    /// it; the forced-pass cycle guard relies on repeated positions mapping
    /// to equal keys.
    fn position_key(&self, board: &Self::Board) -> String;
}

/// Outcome of resolving a move locally.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct MoveResolution {
    /// The submitted move followed by any forced passes, applied as one
    /// logical transaction.
    moves: Vec<Move>,
    /// Result if the transaction ends the game.
    outcome: Option<GameOutcome>,
    /// Side to move after the transaction, when the game continues.
    next_to_move: Option<Color>,
}

impl MoveResolution {
    /// Whether the transaction ends the game.
    pub fn ends_game(&self) -> bool {
        self.outcome.is_some()
    }

    /// Number of passes inserted after the submitted move.
    pub fn forced_passes(&self) -> usize {
        self.moves.len() - 1
    }
}

/// Maps a terminal position status to the game's recorded result.
///
/// A winning side resolves to that side's uid; a draw resolves to the draw
/// marker; an in-progress position has no result.
pub fn determine_game_result(game: &Game, status: PositionStatus) -> Option<GameOutcome> {
    match status {
        PositionStatus::WhiteWins => {
            Some(GameOutcome::Winner(game.uid_for(Color::White).to_string()))
        }
        PositionStatus::BlackWins => {
            Some(GameOutcome::Winner(game.uid_for(Color::Black).to_string()))
        }
        PositionStatus::Draw => Some(GameOutcome::Draw),
        PositionStatus::InProgress => None,
    }
}

/// Resolves the consequences of playing a move on a game.
///
/// Applies the move, then repeatedly: if the game has ended, stops with the
/// winner resolved; if the side to move has a legal move, stops with play
/// handed to them; otherwise inserts an automatic pass. The caller never
/// submits a pass for a forced-pass situation.
///
/// # Errors
///
/// Returns [`ApiError::Rules`] when the game is already over or the engine
/// rejects the move, and [`ApiError::Stalemate`] when inserting another pass
/// would revisit a (position, side-to-move) pair — a deadlock with no settled
/// rule, reported rather than auto-resolved.
#[instrument(skip(rules, game), fields(gid = %game.gid(), notation = %mv.notation()))]
pub fn resolve_move<R: Rules>(rules: &R, game: &Game, mv: Move) -> Result<MoveResolution, ApiError> {
    if game.is_ended() {
        return Err(RulesError::new("game has already ended").into());
    }

    let mut board = rules.build_board(game.notation(), game.options())?;
    rules.apply_move(&mut board, &mv)?;

    let mut moves = vec![mv];
    let mut to_move = game.color_turn().opposite();
    let mut visited: HashSet<(String, Color)> = HashSet::new();
    visited.insert((rules.position_key(&board), to_move));

    loop {
        let status = rules.position_status(&board);
        if let Some(outcome) = determine_game_result(game, status) {
            debug!(result = %outcome.as_field(), passes = moves.len() - 1, "Move ends the game");
            return Ok(MoveResolution {
                moves,
                outcome: Some(outcome),
                next_to_move: None,
            });
        }

        if rules.can_move(&board, to_move) {
            debug!(next = %to_move, passes = moves.len() - 1, "Move resolved");
            return Ok(MoveResolution {
                moves,
                outcome: None,
                next_to_move: Some(to_move),
            });
        }

        // No legal move and no game end: the pass is forced.
        let pass = Move::pass();
        rules.apply_move(&mut board, &pass)?;
        moves.push(pass);
        to_move = to_move.opposite();

        let key = (rules.position_key(&board), to_move);
        if !visited.insert(key) {
            warn!("Forced-pass cycle detected, refusing to auto-resolve");
            return Err(StalemateError::new(format!(
                "forced passes revisit the position after {} with {} to move",
                game.notation(),
                to_move
            ))
            .into());
        }
    }
}
