//! Move submission.

use super::resolve::{MoveResolution, Rules, resolve_move};
use super::{Game, GameMoveResponse, Move};
use crate::api::HiveApi;
use crate::error::ApiError;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Posts moves for a game and models their derived consequences.
///
/// The server applies forced passes and end-of-game updates authoritatively;
/// the submitter runs the same resolution locally first so a submission that
/// would deadlock in forced passes is refused before any network call.
pub struct MoveSubmitter<R: Rules> {
    api: Arc<dyn HiveApi>,
    rules: R,
}

impl<R: Rules> std::fmt::Debug for MoveSubmitter<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoveSubmitter").finish_non_exhaustive()
    }
}

impl<R: Rules> MoveSubmitter<R> {
    /// Creates a submitter over the given API and rules engine.
    pub fn new(api: Arc<dyn HiveApi>, rules: R) -> Self {
        Self { api, rules }
    }

    /// Resolves a move's consequences without submitting it.
    pub fn resolve(&self, game: &Game, mv: Move) -> Result<MoveResolution, ApiError> {
        resolve_move(&self.rules, game, mv)
    }

    /// Lists the legal moves for the side to move, judged locally.
    pub fn valid_moves(&self, game: &Game) -> Result<Vec<Move>, ApiError> {
        let board = self.rules.build_board(game.notation(), game.options())?;
        Ok(self.rules.valid_moves(&board, game.color_turn()))
    }

    /// Plays a move on a game.
    ///
    /// Resolves the move locally (tripping the stalemate guard before any
    /// network I/O), then posts it to the per-game, per-notation endpoint.
    /// Forced passes are never submitted explicitly; the server applies them
    /// as part of the same logical transaction.
    ///
    /// # Errors
    ///
    /// [`ApiError::AuthenticationRequired`] when no user is signed in,
    /// [`ApiError::Http`] when the server rejects the move (illegal,
    /// not-your-turn, stale game version), [`ApiError::Stalemate`] from the
    /// cycle guard, [`ApiError::Rules`] when the engine rejects the move.
    #[instrument(skip(self, game, mv), fields(gid = %game.gid(), notation = %mv.notation()))]
    pub async fn play_move(&self, game: &Game, mv: Move) -> Result<GameMoveResponse, ApiError> {
        let resolution = self.resolve(game, mv.clone())?;
        if resolution.ends_game() {
            debug!(passes = resolution.forced_passes(), "Move will end the game");
        }

        let response = self.api.play_move(game.gid(), mv.notation()).await?;
        info!(
            ended = response.game().is_ended(),
            valid_next_moves = response.valid_next_moves().len(),
            "Move accepted"
        );
        Ok(response)
    }
}
