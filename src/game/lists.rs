//! Categorized game lists.

use super::Game;
use derive_getters::Getters;
use serde::Serialize;
use tracing::{debug, instrument};

/// A user's games, partitioned by lifecycle stage.
///
/// Every game lands in exactly one list: games that have not started are
/// invitations whatever their other flags say, started games split on
/// whether they have ended.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Getters)]
pub struct GameLists {
    /// Games awaiting acceptance.
    invitations: Vec<Game>,
    /// Games in progress.
    active_games: Vec<Game>,
    /// Finished games.
    completed_games: Vec<Game>,
}

impl GameLists {
    /// Partitions a user's full game set.
    #[instrument(skip(games), fields(count = games.len()))]
    pub fn partition(games: Vec<Game>) -> Self {
        let mut lists = Self::default();
        for game in games {
            match (game.is_started(), game.is_ended()) {
                (false, _) => lists.invitations.push(game),
                (true, false) => lists.active_games.push(game),
                (true, true) => lists.completed_games.push(game),
            }
        }
        debug!(
            invitations = lists.invitations.len(),
            active = lists.active_games.len(),
            completed = lists.completed_games.len(),
            "Partitioned games"
        );
        lists
    }

    /// Total number of games across all three lists.
    pub fn len(&self) -> usize {
        self.invitations.len() + self.active_games.len() + self.completed_games.len()
    }

    /// Whether all three lists are empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
