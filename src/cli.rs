//! Command-line interface for the Hive client.

use clap::{Parser, Subcommand};

/// Hive client - poke a Hive server from the terminal
#[derive(Parser, Debug)]
#[command(name = "hive_client")]
#[command(about = "Data-access client for the Hive board game server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Server base URL; falls back to the HIVE_API_URL environment variable
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch a user profile
    User {
        /// Uid of the profile to fetch
        uid: String,
    },

    /// Fetch a user's games, partitioned into invitations/active/completed
    Games {
        /// Uid whose games to list
        uid: String,
    },

    /// Submit a move for a game
    Play {
        /// Game id
        gid: String,

        /// Move notation
        notation: String,

        /// Uid to authenticate as
        #[arg(long)]
        uid: String,

        /// Bearer token for the X-Firebase-Token header
        #[arg(long)]
        token: String,
    },

    /// Create a new game
    Create {
        /// Uid of the player with the white pieces
        #[arg(long)]
        white: String,

        /// Uid of the player with the black pieces
        #[arg(long)]
        black: String,

        /// Tournament opening rule
        #[arg(long)]
        tournament: bool,

        /// Ladybug expansion piece
        #[arg(long)]
        ladybug: bool,

        /// Mosquito expansion piece
        #[arg(long)]
        mosquito: bool,

        /// Pillbug expansion piece
        #[arg(long)]
        pillbug: bool,
    },
}
