//! Hive client - command-line utility
//!
//! Fetches profiles and game lists, submits moves, and creates games against
//! a running Hive server.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use hive_client::{
    ApiClient, AuthProvider, ClientConfig, Game, GameLists, GameMeta, GameOptions, HiveApi,
    StaticAuth,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match &cli.api_url {
        Some(url) => ClientConfig::new(url.clone()),
        None => ClientConfig::from_env()?,
    };

    match cli.command {
        Command::User { uid } => {
            let api = anonymous_client(config);
            let user = api.get_user(&uid).await?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        Command::Games { uid } => {
            let api = anonymous_client(config);
            let games = api.user_games(&uid).await?;
            let lists = GameLists::partition(games);
            info!(total = lists.len(), "Fetched games");
            println!("{}", serde_json::to_string_pretty(&lists)?);
        }
        Command::Play {
            gid,
            notation,
            uid,
            token,
        } => {
            let auth = Arc::new(StaticAuth::new(uid, token));
            auth.sign_in().await?;
            let api = ApiClient::new(config, auth);
            let response = api.play_move(&gid, &notation).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Create {
            white,
            black,
            tournament,
            ladybug,
            mosquito,
            pillbug,
        } => {
            let api = anonymous_client(config);
            let game = Game::new(
                String::new(),
                white,
                black,
                String::new(),
                GameOptions::new(tournament, ladybug, mosquito, pillbug),
                GameMeta::new(false, false),
            );
            let created = api.create_game(&game).await?;
            println!("{}", serde_json::to_string_pretty(&created)?);
        }
    }

    Ok(())
}

/// Builds a client with no usable identity, for unauthenticated endpoints.
fn anonymous_client(config: ClientConfig) -> ApiClient {
    ApiClient::new(config, Arc::new(StaticAuth::new("", "")))
}
