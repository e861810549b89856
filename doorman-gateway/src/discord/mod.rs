mod bot;
mod commands;
mod greetings;
mod permissions;
mod send;

use std::sync::Arc;

use serenity::prelude::*;
use tracing::info;

use crate::state::AppState;

pub use bot::Bot;

/// Discord-related errors
#[derive(Debug, thiserror::Error)]
pub enum DiscordError {
    #[error("Failed to create Discord client: {0}")]
    Client(String),
}

/// Build the Discord client with the [`Bot`] handler attached.
///
/// Member-join/leave events need the privileged `GUILD_MEMBERS` intent; the
/// command surface needs `MESSAGE_CONTENT`.
pub async fn start(token: &str, state: Arc<AppState>) -> Result<Client, DiscordError> {
    info!("Starting Discord client...");

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let bot = Bot::new(state);

    let client = Client::builder(token, intents)
        .event_handler(bot)
        .await
        .map_err(|e| DiscordError::Client(e.to_string()))?;

    Ok(client)
}
