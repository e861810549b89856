//! The prefix command surface: `!ping` and `!generator`.

use std::sync::Arc;

use serenity::all::{ChannelType, Context, GuildChannel, GuildId, Message, Permissions};
use tracing::warn;

use crate::state::AppState;

use super::greetings;
use super::permissions::{allows, bot_permissions_in};
use super::send;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum BotCommand {
    Ping,
    Generator,
}

/// Match the first whitespace-delimited token after the prefix,
/// case-insensitively. Anything unrecognized is no command at all.
pub(super) fn parse_command(content: &str, prefix: &str) -> Option<BotCommand> {
    let rest = content.strip_prefix(prefix)?;
    let token = rest.split_whitespace().next()?;
    match token.to_lowercase().as_str() {
        "ping" => Some(BotCommand::Ping),
        "generator" => Some(BotCommand::Generator),
        _ => None,
    }
}

fn message_channel(ctx: &Context, guild_id: GuildId, msg: &Message) -> Option<GuildChannel> {
    let guild = ctx.cache.guild(guild_id)?;
    guild.channels.get(&msg.channel_id).cloned()
}

pub(super) async fn handle_message(state: &Arc<AppState>, ctx: &Context, msg: Message) {
    if msg.author.bot {
        return;
    }
    let Some(guild_id) = msg.guild_id else {
        return;
    };
    let Some(command) = parse_command(&msg.content, &state.config.command_prefix) else {
        return;
    };

    let Some(channel) = message_channel(ctx, guild_id, &msg) else {
        return;
    };
    if channel.kind != ChannelType::Text {
        return;
    }
    let Some(granted) = bot_permissions_in(ctx, &channel).await else {
        return;
    };
    if !allows(granted, Permissions::SEND_MESSAGES) {
        return;
    }

    match command {
        BotCommand::Ping => {
            if let Err(e) = msg.reply(ctx, "Pong!").await {
                warn!("Failed to reply to ping: {e}");
            }
        }
        BotCommand::Generator => {
            if !allows(granted, Permissions::ATTACH_FILES) {
                send::send_text(
                    ctx,
                    msg.channel_id,
                    "I need the Attach Files permission here to run the generator.",
                )
                .await;
                return;
            }
            let member_count = greetings::guild_member_count(ctx, guild_id);
            greetings::handle_generator(state, ctx, msg.channel_id, member_count).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_match_case_insensitively() {
        assert_eq!(parse_command("!ping", "!"), Some(BotCommand::Ping));
        assert_eq!(parse_command("!PING", "!"), Some(BotCommand::Ping));
        assert_eq!(parse_command("!Generator", "!"), Some(BotCommand::Generator));
    }

    #[test]
    fn only_the_first_token_selects_the_command() {
        assert_eq!(
            parse_command("!PING extra text", "!"),
            Some(BotCommand::Ping)
        );
        assert_eq!(
            parse_command("!generator now please", "!"),
            Some(BotCommand::Generator)
        );
        assert_eq!(parse_command("!pingpong", "!"), None);
    }

    #[test]
    fn missing_prefix_or_unknown_token_is_ignored() {
        assert_eq!(parse_command("ping", "!"), None);
        assert_eq!(parse_command("!help", "!"), None);
        assert_eq!(parse_command("!", "!"), None);
        assert_eq!(parse_command("", "!"), None);
    }

    #[test]
    fn custom_prefixes_are_honored() {
        assert_eq!(parse_command("?ping", "?"), Some(BotCommand::Ping));
        assert_eq!(parse_command("!ping", "?"), None);
    }
}
