use serenity::all::{Context, GuildChannel, Permissions};
use tracing::warn;

/// True when `granted` covers `required`. Administrators implicitly hold
/// every capability.
pub(super) fn allows(granted: Permissions, required: Permissions) -> bool {
    granted.administrator() || granted.contains(required)
}

/// Resolve the bot's effective permissions in a guild channel.
///
/// Returns `None` when the guild is not cached or the bot's own member
/// cannot be fetched; callers treat that as not allowed.
pub(super) async fn bot_permissions_in(ctx: &Context, channel: &GuildChannel) -> Option<Permissions> {
    let bot_id = ctx.cache.current_user().id;

    let member = match channel.guild_id.member(ctx, bot_id).await {
        Ok(member) => member,
        Err(e) => {
            warn!(
                "Failed to fetch own member in guild {}: {e}",
                channel.guild_id
            );
            return None;
        }
    };

    let guild = ctx.cache.guild(channel.guild_id)?;
    Some(guild.user_permissions_in(channel, &member))
}
