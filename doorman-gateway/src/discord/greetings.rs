//! The greeting-card flows: member joined, member left, and the `generator`
//! demo command all feed the same render-and-post pipeline.

use std::path::Path;
use std::sync::Arc;

use doorman_core::render::{self, PrintInstruction, RenderError, RenderRequest};
use serenity::all::{ChannelId, ChannelType, Context, GuildChannel, GuildId, Member, Permissions, User};
use tracing::{error, warn};

use crate::state::AppState;

use super::permissions::{allows, bot_permissions_in};
use super::send;

/// Card layout, kept from the earliest greeting cards.
const LEFT_PADDING: u32 = 50;
const TOP_PADDING: u32 = 250;
const ROW_SPACING: u32 = 130;

/// Identity used by the `generator` demo command.
pub(super) const PLACEHOLDER_TAG: &str = "noob#0000";

const FAREWELL_LINE: &str = "We hope to see you soon!";

const WELCOME_FILENAME: &str = "welcome.png";
const GOODBYE_FILENAME: &str = "goodbye.png";

/// Capabilities needed to post a greeting card into a channel.
const GREETING_PERMISSIONS: Permissions =
    Permissions::SEND_MESSAGES.union(Permissions::ATTACH_FILES);

fn member_count_line(count: u64) -> String {
    format!("You are the {count}th member!")
}

/// Two-row card layout: who at row 0, the dynamic or static line at row 1.
fn card_overlays(name: &str, second_line: &str) -> Result<Vec<PrintInstruction>, RenderError> {
    Ok(vec![
        PrintInstruction::new(LEFT_PADDING, TOP_PADDING, name)?,
        PrintInstruction::new(LEFT_PADDING, TOP_PADDING + ROW_SPACING, second_line)?,
    ])
}

/// What one card needs beyond the target channel.
struct Card<'a> {
    background: &'a Path,
    filename: &'a str,
    name: &'a str,
    second_line: &'a str,
    fallback: &'a str,
}

struct GuildSnapshot {
    channel: GuildChannel,
    member_count: u64,
}

/// Look up the configured greetings channel and the guild member count in
/// one cache pass.
fn greetings_channel(ctx: &Context, guild_id: GuildId, name: &str) -> Option<GuildSnapshot> {
    let guild = ctx.cache.guild(guild_id)?;
    let channel = guild
        .channels
        .values()
        .find(|c| c.kind == ChannelType::Text && c.name == name)
        .cloned()?;
    Some(GuildSnapshot {
        channel,
        member_count: guild.member_count,
    })
}

pub(super) fn guild_member_count(ctx: &Context, guild_id: GuildId) -> u64 {
    ctx.cache
        .guild(guild_id)
        .map(|guild| guild.member_count)
        .unwrap_or(0)
}

/// Run the compose pipeline off the event loop; background decoding and PNG
/// encoding are blocking work. Returns `None` (and logs) on any failure.
async fn render_card(state: &Arc<AppState>, request: RenderRequest) -> Option<Vec<u8>> {
    let state = Arc::clone(state);
    match tokio::task::spawn_blocking(move || render::render(&request, &state.fonts)).await {
        Ok(Ok(png)) => Some(png),
        Ok(Err(e)) => {
            warn!("Card render failed: {e}");
            None
        }
        Err(e) => {
            warn!("Card render task failed: {e}");
            None
        }
    }
}

/// Render a card and post it; on render failure post the plain-text fallback
/// instead so the event never goes unacknowledged.
async fn post_card(state: &Arc<AppState>, ctx: &Context, channel_id: ChannelId, card: Card<'_>) {
    let overlays = match card_overlays(card.name, card.second_line) {
        Ok(overlays) => overlays,
        Err(e) => {
            error!("Invalid card overlays: {e}");
            return;
        }
    };
    let request = match RenderRequest::new(card.background, overlays) {
        Ok(request) => request,
        Err(e) => {
            error!("Invalid render request: {e}");
            return;
        }
    };

    match render_card(state, request).await {
        Some(png) => send::send_png(ctx, channel_id, png, card.filename).await,
        None => send::send_text(ctx, channel_id, card.fallback).await,
    }
}

pub(super) async fn handle_member_joined(state: &Arc<AppState>, ctx: &Context, member: &Member) {
    let Some(snapshot) = greetings_channel(ctx, member.guild_id, &state.config.greetings_channel)
    else {
        warn!(
            "No text channel named \"{}\" in guild {}",
            state.config.greetings_channel, member.guild_id
        );
        return;
    };

    let Some(granted) = bot_permissions_in(ctx, &snapshot.channel).await else {
        return;
    };
    if !allows(granted, GREETING_PERMISSIONS) {
        warn!(
            "Missing send/attach permissions in #{}, skipping welcome card",
            snapshot.channel.name
        );
        return;
    }

    let tag = member.user.tag();
    let second_line = member_count_line(snapshot.member_count);
    let fallback = format!("Welcome, {tag}! (your greeting card got lost on the way)");
    post_card(
        state,
        ctx,
        snapshot.channel.id,
        Card {
            background: &state.config.welcome_background,
            filename: WELCOME_FILENAME,
            name: &tag,
            second_line: &second_line,
            fallback: &fallback,
        },
    )
    .await;
}

pub(super) async fn handle_member_left(
    state: &Arc<AppState>,
    ctx: &Context,
    guild_id: GuildId,
    user: &User,
) {
    let Some(snapshot) = greetings_channel(ctx, guild_id, &state.config.greetings_channel) else {
        warn!(
            "No text channel named \"{}\" in guild {}",
            state.config.greetings_channel, guild_id
        );
        return;
    };

    let Some(granted) = bot_permissions_in(ctx, &snapshot.channel).await else {
        return;
    };
    if !allows(granted, GREETING_PERMISSIONS) {
        warn!(
            "Missing send/attach permissions in #{}, skipping goodbye card",
            snapshot.channel.name
        );
        return;
    }

    let tag = user.tag();
    let fallback = format!("Goodbye, {tag}! {FAREWELL_LINE}");
    post_card(
        state,
        ctx,
        snapshot.channel.id,
        Card {
            background: &state.config.goodbye_background,
            filename: GOODBYE_FILENAME,
            name: &tag,
            second_line: FAREWELL_LINE,
            fallback: &fallback,
        },
    )
    .await;
}

/// The `generator` command: the join-card pipeline with placeholder
/// identity, posted into the invoking channel.
pub(super) async fn handle_generator(
    state: &Arc<AppState>,
    ctx: &Context,
    channel_id: ChannelId,
    member_count: u64,
) {
    let second_line = member_count_line(member_count);
    post_card(
        state,
        ctx,
        channel_id,
        Card {
            background: &state.config.goodbye_background,
            filename: GOODBYE_FILENAME,
            name: PLACEHOLDER_TAG,
            second_line: &second_line,
            fallback: "The card generator is jammed, try again later.",
        },
    )
    .await;
}
