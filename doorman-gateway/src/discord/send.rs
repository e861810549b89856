use serenity::all::{ChannelId, Context, CreateAttachment, CreateMessage};
use tracing::warn;

/// Send a rendered PNG as an attachment. Send failures are logged, not
/// propagated; there is nothing left to do for the event at that point.
pub(super) async fn send_png(ctx: &Context, channel_id: ChannelId, png: Vec<u8>, filename: &str) {
    let message = CreateMessage::new().add_file(CreateAttachment::bytes(png, filename));
    if let Err(e) = channel_id.send_message(&ctx.http, message).await {
        warn!("Failed to send {filename} to channel {channel_id}: {e}");
    }
}

/// Send a plain-text notice.
pub(super) async fn send_text(ctx: &Context, channel_id: ChannelId, content: &str) {
    let message = CreateMessage::new().content(content);
    if let Err(e) = channel_id.send_message(&ctx.http, message).await {
        warn!("Failed to send message to channel {channel_id}: {e}");
    }
}
