use std::sync::Arc;

use serenity::all::{ActivityData, Context, EventHandler, GuildId, Member, Message, Ready, User};
use serenity::async_trait;
use tracing::info;

use crate::font_loader;
use crate::state::AppState;

use super::{commands, greetings};

/// Discord event handler
///
/// Event callbacks delegate to the flow functions in `greetings` and
/// `commands`; everything shared lives in [`AppState`].
pub struct Bot {
    pub(super) state: Arc<AppState>,
}

impl Bot {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl EventHandler for Bot {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("Logged in as {}", ready.user.tag());
        ctx.set_activity(Some(ActivityData::watching("everything.")));

        let path = self.state.config.font_path.clone();
        tokio::spawn(font_loader::run(path, Arc::clone(&self.state)));
    }

    async fn guild_member_addition(&self, ctx: Context, new_member: Member) {
        greetings::handle_member_joined(&self.state, &ctx, &new_member).await;
    }

    async fn guild_member_removal(
        &self,
        ctx: Context,
        guild_id: GuildId,
        user: User,
        _member_data_if_available: Option<Member>,
    ) {
        greetings::handle_member_left(&self.state, &ctx, guild_id, &user).await;
    }

    async fn message(&self, ctx: Context, msg: Message) {
        commands::handle_message(&self.state, &ctx, msg).await;
    }
}
