use doorman_core::config::Config;
use doorman_core::render::FontStore;

use crate::lifecycle::Lifecycle;

/// Shared application state
pub struct AppState {
    /// Loaded configuration
    pub config: Config,
    /// Slot for the overlay font, populated by the font loader task
    pub fonts: FontStore,
    /// Shutdown flags and exit coordination
    pub lifecycle: Lifecycle,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            fonts: FontStore::new(),
            lifecycle: Lifecycle::new(),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        discord_token: "test-token".to_string(),
        greetings_channel: "greetings".to_string(),
        command_prefix: "!".to_string(),
        welcome_background: "assets/backgrounds/welcome.png".into(),
        goodbye_background: "assets/backgrounds/goodbye.png".into(),
        font_path: "assets/fonts/overlay.fnt".into(),
        exit_on_panic: true,
    }
}
