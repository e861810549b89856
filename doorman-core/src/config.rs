use std::env;
use std::path::PathBuf;

/// Load .env file if it exists (called automatically when using `from_env`)
pub fn load_dotenv() {
    // Silently ignore errors (file might not exist)
    let _ = dotenvy::dotenv();
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Discord bot token
    pub discord_token: String,
    /// Name of the text channel greeting cards are posted to (default: greetings)
    pub greetings_channel: String,
    /// Prefix that marks a message as a command (default: !)
    pub command_prefix: String,
    /// Background image for member-join cards
    pub welcome_background: PathBuf,
    /// Background image for member-leave cards
    pub goodbye_background: PathBuf,
    /// Bitmap font descriptor used for card text overlays
    pub font_path: PathBuf,
    /// Whether a panic requests a graceful exit with a non-zero code (default: true)
    pub exit_on_panic: bool,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// This function automatically loads a .env file from the project root if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();

        Self::from_env_inner()
    }

    /// Internal method to load from env without loading .env
    fn from_env_inner() -> Result<Self, ConfigError> {
        let discord_token = env::var("DISCORD_BOT_TOKEN")
            .map_err(|_| ConfigError::MissingVar("DISCORD_BOT_TOKEN".to_string()))?;

        Ok(Self {
            discord_token,
            greetings_channel: env::var("DOORMAN_GREETINGS_CHANNEL")
                .unwrap_or_else(|_| "greetings".to_string()),
            command_prefix: env::var("DOORMAN_COMMAND_PREFIX").unwrap_or_else(|_| "!".to_string()),
            welcome_background: env::var("DOORMAN_WELCOME_BACKGROUND")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("assets/backgrounds/welcome.png")),
            goodbye_background: env::var("DOORMAN_GOODBYE_BACKGROUND")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("assets/backgrounds/goodbye.png")),
            font_path: env::var("DOORMAN_FONT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("assets/fonts/overlay.fnt")),
            exit_on_panic: env::var("DOORMAN_EXIT_ON_PANIC")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_VARS: &[&str] = &[
        "DISCORD_BOT_TOKEN",
        "DOORMAN_GREETINGS_CHANNEL",
        "DOORMAN_COMMAND_PREFIX",
        "DOORMAN_WELCOME_BACKGROUND",
        "DOORMAN_GOODBYE_BACKGROUND",
        "DOORMAN_FONT",
        "DOORMAN_EXIT_ON_PANIC",
    ];

    // Env mutation is process-global, so missing/default/custom are exercised
    // in one sequential test rather than three racing ones.
    #[test]
    fn config_from_environment() {
        unsafe {
            for var in ALL_VARS {
                env::remove_var(var);
            }
        }

        let result = Config::from_env_inner();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("DISCORD_BOT_TOKEN")
        );

        unsafe {
            env::set_var("DISCORD_BOT_TOKEN", "test-token");
        }

        let config = Config::from_env_inner().unwrap();
        assert_eq!(config.discord_token, "test-token");
        assert_eq!(config.greetings_channel, "greetings");
        assert_eq!(config.command_prefix, "!");
        assert_eq!(
            config.welcome_background,
            PathBuf::from("assets/backgrounds/welcome.png")
        );
        assert_eq!(
            config.goodbye_background,
            PathBuf::from("assets/backgrounds/goodbye.png")
        );
        assert_eq!(config.font_path, PathBuf::from("assets/fonts/overlay.fnt"));
        assert!(config.exit_on_panic);

        unsafe {
            env::set_var("DOORMAN_GREETINGS_CHANNEL", "lobby");
            env::set_var("DOORMAN_COMMAND_PREFIX", "?");
            env::set_var("DOORMAN_WELCOME_BACKGROUND", "art/in.png");
            env::set_var("DOORMAN_GOODBYE_BACKGROUND", "art/out.png");
            env::set_var("DOORMAN_FONT", "art/pixel.fnt");
            env::set_var("DOORMAN_EXIT_ON_PANIC", "false");
        }

        let config = Config::from_env_inner().unwrap();
        assert_eq!(config.greetings_channel, "lobby");
        assert_eq!(config.command_prefix, "?");
        assert_eq!(config.welcome_background, PathBuf::from("art/in.png"));
        assert_eq!(config.goodbye_background, PathBuf::from("art/out.png"));
        assert_eq!(config.font_path, PathBuf::from("art/pixel.fnt"));
        assert!(!config.exit_on_panic);

        // Unparsable boolean falls back to the default
        unsafe {
            env::set_var("DOORMAN_EXIT_ON_PANIC", "maybe");
        }
        assert!(Config::from_env_inner().unwrap().exit_on_panic);

        unsafe {
            for var in ALL_VARS {
                env::remove_var(var);
            }
        }
    }
}
