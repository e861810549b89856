pub mod config;
pub mod render;

pub use config::{Config, ConfigError, load_dotenv};
pub use render::{
    BitmapFont, FontError, FontStore, PrintInstruction, RenderError, RenderRequest,
};
