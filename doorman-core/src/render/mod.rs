//! The greeting-card pipeline: a background image, an ordered list of text
//! overlays, and a bitmap font to draw them with.

mod compose;
mod font;

use std::path::{Path, PathBuf};

pub use compose::render;
pub use font::{BitmapFont, FontError, FontStore};

/// A single text overlay at a pixel offset on the background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintInstruction {
    x: u32,
    y: u32,
    text: String,
}

impl PrintInstruction {
    /// Overlay `text` with its top-left glyph origin at `(x, y)`.
    pub fn new(x: u32, y: u32, text: impl Into<String>) -> Result<Self, RenderError> {
        let text = text.into();
        if text.is_empty() {
            return Err(RenderError::EmptyOverlayText);
        }
        Ok(Self { x, y, text })
    }

    pub fn x(&self) -> u32 {
        self.x
    }

    pub fn y(&self) -> u32 {
        self.y
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// One card to be generated: a background plus at least one overlay.
///
/// Built per event, consumed by [`render`], then discarded.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    background: PathBuf,
    overlays: Vec<PrintInstruction>,
}

impl RenderRequest {
    pub fn new(
        background: impl Into<PathBuf>,
        overlays: Vec<PrintInstruction>,
    ) -> Result<Self, RenderError> {
        if overlays.is_empty() {
            return Err(RenderError::NoOverlays);
        }
        Ok(Self {
            background: background.into(),
            overlays,
        })
    }

    pub fn background(&self) -> &Path {
        &self.background
    }

    pub fn overlays(&self) -> &[PrintInstruction] {
        &self.overlays
    }
}

/// Rendering errors
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("font is not loaded yet")]
    FontUnavailable,
    #[error("overlay text must not be empty")]
    EmptyOverlayText,
    #[error("a render request needs at least one overlay")]
    NoOverlays,
    #[error("failed to read background image {}: {source}", path.display())]
    Background {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("failed to encode rendered image: {0}")]
    Encode(#[from] image::ImageError),
}
