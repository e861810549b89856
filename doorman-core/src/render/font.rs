//! AngelCode-style bitmap fonts: a text descriptor of glyph metrics plus one
//! or more pre-rendered glyph page images.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use image::{RgbaImage, imageops};

/// Metrics and page location for one glyph.
#[derive(Debug, Clone, Copy)]
struct Glyph {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    x_offset: i32,
    y_offset: i32,
    x_advance: i32,
    page: usize,
}

/// A decoded bitmap font, ready to blit text onto a canvas.
#[derive(Debug)]
pub struct BitmapFont {
    line_height: u32,
    glyphs: HashMap<char, Glyph>,
    pages: Vec<RgbaImage>,
}

/// Font loading errors
#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("failed to read font descriptor {}: {source}", path.display())]
    Descriptor {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed font descriptor line: {0}")]
    Malformed(String),
    #[error("failed to decode glyph page {}: {source}", path.display())]
    Page {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("font descriptor defines no glyph pages")]
    NoPages,
}

impl BitmapFont {
    /// Parse a descriptor file and decode its glyph pages (resolved relative
    /// to the descriptor's directory).
    pub fn load(path: &Path) -> Result<Self, FontError> {
        let descriptor = fs::read_to_string(path).map_err(|source| FontError::Descriptor {
            path: path.to_path_buf(),
            source,
        })?;
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::parse(&descriptor, dir)
    }

    fn parse(descriptor: &str, dir: &Path) -> Result<Self, FontError> {
        let mut line_height = 0;
        let mut page_files: Vec<(usize, PathBuf)> = Vec::new();
        let mut glyphs = HashMap::new();

        for line in descriptor.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (tag, fields) = split_fields(line);
            match tag {
                "common" => {
                    line_height = field_u32(&fields, "lineHeight").unwrap_or(0);
                }
                "page" => {
                    let id = field_u32(&fields, "id")
                        .map(|id| id as usize)
                        .unwrap_or(page_files.len());
                    let file = fields
                        .get("file")
                        .ok_or_else(|| FontError::Malformed(line.to_string()))?;
                    page_files.push((id, dir.join(file)));
                }
                "char" => {
                    let id = field_u32(&fields, "id")
                        .ok_or_else(|| FontError::Malformed(line.to_string()))?;
                    // Descriptors may carry ids outside the char range; skip them.
                    let Some(ch) = char::from_u32(id) else {
                        continue;
                    };
                    let width = field_u32(&fields, "width").unwrap_or(0);
                    glyphs.insert(
                        ch,
                        Glyph {
                            x: field_u32(&fields, "x").unwrap_or(0),
                            y: field_u32(&fields, "y").unwrap_or(0),
                            width,
                            height: field_u32(&fields, "height").unwrap_or(0),
                            x_offset: field_i32(&fields, "xoffset").unwrap_or(0),
                            y_offset: field_i32(&fields, "yoffset").unwrap_or(0),
                            x_advance: field_i32(&fields, "xadvance").unwrap_or(width as i32),
                            page: field_u32(&fields, "page").unwrap_or(0) as usize,
                        },
                    );
                }
                // info, chars, kerning data are layout hints this renderer
                // does not use
                _ => {}
            }
        }

        if page_files.is_empty() {
            return Err(FontError::NoPages);
        }
        page_files.sort_by_key(|(id, _)| *id);

        let mut pages = Vec::with_capacity(page_files.len());
        for (_, file) in page_files {
            let page = image::open(&file)
                .map_err(|source| FontError::Page {
                    path: file.clone(),
                    source,
                })?
                .to_rgba8();
            pages.push(page);
        }

        Ok(Self {
            line_height,
            glyphs,
            pages,
        })
    }

    pub fn line_height(&self) -> u32 {
        self.line_height
    }

    /// Blit `text` onto `canvas` with the caret starting at `(x, y)`.
    ///
    /// Glyphs are alpha-blended and clipped at the canvas edge; the caret
    /// advances by each glyph's `xadvance`. Characters without a glyph are
    /// skipped.
    pub fn print(&self, canvas: &mut RgbaImage, x: u32, y: u32, text: &str) {
        let mut caret = i64::from(x);
        for ch in text.chars() {
            let Some(glyph) = self.glyphs.get(&ch) else {
                continue;
            };
            if glyph.width > 0 && glyph.height > 0 {
                if let Some(page) = self.pages.get(glyph.page) {
                    let sprite = imageops::crop_imm(page, glyph.x, glyph.y, glyph.width, glyph.height);
                    imageops::overlay(
                        canvas,
                        &sprite,
                        caret + i64::from(glyph.x_offset),
                        i64::from(y) + i64::from(glyph.y_offset),
                    );
                }
            }
            caret += i64::from(glyph.x_advance);
        }
    }
}

/// Process-wide slot for the lazily loaded overlay font.
///
/// The slot starts empty, is replaced wholesale on (re)load, and readers
/// re-check it at use time instead of caching the handle across awaits.
#[derive(Debug, Default)]
pub struct FontStore {
    slot: RwLock<Option<Arc<BitmapFont>>>,
}

impl FontStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&self, font: BitmapFont) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(font));
    }

    /// The current font, or `None` while no load has succeeded yet.
    pub fn get(&self) -> Option<Arc<BitmapFont>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Split a descriptor line into its tag and `key=value` fields.
/// Values may be double-quoted ("Arial Black") and are returned unquoted.
fn split_fields(line: &str) -> (&str, HashMap<String, String>) {
    let (tag, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let mut fields = HashMap::new();
    let mut rest = rest.trim_start();
    while !rest.is_empty() {
        let Some(eq) = rest.find('=') else {
            break;
        };
        let key = rest[..eq].trim().to_string();
        let after = &rest[eq + 1..];
        let (value, remainder) = if let Some(quoted) = after.strip_prefix('"') {
            match quoted.find('"') {
                Some(end) => (quoted[..end].to_string(), &quoted[end + 1..]),
                None => (quoted.to_string(), ""),
            }
        } else {
            match after.find(char::is_whitespace) {
                Some(end) => (after[..end].to_string(), &after[end..]),
                None => (after.to_string(), ""),
            }
        };
        fields.insert(key, value);
        rest = remainder.trim_start();
    }
    (tag, fields)
}

fn field_u32(fields: &HashMap<String, String>, key: &str) -> Option<u32> {
    fields.get(key)?.parse().ok()
}

fn field_i32(fields: &HashMap<String, String>, key: &str) -> Option<i32> {
    fields.get(key)?.parse().ok()
}
