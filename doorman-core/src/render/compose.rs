use std::io::Cursor;

use image::ImageFormat;

use super::font::FontStore;
use super::{RenderError, RenderRequest};

/// Compose a greeting card: decode the background, print each overlay in
/// order, and encode the result as a PNG held in memory.
///
/// Overlays are drawn in request order, so a later overlay may cover an
/// earlier one. Fails with [`RenderError::FontUnavailable`] until a font has
/// been installed in `fonts`; the font is looked up at call time, never
/// cached by the caller.
pub fn render(request: &RenderRequest, fonts: &FontStore) -> Result<Vec<u8>, RenderError> {
    let font = fonts.get().ok_or(RenderError::FontUnavailable)?;

    let background =
        image::open(request.background()).map_err(|source| RenderError::Background {
            path: request.background().to_path_buf(),
            source,
        })?;
    let mut canvas = background.to_rgba8();

    for overlay in request.overlays() {
        font.print(&mut canvas, overlay.x(), overlay.y(), overlay.text());
    }

    let mut buffer = Cursor::new(Vec::new());
    canvas.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::super::fixtures::{GREEN, RED, write_background, write_font};
    use super::super::{BitmapFont, PrintInstruction};
    use super::*;

    fn loaded_store(dir: &std::path::Path) -> FontStore {
        let store = FontStore::new();
        store.install(BitmapFont::load(&write_font(dir)).unwrap());
        store
    }

    fn request(background: impl Into<std::path::PathBuf>) -> RenderRequest {
        RenderRequest::new(
            background,
            vec![
                PrintInstruction::new(2, 2, "A").unwrap(),
                PrintInstruction::new(2, 20, "AB").unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn render_before_any_font_load_fails() {
        let dir = tempdir().unwrap();
        let background = write_background(dir.path(), 64, 48);
        let result = render(&request(background), &FontStore::new());
        assert!(matches!(result, Err(RenderError::FontUnavailable)));
    }

    #[test]
    fn render_produces_png_with_background_dimensions() {
        let dir = tempdir().unwrap();
        let background = write_background(dir.path(), 64, 48);
        let store = loaded_store(dir.path());

        let png = render(&request(background), &store).unwrap();
        assert_eq!(&png[..4], b"\x89PNG");

        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (64, 48));
    }

    #[test]
    fn render_overlays_text_onto_background() {
        let dir = tempdir().unwrap();
        let background = write_background(dir.path(), 64, 48);
        let store = loaded_store(dir.path());

        let png = render(&request(background), &store).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        // Glyph pixels replaced the background, the rest is untouched
        assert_eq!(*decoded.get_pixel(2, 2), RED);
        assert_eq!(*decoded.get_pixel(2, 20), RED);
        assert_eq!(*decoded.get_pixel(40, 40), GREEN);
    }

    #[test]
    fn unreadable_background_fails() {
        let dir = tempdir().unwrap();
        let store = loaded_store(dir.path());
        let result = render(&request(dir.path().join("missing.png")), &store);
        assert!(matches!(result, Err(RenderError::Background { .. })));
    }
}
