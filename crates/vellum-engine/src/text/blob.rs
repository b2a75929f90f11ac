use crate::coords::{Matrix, Rect};
use crate::error::{Error, Result};
use crate::geometry::Path;
use crate::paint::Paint;
use crate::resource::{Handle, Resource};

use super::Glyph;

/// Immutable shaped text, positioned relative to a baseline origin.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlobData {
    glyphs: Vec<Glyph>,
    advance: f32,
    bounds: Option<Rect>,
}

impl Resource for TextBlobData {
    const KIND: &'static str = "text blob";
}

impl TextBlobData {
    fn new(glyphs: Vec<Glyph>, advance: f32) -> Self {
        let bounds = glyphs
            .iter()
            .filter_map(|g| g.path.bounds().map(|b| b.translated(g.offset.x, g.offset.y)))
            .reduce(Rect::union);
        Self { glyphs, advance, bounds }
    }

    #[inline]
    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    #[inline]
    pub fn advance(&self) -> f32 {
        self.advance
    }

    /// Union of the glyph outlines' bounds; `None` for blank text.
    #[inline]
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    /// All glyph outlines as one path, with the baseline origin at `(x, y)`.
    pub fn to_path(&self, x: f32, y: f32) -> Path {
        let mut out = Path::new();
        for g in &self.glyphs {
            if g.path.is_empty() {
                continue;
            }
            let m = Matrix::translate(x + g.offset.x, y + g.offset.y);
            out.add_path(&g.path.transformed(&m));
        }
        out
    }
}

pub type TextBlob = Handle<TextBlobData>;

/// Shapes text with a paint's typeface and text size.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextBlobBuilder;

impl TextBlobBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Fails with `InvalidArgument` when the paint has no typeface or a text
    /// size that is not a positive finite number.
    pub fn build_text_blob(&self, text: &str, paint: &Paint) -> Result<TextBlob> {
        let typeface = paint.typeface().ok_or_else(|| Error::invalid("paint has no typeface"))?;
        let size = paint.text_size();
        if !(size.is_finite() && size > 0.0) {
            return Err(Error::invalid(format!("text size must be positive, got {size}")));
        }
        let run = typeface.shape(text, size);
        log::trace!("text blob: {} glyphs, advance {}", run.glyphs.len(), run.advance);
        Ok(Handle::new(TextBlobData::new(run.glyphs, run.advance)))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::coords::Vec2;
    use crate::geometry::PathDirection;
    use crate::text::{GlyphRun, Typeface};

    /// Every non-space character is a square of half the text size sitting
    /// on the baseline; advances are 0.6 of the size.
    #[derive(Debug)]
    pub(crate) struct BoxTypeface;

    impl Typeface for BoxTypeface {
        fn shape(&self, text: &str, size: f32) -> GlyphRun {
            let advance = size * 0.6;
            let mut run = GlyphRun::default();
            for (i, ch) in text.chars().enumerate() {
                let path = if ch == ' ' {
                    Path::new()
                } else {
                    Path::rect(Rect::new(0.0, -size * 0.5, size * 0.5, size * 0.5), PathDirection::Cw)
                };
                run.glyphs.push(Glyph { id: ch as u16, offset: Vec2::new(i as f32 * advance, 0.0), advance, path });
            }
            run.advance = text.chars().count() as f32 * advance;
            run
        }
    }

    pub(crate) fn box_paint(size: f32) -> Paint {
        let mut p = Paint::new();
        p.set_typeface(Some(Arc::new(BoxTypeface)));
        p.set_text_size(size);
        p
    }

    // ── building ─────────────────────────────────────────────────────────

    #[test]
    fn needs_a_typeface() {
        let err = TextBlobBuilder::new().build_text_blob("hi", &Paint::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn shapes_with_paint_size() {
        let blob = TextBlobBuilder::new().build_text_blob("ab c", &box_paint(20.0)).unwrap();
        let data = blob.get().unwrap();
        assert_eq!(data.glyphs().len(), 4);
        assert_eq!(data.advance(), 48.0);
        assert_eq!(data.bounds(), Some(Rect::from_ltrb(0.0, -10.0, 46.0, 0.0)));
    }

    #[test]
    fn blank_text_has_no_bounds() {
        let blob = TextBlobBuilder::new().build_text_blob("  ", &box_paint(20.0)).unwrap();
        assert_eq!(blob.get().unwrap().bounds(), None);
        assert!(blob.get().unwrap().to_path(0.0, 0.0).is_empty());
    }

    // ── placement ────────────────────────────────────────────────────────

    #[test]
    fn path_sits_on_baseline() {
        let blob = TextBlobBuilder::new().build_text_blob("ab", &box_paint(20.0)).unwrap();
        let path = blob.get().unwrap().to_path(100.0, 50.0);
        assert_eq!(path.bounds(), Some(Rect::from_ltrb(100.0, 40.0, 122.0, 50.0)));
    }

    #[test]
    fn released_blob_is_rejected() {
        let blob = TextBlobBuilder::new().build_text_blob("a", &box_paint(20.0)).unwrap();
        blob.release();
        assert!(matches!(blob.get(), Err(Error::UseAfterRelease("text blob"))));
    }
}
