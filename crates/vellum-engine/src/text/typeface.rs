use std::fmt;

use crate::coords::Vec2;
use crate::geometry::Path;

/// One shaped glyph.
///
/// `path` is the outline relative to the glyph's pen position on the
/// baseline, y pointing down; `offset` is that pen position relative to
/// the start of the run.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub id: u16,
    pub offset: Vec2,
    pub advance: f32,
    pub path: Path,
}

/// Glyphs produced by [`Typeface::shape`], in visual order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlyphRun {
    pub glyphs: Vec<Glyph>,
    /// Pen advance of the whole run.
    pub advance: f32,
}

impl GlyphRun {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// Font backend: turns text into positioned glyph outlines.
///
/// Implementations must be deterministic for a given `(text, size)`.
pub trait Typeface: Send + Sync + fmt::Debug {
    fn shape(&self, text: &str, size: f32) -> GlyphRun;
}
