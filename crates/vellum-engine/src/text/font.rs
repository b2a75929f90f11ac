use std::fmt;

use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};
use ttf_parser::{Face, GlyphId, OutlineBuilder};

use crate::coords::Vec2;
use crate::geometry::Path;

use super::{Glyph, GlyphRun, Typeface};

/// Error returned by [`FontdueTypeface::from_bytes`].
#[derive(Debug, Clone)]
pub struct FontLoadError(pub String);

impl fmt::Display for FontLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "font load error: {}", self.0)
    }
}

impl std::error::Error for FontLoadError {}

/// [`Typeface`] laid out by `fontdue`, with glyph outlines read by
/// `ttf-parser`.
///
/// Outlines keep the font's quadratic and cubic curves, so text stays
/// smooth under any transform.
pub struct FontdueTypeface {
    font: fontdue::Font,
    data: Vec<u8>,
    units_per_em: f32,
}

impl FontdueTypeface {
    /// Parses a TrueType or OpenType font from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FontLoadError> {
        let face = Face::parse(bytes, 0).map_err(|e| FontLoadError(e.to_string()))?;
        let units_per_em = face.units_per_em() as f32;
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| FontLoadError(e.to_string()))?;
        log::debug!("loaded font {:?} ({} glyphs, {units_per_em} units/em)", font.name(), font.glyph_count());
        Ok(Self { font, data: bytes.to_vec(), units_per_em })
    }

    #[inline]
    pub fn font(&self) -> &fontdue::Font {
        &self.font
    }

    /// Outline of glyph `id` at `size` pixels per em, origin on the
    /// baseline, +Y down. Glyphs without contours (spaces) are empty.
    pub fn glyph_path(&self, id: u16, size: f32) -> Path {
        match Face::parse(&self.data, 0) {
            Ok(face) => glyph_path(&face, id, size / self.units_per_em),
            Err(e) => {
                log::warn!("font data no longer parses: {e}");
                Path::new()
            }
        }
    }
}

impl fmt::Debug for FontdueTypeface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontdueTypeface")
            .field("name", &self.font.name())
            .field("glyphs", &self.font.glyph_count())
            .field("units_per_em", &self.units_per_em)
            .finish()
    }
}

impl Typeface for FontdueTypeface {
    fn shape(&self, text: &str, size: f32) -> GlyphRun {
        let mut layout: Layout<()> = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings::default());
        layout.append(&[&self.font], &TextStyle::new(text, size, 0));

        let face = Face::parse(&self.data, 0).ok();
        let scale = size / self.units_per_em;
        let mut run = GlyphRun::default();
        for g in layout.glyphs() {
            let metrics = self.font.metrics_indexed(g.key.glyph_index, size);
            // Pen position, as opposed to the bitmap's left edge.
            let pen = g.x - metrics.xmin as f32;
            let path = face
                .as_ref()
                .map_or_else(Path::new, |f| glyph_path(f, g.key.glyph_index, scale));
            run.advance = run.advance.max(pen + metrics.advance_width);
            run.glyphs.push(Glyph {
                id: g.key.glyph_index,
                offset: Vec2::new(pen, 0.0),
                advance: metrics.advance_width,
                path,
            });
        }
        log::trace!("shaped {} glyphs at {size}px", run.glyphs.len());
        run
    }
}

fn glyph_path(face: &Face<'_>, id: u16, scale: f32) -> Path {
    let mut builder = GlyphPathBuilder::new(scale);
    if face.outline_glyph(GlyphId(id), &mut builder).is_none() {
        return Path::new();
    }
    builder.finish()
}

/// Collects a ttf-parser outline into a [`Path`], scaled from font units
/// to pixels with the Y axis flipped to point down.
struct GlyphPathBuilder {
    path: Path,
    scale: f32,
}

impl GlyphPathBuilder {
    fn new(scale: f32) -> Self {
        Self { path: Path::new(), scale }
    }

    #[inline]
    fn x(&self, x: f32) -> f32 {
        x * self.scale
    }

    #[inline]
    fn y(&self, y: f32) -> f32 {
        -y * self.scale
    }

    fn finish(self) -> Path {
        self.path
    }
}

impl OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = (self.x(x), self.y(y));
        self.path.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = (self.x(x), self.y(y));
        self.path.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1, x, y) = (self.x(x1), self.y(y1), self.x(x), self.y(y));
        self.path.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1, x2, y2, x, y) = (self.x(x1), self.y(y1), self.x(x2), self.y(y2), self.x(x), self.y(y));
        self.path.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.path.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;
    use crate::geometry::PathVerb;

    #[test]
    fn garbage_bytes_fail_to_load() {
        let err = FontdueTypeface::from_bytes(b"not a font").unwrap_err();
        assert!(err.to_string().starts_with("font load error"));
    }

    /// Drives the builder the way `Face::outline_glyph` does for an "o":
    /// an outer TrueType quad contour and an inner cubic one, in font units
    /// with +Y up.
    fn letter_o(scale: f32) -> Path {
        let mut b = GlyphPathBuilder::new(scale);
        b.move_to(500.0, 0.0);
        b.quad_to(1000.0, 0.0, 1000.0, 500.0);
        b.quad_to(1000.0, 1000.0, 500.0, 1000.0);
        b.quad_to(0.0, 1000.0, 0.0, 500.0);
        b.quad_to(0.0, 0.0, 500.0, 0.0);
        b.close();
        b.move_to(500.0, 200.0);
        b.curve_to(300.0, 200.0, 200.0, 300.0, 200.0, 500.0);
        b.line_to(800.0, 500.0);
        b.curve_to(800.0, 300.0, 700.0, 200.0, 500.0, 200.0);
        b.close();
        b.finish()
    }

    #[test]
    fn glyph_outline_keeps_curves() {
        let path = letter_o(0.01);
        let count = |verb| path.verbs().iter().filter(|v| **v == verb).count();
        assert_eq!(count(PathVerb::Move), 2);
        assert_eq!(count(PathVerb::Quad), 4);
        assert_eq!(count(PathVerb::Cubic), 2);
        assert_eq!(count(PathVerb::Close), 2);
    }

    #[test]
    fn glyph_outline_is_scaled_and_flipped() {
        let path = letter_o(0.02);
        // Font units grow upward; the glyph sits above the baseline at y = 0.
        assert_eq!(path.bounds(), Some(Rect::from_ltrb(0.0, -20.0, 20.0, 0.0)));
        assert!(path.points()[0].approx_eq(Vec2::new(10.0, 0.0), 1e-5));
        assert!(path.points()[1].approx_eq(Vec2::new(20.0, 0.0), 1e-5));
    }
}
