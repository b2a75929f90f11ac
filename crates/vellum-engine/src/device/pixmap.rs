use std::fmt;

use anyhow::Context;
use tiny_skia::{Mask, PixmapPaint, PixmapRef, PremultipliedColorU8, Transform};

use crate::error::{Error, Result};
use crate::paint::{BlendMode, Color, Color4f};

/// Premultiplied RGBA8 pixel grid, row-major from the top-left corner.
///
/// Backed by a `tiny_skia::Pixmap`, which also does the compositing and
/// PNG encoding.
#[derive(Clone)]
pub struct Pixmap {
    inner: tiny_skia::Pixmap,
}

impl Pixmap {
    /// A `width x height` pixmap filled with `fill`, or `None` for an empty
    /// or oversized area.
    pub fn new(width: u32, height: u32, fill: Color) -> Option<Self> {
        let mut inner = tiny_skia::Pixmap::new(width, height)?;
        inner.fill(to_skia_color(fill));
        Some(Self { inner })
    }

    /// Copies straight-alpha RGBA bytes, four per pixel.
    pub fn from_rgba8(width: u32, height: u32, data: &[u8]) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(Error::invalid(format!(
                "{width}x{height} RGBA image needs {expected} bytes, got {}",
                data.len()
            )));
        }
        let mut inner = tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| Error::invalid(format!("cannot allocate a {width}x{height} image")))?;
        for (dst, src) in inner.pixels_mut().iter_mut().zip(data.chunks_exact(4)) {
            *dst = tiny_skia::ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
        }
        Ok(Self { inner })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    pub fn fill(&mut self, color: Color) {
        self.inner.fill(to_skia_color(color));
    }

    /// Straight 8-bit color at `(x, y)`, or `None` out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let c = self.inner.pixel(x, y)?.demultiply();
        Some(Color::from_argb(c.alpha(), c.red(), c.green(), c.blue()))
    }

    pub fn encode_png(&self) -> anyhow::Result<Vec<u8>> {
        self.inner.encode_png().context("encoding pixmap as PNG")
    }

    pub fn save_png(&self, path: impl AsRef<std::path::Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        self.inner
            .save_png(path)
            .with_context(|| format!("writing {}", path.display()))
    }

    /// Draws `src` with its top-left corner at `(x, y)`, scaled per pixel by
    /// `mask`, which must match this pixmap's size.
    pub(crate) fn composite(&mut self, x: i32, y: i32, src: PixmapRef<'_>, mode: BlendMode, mask: &Mask) {
        let paint = PixmapPaint { blend_mode: to_skia_blend(mode), ..PixmapPaint::default() };
        self.inner.draw_pixmap(x, y, src, &paint, Transform::identity(), Some(mask));
    }
}

impl fmt::Debug for Pixmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pixmap")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

fn to_skia_color(c: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(c.r(), c.g(), c.b(), c.a())
}

pub(crate) fn to_skia_blend(mode: BlendMode) -> tiny_skia::BlendMode {
    match mode {
        BlendMode::Clear => tiny_skia::BlendMode::Clear,
        BlendMode::Src => tiny_skia::BlendMode::Source,
        BlendMode::SrcOver => tiny_skia::BlendMode::SourceOver,
        BlendMode::DstOver => tiny_skia::BlendMode::DestinationOver,
        BlendMode::Plus => tiny_skia::BlendMode::Plus,
        BlendMode::Multiply => tiny_skia::BlendMode::Multiply,
        BlendMode::Screen => tiny_skia::BlendMode::Screen,
    }
}

/// Quantizes a premultiplied float color, keeping every channel within alpha.
pub(crate) fn to_premul_u8(c: Color4f) -> PremultipliedColorU8 {
    let c = c.clamped();
    let q = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u8;
    let a = q(c.a);
    PremultipliedColorU8::from_rgba(q(c.r).min(a), q(c.g).min(a), q(c.b).min(a), a)
        .unwrap_or(PremultipliedColorU8::TRANSPARENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, c: Color) -> tiny_skia::Pixmap {
        let mut p = tiny_skia::Pixmap::new(w, h).unwrap();
        p.fill(to_skia_color(c));
        p
    }

    fn full_mask(w: u32, h: u32, value: u8) -> Mask {
        let mut m = Mask::new(w, h).unwrap();
        m.data_mut().fill(value);
        m
    }

    fn near(a: Color, b: Color) -> bool {
        a.channels().iter().zip(b.channels()).all(|(x, y)| x.abs_diff(y) <= 1)
    }

    #[test]
    fn empty_size_is_rejected() {
        assert!(Pixmap::new(0, 4, Color::WHITE).is_none());
    }

    #[test]
    fn straight_color_round_trips() {
        let pm = Pixmap::new(1, 1, Color(0x80FF_0000)).unwrap();
        assert_eq!(pm.pixel(0, 0), Some(Color(0x80FF_0000)));
        assert_eq!(pm.pixel(1, 0), None);
    }

    #[test]
    fn rgba_bytes_are_premultiplied_on_load() {
        let pm = Pixmap::from_rgba8(2, 1, &[255, 0, 0, 255, 0, 0, 255, 0]).unwrap();
        assert_eq!(pm.pixel(0, 0), Some(Color::RED));
        assert_eq!(pm.pixel(1, 0), Some(Color::TRANSPARENT));
        assert!(matches!(Pixmap::from_rgba8(2, 2, &[0; 8]), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn src_over_opaque_replaces() {
        let mut pm = Pixmap::new(2, 2, Color::BLUE).unwrap();
        pm.composite(0, 0, solid(2, 2, Color::RED).as_ref(), BlendMode::SrcOver, &full_mask(2, 2, 255));
        assert_eq!(pm.pixel(1, 1), Some(Color::RED));
    }

    #[test]
    fn mask_limits_the_effect() {
        let mut pm = Pixmap::new(2, 1, Color::WHITE).unwrap();
        let mut mask = Mask::new(2, 1).unwrap();
        mask.data_mut().copy_from_slice(&[128, 0]);
        pm.composite(0, 0, solid(2, 1, Color::BLACK).as_ref(), BlendMode::SrcOver, &mask);
        assert!(near(pm.pixel(0, 0).unwrap(), Color(0xFF7F_7F7F)));
        assert_eq!(pm.pixel(1, 0), Some(Color::WHITE));
    }

    #[test]
    fn source_is_placed_at_offset() {
        let mut pm = Pixmap::new(4, 4, Color::WHITE).unwrap();
        pm.composite(2, 1, solid(1, 1, Color::RED).as_ref(), BlendMode::Src, &full_mask(4, 4, 255));
        assert_eq!(pm.pixel(2, 1), Some(Color::RED));
        assert_eq!(pm.pixel(1, 1), Some(Color::WHITE));
        assert_eq!(pm.pixel(2, 2), Some(Color::WHITE));
    }

    #[test]
    fn modes_on_half_alpha() {
        let src = solid(1, 1, Color(0x80FF_0000));
        let run = |mode| {
            let mut pm = Pixmap::new(1, 1, Color::BLUE).unwrap();
            pm.composite(0, 0, src.as_ref(), mode, &full_mask(1, 1, 255));
            pm.pixel(0, 0).unwrap()
        };
        assert!(near(run(BlendMode::SrcOver), Color(0xFF80_007F)));
        assert_eq!(run(BlendMode::DstOver), Color::BLUE);
        assert!(near(run(BlendMode::Src), Color(0x80FF_0000)));
        assert_eq!(run(BlendMode::Clear), Color::TRANSPARENT);
        assert!(near(run(BlendMode::Plus), Color(0xFF80_00FF)));
        assert!(near(run(BlendMode::Screen), Color(0xFF80_00FF)));
        assert!(near(run(BlendMode::Multiply), Color(0xFF00_007F)));
    }

    #[test]
    fn premul_quantization_stays_under_alpha() {
        let c = to_premul_u8(Color4f::from_premul(0.6, 0.2, 0.0, 0.5));
        assert_eq!(c.alpha(), 128);
        assert!(c.red() <= c.alpha());
    }

    #[test]
    fn png_has_signature() {
        let png = Pixmap::new(3, 2, Color::RED).unwrap().encode_png().unwrap();
        assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
    }
}
