use crate::coords::Rect;
use crate::error::{Error, Result};
use crate::resource::{Handle, Resource};

/// How the blurred coverage combines with the shape's own coverage.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum BlurStyle {
    /// Fuzzy inside and outside.
    #[default]
    Normal,
    /// Solid inside, fuzzy outside.
    Solid,
    /// Nothing inside, fuzzy outside.
    Outer,
    /// Fuzzy inside, nothing outside.
    Inner,
}

/// Gaussian blur of a primitive's coverage mask.
///
/// `radius` is in device pixels and does not scale with the CTM.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BlurMask {
    style: BlurStyle,
    radius: f32,
}

impl Resource for BlurMask {
    const KIND: &'static str = "mask filter";
}

impl BlurMask {
    pub fn new(style: BlurStyle, radius: f32) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::invalid(format!("blur radius must be > 0, got {radius}")));
        }
        Ok(Self { style, radius })
    }

    #[inline]
    pub fn style(&self) -> BlurStyle {
        self.style
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Standard deviation of the kernel.
    #[inline]
    pub fn sigma(&self) -> f32 {
        0.577_35 * self.radius + 0.5
    }

    /// Pixels the kernel reaches on each side of its center.
    pub fn extent(&self) -> u32 {
        (3.0 * self.sigma()).ceil() as u32
    }

    /// `src` grown by the radius and snapped outward to whole pixels.
    pub fn approximate_filtered_bounds(&self, src: Rect) -> Rect {
        Rect::from_ltrb(
            (src.left() - self.radius).floor(),
            (src.top() - self.radius).floor(),
            (src.right() + self.radius).ceil(),
            (src.bottom() + self.radius).ceil(),
        )
    }

    /// Normalized 1D Gaussian weights, `2 * extent + 1` long.
    pub fn kernel(&self) -> Vec<f32> {
        let sigma = self.sigma();
        let r = self.extent() as i32;
        let denom = 2.0 * sigma * sigma;
        let mut k: Vec<f32> = (-r..=r).map(|i| (-((i * i) as f32) / denom).exp()).collect();
        let sum: f32 = k.iter().sum();
        k.iter_mut().for_each(|w| *w /= sum);
        k
    }

    /// Blurs a row-major `width x height` coverage mask in place and folds
    /// in the style. The mask must already be padded by [`extent`](Self::extent)
    /// on every side for the blur tail to fit.
    pub fn filter_mask(&self, mask: &mut [f32], width: usize, height: usize) {
        debug_assert_eq!(mask.len(), width * height);
        if width == 0 || height == 0 {
            return;
        }
        let kernel = self.kernel();
        let mut blurred = mask.to_vec();
        let mut tmp = vec![0.0f32; mask.len()];
        convolve(&blurred, &mut tmp, width, height, &kernel, 1, width);
        convolve(&tmp, &mut blurred, height, width, &kernel, width, 1);

        for (m, b) in mask.iter_mut().zip(blurred) {
            let b = b.clamp(0.0, 1.0);
            *m = match self.style {
                BlurStyle::Normal => b,
                BlurStyle::Solid => m.max(b),
                BlurStyle::Outer => b * (1.0 - *m),
                BlurStyle::Inner => b * *m,
            };
        }
    }
}

/// One separable pass. `len`/`step` walk along the blurred axis and
/// `lines`/`stride` across it; samples past either end count as zero.
fn convolve(src: &[f32], dst: &mut [f32], len: usize, lines: usize, kernel: &[f32], step: usize, stride: usize) {
    let r = (kernel.len() / 2) as isize;
    for line in 0..lines {
        let base = line * stride;
        for i in 0..len as isize {
            let lo = (i - r).max(0);
            let hi = (i + r).min(len as isize - 1);
            let mut acc = 0.0;
            for j in lo..=hi {
                acc += src[base + j as usize * step] * kernel[(j - i + r) as usize];
            }
            dst[base + i as usize * step] = acc;
        }
    }
}

/// Shared, releasable mask filter referenced by paints.
pub type MaskFilter = Handle<BlurMask>;

impl Handle<BlurMask> {
    /// Blur mask filter. `radius` must be positive and finite.
    pub fn blur(style: BlurStyle, radius: f32) -> Result<MaskFilter> {
        BlurMask::new(style, radius).map(Handle::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `size x size` mask with a solid square in the middle third.
    fn square_mask(size: usize) -> Vec<f32> {
        let (a, b) = (size / 3, 2 * size / 3);
        (0..size * size)
            .map(|i| {
                let (x, y) = (i % size, i / size);
                if (a..b).contains(&x) && (a..b).contains(&y) { 1.0 } else { 0.0 }
            })
            .collect()
    }

    fn filtered(style: BlurStyle) -> Vec<f32> {
        let mut m = square_mask(60);
        BlurMask::new(style, 4.0).unwrap().filter_mask(&mut m, 60, 60);
        m
    }

    // ── construction ─────────────────────────────────────────────────────

    #[test]
    fn rejects_non_positive_radius() {
        for r in [0.0, -2.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(MaskFilter::blur(BlurStyle::Normal, r), Err(Error::InvalidArgument(_))));
        }
        let f = MaskFilter::blur(BlurStyle::Outer, 10.0).unwrap();
        assert_eq!(f.get().unwrap().style(), BlurStyle::Outer);
        f.release();
        assert!(matches!(f.get(), Err(Error::UseAfterRelease("mask filter"))));
    }

    #[test]
    fn filtered_bounds_snap_outward() {
        let b = BlurMask::new(BlurStyle::Normal, 2.5).unwrap();
        let r = b.approximate_filtered_bounds(Rect::from_ltrb(10.2, 20.0, 30.0, 40.7));
        assert_eq!(r.to_ltrb(), [7.0, 17.0, 33.0, 44.0]);
    }

    #[test]
    fn kernel_is_normalized_and_symmetric() {
        let b = BlurMask::new(BlurStyle::Normal, 10.0).unwrap();
        let k = b.kernel();
        assert_eq!(k.len(), 2 * b.extent() as usize + 1);
        assert!((k.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        let mid = k.len() / 2;
        assert!(k.iter().all(|&w| w <= k[mid]));
        assert!((k[0] - k[k.len() - 1]).abs() < 1e-9);
    }

    // ── styles ───────────────────────────────────────────────────────────

    #[test]
    fn normal_blur_preserves_mass_and_softens_edges() {
        let before: f32 = square_mask(60).iter().sum();
        let m = filtered(BlurStyle::Normal);
        let after: f32 = m.iter().sum();
        assert!((before - after).abs() / before < 1e-3);
        // Deep inside stays solid, the edge is about half, outside picks up some.
        assert!(m[30 * 60 + 30] > 0.99);
        let edge = m[30 * 60 + 20];
        assert!(edge > 0.3 && edge < 0.7, "edge coverage {edge}");
        assert!(m[30 * 60 + 17] > 0.01);
        assert_eq!(m[0], 0.0);
    }

    #[test]
    fn solid_keeps_inside_opaque() {
        let m = filtered(BlurStyle::Solid);
        assert_eq!(m[30 * 60 + 20], 1.0);
        assert!(m[30 * 60 + 18] > 0.0 && m[30 * 60 + 18] < 0.5);
    }

    #[test]
    fn outer_is_empty_inside() {
        let m = filtered(BlurStyle::Outer);
        assert_eq!(m[30 * 60 + 30], 0.0);
        assert_eq!(m[30 * 60 + 21], 0.0);
        assert!(m[30 * 60 + 18] > 0.0);
    }

    #[test]
    fn inner_is_empty_outside() {
        let m = filtered(BlurStyle::Inner);
        assert_eq!(m[30 * 60 + 18], 0.0);
        assert!(m[30 * 60 + 20] > 0.3 && m[30 * 60 + 20] < 0.7);
        assert!(m[30 * 60 + 30] > 0.99);
    }
}
