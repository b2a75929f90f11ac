use crate::coords::Vec2;
use crate::error::{Error, Result};
use crate::geometry::{Path, PathMeasure};

const MAX_POINTS_PER_CONTOUR: f32 = 100_000.0;

/// Linear congruential generator (Numerical Recipes constants).
struct Lcg(u32);

impl Lcg {
    const MUL: u32 = 1_664_525;
    const ADD: u32 = 1_013_904_223;

    fn next_u32(&mut self) -> u32 {
        self.0 = self.0.wrapping_mul(Self::MUL).wrapping_add(Self::ADD);
        self.0
    }

    /// Uniform in `[-1, 1)`, quantized to 16.16 fixed point.
    fn next_signed_unit(&mut self) -> f32 {
        let fixed = (self.next_u32() as i32) >> 15;
        fixed as f32 / 65536.0
    }
}

/// Chops contours into segments of about `seg_length` and jitters the
/// joints along the local normal by up to `deviation`.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteEffect {
    seg_length: f32,
    deviation: f32,
    seed: u32,
}

impl DiscreteEffect {
    pub fn new(seg_length: f32, deviation: f32, seed: u32) -> Result<Self> {
        if !seg_length.is_finite() || seg_length <= 0.0 {
            return Err(Error::invalid(format!("discrete segment length must be > 0, got {seg_length}")));
        }
        if !deviation.is_finite() {
            return Err(Error::invalid("discrete deviation must be finite"));
        }
        Ok(Self { seg_length, deviation, seed })
    }

    #[inline]
    pub fn segment_length(&self) -> f32 {
        self.seg_length
    }

    #[inline]
    pub fn deviation(&self) -> f32 {
        self.deviation
    }

    #[inline]
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Open contours keep their endpoints; every other sample is displaced.
    /// Output depends only on the input geometry and the three parameters.
    pub(crate) fn filter(&self, src: &Path, stroke: bool, tolerance: f32) -> Path {
        let fill = !stroke;
        let measure = PathMeasure::new(src, fill, tolerance);
        // Seeded from the first contour only.
        let first = measure.contours().first().map_or(0.0, |c| c.length());
        let seed = self.seed ^ (first.round() as i32 as u32);
        let mut rng = Lcg(seed ^ seed.rotate_left(16));
        let mut dst = Path::with_fill_type(src.fill_type());
        let min_length = self.seg_length * if fill { 3.0 } else { 2.0 };

        for contour in &measure {
            let length = contour.length();
            if min_length > length {
                contour.segment(0.0, length, &mut dst, true);
                if contour.is_closed() {
                    dst.close();
                }
                continue;
            }

            let mut n = (length / self.seg_length).round().min(MAX_POINTS_PER_CONTOUR) as i32;
            let delta = length / n as f32;
            let mut distance = 0.0f32;
            let closed = contour.is_closed();
            if closed {
                n -= 1;
                distance += delta / 2.0;
            }

            let mut jitter = |distance: f32, pinned: bool| -> Option<Vec2> {
                let (p, tangent) = contour.pos_tan(distance)?;
                let k = rng.next_signed_unit() * self.deviation;
                if pinned {
                    return Some(p);
                }
                // Tangent rotated counter-clockwise: (y, -x).
                Some(p + Vec2::new(tangent.y, -tangent.x) * k)
            };

            if let Some(p) = jitter(distance, !closed) {
                dst.move_to(p.x, p.y);
            }
            while n > 0 {
                n -= 1;
                distance += delta;
                if let Some(p) = jitter(distance, !closed && n == 0) {
                    dst.line_to(p.x, p.y);
                }
            }
            if closed {
                dst.close();
            }
        }
        dst
    }
}
