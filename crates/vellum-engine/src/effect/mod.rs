//! Path effects: geometry-to-geometry transforms applied before
//! tessellation.
//!
//! An effect never mutates its input; it returns a replacement path, or
//! `None` when it does not apply and the original path should be drawn.
//!
//! Mask filters live here too, but act later: on the coverage mask the
//! device computes for a primitive.

mod dash;
mod discrete;
mod mask_filter;

pub use dash::{DashEffect, MAX_DASH_COUNT};
pub use discrete::DiscreteEffect;
pub use mask_filter::{BlurMask, BlurStyle, MaskFilter};

use crate::error::Result;
use crate::geometry::Path;
use crate::paint::{Paint, Style};
use crate::resource::{Handle, Resource};

/// Default flattening tolerance for effects, in path units.
pub const DEFAULT_EFFECT_TOLERANCE: f32 = 0.25;

#[derive(Debug, Clone, PartialEq)]
pub enum PathEffectKind {
    Dash(DashEffect),
    Discrete(DiscreteEffect),
}

impl Resource for PathEffectKind {
    const KIND: &'static str = "path effect";
}

impl PathEffectKind {
    /// Runs the effect. `tolerance` bounds curve flattening error in the
    /// path's own units.
    pub fn filter_path(&self, src: &Path, paint: &Paint, tolerance: f32) -> Option<Path> {
        let stroke = paint.style() != Style::Fill;
        match self {
            // Dashing only makes sense for outlines.
            PathEffectKind::Dash(_) if !stroke => None,
            PathEffectKind::Dash(d) => d.filter(src, tolerance),
            PathEffectKind::Discrete(d) => Some(d.filter(src, stroke, tolerance)),
        }
    }
}

/// Shared, releasable path effect referenced by paints.
pub type PathEffect = Handle<PathEffectKind>;

impl Handle<PathEffectKind> {
    /// Dash effect: `intervals` alternate on/off lengths, starting `phase`
    /// units into the pattern.
    pub fn dash(intervals: &[f32], phase: f32) -> Result<PathEffect> {
        Ok(Handle::new(PathEffectKind::Dash(DashEffect::new(intervals, phase)?)))
    }

    /// Discrete effect: resample every `seg_length` units and jitter by up to
    /// `deviation`, reproducibly for a given `seed`.
    pub fn discrete(seg_length: f32, deviation: f32, seed: u32) -> Result<PathEffect> {
        Ok(Handle::new(PathEffectKind::Discrete(DiscreteEffect::new(seg_length, deviation, seed)?)))
    }

    /// Applies the effect at the default tolerance.
    pub fn apply(&self, src: &Path, paint: &Paint) -> Result<Option<Path>> {
        self.apply_with_tolerance(src, paint, DEFAULT_EFFECT_TOLERANCE)
    }

    pub fn apply_with_tolerance(&self, src: &Path, paint: &Paint, tolerance: f32) -> Result<Option<Path>> {
        Ok(self.get()?.filter_path(src, paint, tolerance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;
    use crate::error::Error;
    use crate::geometry::PathDirection;
    use crate::paint::Color;

    fn rect() -> Path {
        Path::rect(Rect::new(0.0, 0.0, 40.0, 40.0), PathDirection::Cw)
    }

    #[test]
    fn dash_skips_fills() {
        let fx = PathEffect::dash(&[10.0, 10.0], 0.0).unwrap();
        assert!(fx.apply(&rect(), &Paint::fill(Color::BLUE)).unwrap().is_none());
        assert!(fx.apply(&rect(), &Paint::stroke(Color::BLUE, 3.0)).unwrap().is_some());
    }

    #[test]
    fn discrete_applies_to_fills() {
        let fx = PathEffect::discrete(5.0, 2.0, 0).unwrap();
        let out = fx.apply(&rect(), &Paint::fill(Color::BLUE)).unwrap().unwrap();
        assert!(!out.is_empty());
    }

    #[test]
    fn construction_fails_fast() {
        assert!(matches!(PathEffect::dash(&[1.0, 2.0, 3.0], 0.0), Err(Error::InvalidArgument(_))));
        assert!(matches!(PathEffect::discrete(0.0, 1.0, 0), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn released_effect_cannot_apply() {
        let fx = PathEffect::dash(&[10.0, 10.0], 0.0).unwrap();
        fx.release();
        let err = fx.apply(&rect(), &Paint::stroke(Color::BLUE, 1.0));
        assert!(matches!(err, Err(Error::UseAfterRelease("path effect"))));
    }
}
