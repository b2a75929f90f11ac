use crate::error::{Error, Result};

use super::{CornerRadii, Rect, Vec2};

/// Rounded rectangle: a normalized [`Rect`] plus per-corner elliptical radii.
///
/// Invariants:
/// - the rect is normalized (non-negative width/height)
/// - radii are non-negative; a corner with either component zero is square
/// - adjacent radii never exceed the side they share (they are scaled down
///   uniformly when they would, the CSS / Skia rule)
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct RRect {
    rect: Rect,
    radii: CornerRadii,
}

impl RRect {
    /// Square-cornered rounded rect.
    pub fn from_rect(rect: Rect) -> Self {
        Self { rect: rect.normalized(), radii: CornerRadii::zero() }
    }

    /// Same `(rx, ry)` on every corner.
    pub fn from_rect_xy(rect: Rect, rx: f32, ry: f32) -> Result<Self> {
        Self::new(rect, CornerRadii::uniform(rx, ry))
    }

    /// Ellipse inscribed in `rect`.
    pub fn from_oval(rect: Rect) -> Self {
        let rect = rect.normalized();
        let radii = CornerRadii::uniform(rect.width() * 0.5, rect.height() * 0.5);
        Self { rect, radii }
    }

    pub fn new(rect: Rect, radii: CornerRadii) -> Result<Self> {
        for c in radii.corners() {
            if !c.is_finite() || c.x < 0.0 || c.y < 0.0 {
                return Err(Error::invalid(format!("rrect radius must be finite and >= 0, got {c:?}")));
            }
        }
        if !rect.is_finite() {
            return Err(Error::invalid("rrect bounds must be finite"));
        }

        let mut rr = Self { rect: rect.normalized(), radii };
        rr.fit_radii();
        Ok(rr)
    }

    pub fn set_rect(&mut self, rect: Rect) {
        *self = Self::from_rect(rect);
    }

    pub fn set_rect_xy(&mut self, rect: Rect, rx: f32, ry: f32) -> Result<()> {
        *self = Self::from_rect_xy(rect, rx, ry)?;
        Ok(())
    }

    pub fn set_oval(&mut self, rect: Rect) {
        *self = Self::from_oval(rect);
    }

    /// Moves the rounded rect in place; size and radii are unchanged.
    pub fn offset(&mut self, dx: f32, dy: f32) {
        self.rect.offset(dx, dy);
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    #[inline]
    pub fn radii(&self) -> CornerRadii {
        self.radii
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rect.is_empty()
    }

    #[inline]
    pub fn is_rect(&self) -> bool {
        self.radii.is_zero()
    }

    pub fn is_oval(&self) -> bool {
        let half = Vec2::new(self.rect.width() * 0.5, self.rect.height() * 0.5);
        self.radii.corners().iter().all(|c| c.approx_eq(half, 1e-4))
    }

    fn fit_radii(&mut self) {
        let r = &mut self.radii;
        for c in [&mut r.top_left, &mut r.top_right, &mut r.bottom_right, &mut r.bottom_left] {
            if c.x == 0.0 || c.y == 0.0 {
                *c = Vec2::zero();
            }
        }

        let w = self.rect.width();
        let h = self.rect.height();
        let mut scale = 1.0f32;
        let mut limit = |side: f32, a: f32, b: f32| {
            let sum = a + b;
            if sum > side && sum > 0.0 {
                scale = scale.min(side / sum);
            }
        };
        limit(w, r.top_left.x, r.top_right.x);
        limit(w, r.bottom_left.x, r.bottom_right.x);
        limit(h, r.top_left.y, r.bottom_left.y);
        limit(h, r.top_right.y, r.bottom_right.y);

        if scale < 1.0 {
            for c in [&mut r.top_left, &mut r.top_right, &mut r.bottom_right, &mut r.bottom_left] {
                *c = *c * scale;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oval_offset_keeps_radii() {
        let mut rr = RRect::from_oval(Rect::from_xywh(10.0, 10.0, 100.0, 160.0));
        rr.offset(40.0, 80.0);
        assert_eq!(rr.rect().to_ltrb(), [50.0, 90.0, 150.0, 250.0]);
        assert!(rr.is_oval());
        assert_eq!(rr.radii().top_left, Vec2::new(50.0, 80.0));
    }

    #[test]
    fn negative_radius_is_rejected() {
        let err = RRect::from_rect_xy(Rect::new(0.0, 0.0, 10.0, 10.0), -1.0, 2.0);
        assert!(matches!(err, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn oversized_radii_are_scaled_to_fit() {
        let rr = RRect::from_rect_xy(Rect::new(0.0, 0.0, 10.0, 40.0), 10.0, 10.0).unwrap();
        assert_eq!(rr.radii().top_left, Vec2::new(5.0, 5.0));
        assert_eq!(rr.radii().bottom_right, Vec2::new(5.0, 5.0));
    }

    #[test]
    fn zero_component_makes_corner_square() {
        let rr = RRect::from_rect_xy(Rect::new(0.0, 0.0, 10.0, 10.0), 0.0, 3.0).unwrap();
        assert!(rr.is_rect());
    }
}
