use super::Vec2;

/// Per-corner elliptical radii for a rounded rectangle.
///
/// Corners follow CSS order: top-left, top-right, bottom-right, bottom-left.
/// Each corner carries `(rx, ry)`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct CornerRadii {
    pub top_left: Vec2,
    pub top_right: Vec2,
    pub bottom_right: Vec2,
    pub bottom_left: Vec2,
}

impl CornerRadii {
    #[inline]
    pub const fn new(top_left: Vec2, top_right: Vec2, bottom_right: Vec2, bottom_left: Vec2) -> Self {
        Self { top_left, top_right, bottom_right, bottom_left }
    }

    /// Same `(rx, ry)` on all four corners.
    #[inline]
    pub const fn uniform(rx: f32, ry: f32) -> Self {
        let r = Vec2::new(rx, ry);
        Self { top_left: r, top_right: r, bottom_right: r, bottom_left: r }
    }

    /// Uniform circular radius on all four corners.
    #[inline]
    pub const fn all(r: f32) -> Self {
        Self::uniform(r, r)
    }

    /// No rounding.
    #[inline]
    pub const fn zero() -> Self {
        Self::all(0.0)
    }

    #[inline]
    pub fn corners(&self) -> [Vec2; 4] {
        [self.top_left, self.top_right, self.bottom_right, self.bottom_left]
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.corners().iter().all(|c| c.x == 0.0 || c.y == 0.0)
    }
}
