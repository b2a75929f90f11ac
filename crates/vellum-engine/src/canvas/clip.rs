use std::sync::Arc;

use crate::coords::{Rect, Vec2};
use crate::render::{Mesh, Span, intersect_spans, subtract_spans};

/// How a new clip shape combines with the current clip.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum ClipOp {
    /// Remove the shape from the visible region.
    Difference,
    /// Keep only the part of the visible region inside the shape.
    #[default]
    Intersect,
}

/// One recorded clip shape, in device space.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipElement {
    pub op: ClipOp,
    pub mesh: Arc<Mesh>,
}

/// Visible region: the whole plane reduced by every recorded element in
/// order.
///
/// Elements are only ever appended, so the region only shrinks. Primitives
/// share the region they were drawn under through an `Arc`; the canvas
/// copies on write when the clip changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipRegion {
    elements: Vec<ClipElement>,
    /// Conservative bounds; `None` while no `Intersect` element exists.
    bounds: Option<Rect>,
}

impl ClipRegion {
    /// The unbounded region.
    #[inline]
    pub fn wide_open() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_wide_open(&self) -> bool {
        self.elements.is_empty()
    }

    #[inline]
    pub fn elements(&self) -> &[ClipElement] {
        &self.elements
    }

    /// Device-space bounds of the visible region. `None` means unbounded;
    /// an empty rect means nothing is visible.
    #[inline]
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    /// True when the region is known to be empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bounds.is_some_and(Rect::is_empty)
    }

    pub(crate) fn apply(&mut self, op: ClipOp, mesh: Mesh) {
        if op == ClipOp::Intersect {
            let shape = mesh.bounds().unwrap_or_default();
            self.bounds = Some(match self.bounds {
                None => shape,
                Some(b) => b.intersect(shape).unwrap_or_default(),
            });
        }
        self.elements.push(ClipElement { op, mesh: Arc::new(mesh) });
    }

    /// Exact visibility test at a device-space point.
    pub fn contains(&self, p: Vec2) -> bool {
        self.elements.iter().all(|el| match el.op {
            ClipOp::Intersect => el.mesh.covers(p),
            ClipOp::Difference => !el.mesh.covers(p),
        })
    }

    /// Restricts covered runs on scanline `y` to the visible region.
    pub fn clip_spans(&self, y: f32, spans: Vec<Span>) -> Vec<Span> {
        self.elements.iter().fold(spans, |acc, el| {
            if acc.is_empty() {
                return acc;
            }
            match el.op {
                ClipOp::Intersect => intersect_spans(&acc, &el.mesh.spans(y)),
                ClipOp::Difference => subtract_spans(&acc, &el.mesh.spans(y)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::FillType;

    fn square(x: f32, y: f32, s: f32) -> Mesh {
        let pts = vec![Vec2::new(x, y), Vec2::new(x + s, y), Vec2::new(x + s, y + s), Vec2::new(x, y + s)];
        Mesh::from_contours(vec![pts], FillType::NonZero)
    }

    #[test]
    fn wide_open_contains_everything() {
        let clip = ClipRegion::wide_open();
        assert!(clip.contains(Vec2::new(-1e6, 1e6)));
        assert!(clip.bounds().is_none());
        assert_eq!(clip.clip_spans(0.0, vec![(0.0, 5.0)]), vec![(0.0, 5.0)]);
    }

    #[test]
    fn intersect_then_difference() {
        let mut clip = ClipRegion::wide_open();
        clip.apply(ClipOp::Intersect, square(0.0, 0.0, 100.0));
        clip.apply(ClipOp::Difference, square(40.0, 40.0, 20.0));
        assert!(clip.contains(Vec2::new(10.0, 50.0)));
        assert!(!clip.contains(Vec2::new(50.0, 50.0)));
        assert!(!clip.contains(Vec2::new(150.0, 50.0)));
        assert_eq!(clip.bounds().unwrap().to_ltrb(), [0.0, 0.0, 100.0, 100.0]);
        assert_eq!(clip.clip_spans(50.0, vec![(-10.0, 200.0)]), vec![(0.0, 40.0), (60.0, 100.0)]);
    }

    #[test]
    fn disjoint_intersections_empty_the_region() {
        let mut clip = ClipRegion::wide_open();
        clip.apply(ClipOp::Intersect, square(0.0, 0.0, 10.0));
        clip.apply(ClipOp::Intersect, square(20.0, 20.0, 10.0));
        assert!(clip.is_empty());
        assert!(!clip.contains(Vec2::new(5.0, 5.0)));
        assert!(clip.clip_spans(5.0, vec![(0.0, 10.0)]).is_empty());
    }
}
