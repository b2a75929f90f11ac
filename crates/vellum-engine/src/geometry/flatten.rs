//! Curve flattening into polylines.

use crate::coords::Vec2;

use super::path::{Path, PathEl};

const MAX_DEPTH: u32 = 16;
const MIN_TOLERANCE: f32 = 1e-4;

/// A flattened contour.
///
/// `points` never repeats consecutive points and, for closed contours, does
/// not repeat the start point at the end; the closing edge is implicit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contour {
    pub points: Vec<Vec2>,
    pub closed: bool,
}

impl Contour {
    /// Signed area (shoelace). Positive for counter-clockwise in a y-up frame.
    pub fn signed_area(points: &[Vec2]) -> f32 {
        if points.len() < 3 {
            return 0.0;
        }
        let mut sum = 0.0;
        let mut j = points.len() - 1;
        for i in 0..points.len() {
            sum += points[j].cross(points[i]);
            j = i;
        }
        sum * 0.5
    }

    /// Polyline length, including the closing edge for closed contours.
    pub fn length(&self) -> f32 {
        let open: f32 = self.points.windows(2).map(|w| w[0].distance(w[1])).sum();
        match (self.closed, self.points.first(), self.points.last()) {
            (true, Some(&first), Some(&last)) => open + last.distance(first),
            _ => open,
        }
    }
}

pub(crate) fn flatten(path: &Path, tolerance: f32) -> Vec<Contour> {
    let tol = tolerance.max(MIN_TOLERANCE);
    let mut out = Vec::new();
    let mut current = Contour::default();
    let mut last = Vec2::zero();

    for el in path.iter() {
        match el {
            PathEl::MoveTo(p) => {
                finish(&mut out, std::mem::take(&mut current));
                push_point(&mut current.points, p);
                last = p;
            }
            PathEl::LineTo(p) => {
                push_point(&mut current.points, p);
                last = p;
            }
            PathEl::QuadTo(c, p) => {
                flatten_quad(last, c, p, tol, 0, &mut current.points);
                last = p;
            }
            PathEl::ConicTo(c, p, w) => {
                flatten_conic(last, c, p, w, tol, 0, &mut current.points);
                last = p;
            }
            PathEl::CubicTo(c1, c2, p) => {
                flatten_cubic(last, c1, c2, p, tol, 0, &mut current.points);
                last = p;
            }
            PathEl::Close => {
                current.closed = true;
                if let Some(&first) = current.points.first() {
                    last = first;
                }
                finish(&mut out, std::mem::take(&mut current));
            }
        }
    }
    finish(&mut out, current);
    out
}

fn finish(out: &mut Vec<Contour>, mut contour: Contour) {
    if contour.closed && contour.points.len() > 1 {
        let first = contour.points[0];
        if contour.points.last().is_some_and(|&p| p == first) {
            contour.points.pop();
        }
    }
    if contour.points.len() >= 2 {
        out.push(contour);
    }
}

fn push_point(points: &mut Vec<Vec2>, p: Vec2) {
    if points.last() != Some(&p) {
        points.push(p);
    }
}

fn dist_point_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let v = b - a;
    let w = p - a;
    let c1 = v.dot(w);
    if c1 <= 0.0 {
        return p.distance(a);
    }
    let c2 = v.dot(v);
    if c2 <= c1 {
        return p.distance(b);
    }
    p.distance(a + v * (c1 / c2))
}

fn flatten_quad(p0: Vec2, p1: Vec2, p2: Vec2, tol: f32, depth: u32, out: &mut Vec<Vec2>) {
    if depth >= MAX_DEPTH || dist_point_to_segment(p1, p0, p2) <= tol {
        push_point(out, p2);
        return;
    }
    let p01 = p0.midpoint(p1);
    let p12 = p1.midpoint(p2);
    let p012 = p01.midpoint(p12);
    flatten_quad(p0, p01, p012, tol, depth + 1, out);
    flatten_quad(p012, p12, p2, tol, depth + 1, out);
}

/// Chops at `t = 0.5` until the control point is within `tol` of the
/// chord. For positive weights the curve stays in its control triangle,
/// so that test is conservative.
fn flatten_conic(p0: Vec2, p1: Vec2, p2: Vec2, w: f32, tol: f32, depth: u32, out: &mut Vec<Vec2>) {
    if depth >= MAX_DEPTH || dist_point_to_segment(p1, p0, p2) <= tol {
        push_point(out, p2);
        return;
    }
    let scale = 1.0 / (1.0 + w);
    let a = (p0 + p1 * w) * scale;
    let b = (p1 * w + p2) * scale;
    let mid = a.midpoint(b);
    let half_w = (0.5 + w * 0.5).sqrt();
    flatten_conic(p0, a, mid, half_w, tol, depth + 1, out);
    flatten_conic(mid, b, p2, half_w, tol, depth + 1, out);
}

fn flatten_cubic(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, tol: f32, depth: u32, out: &mut Vec<Vec2>) {
    let d = dist_point_to_segment(p1, p0, p3).max(dist_point_to_segment(p2, p0, p3));
    if depth >= MAX_DEPTH || d <= tol {
        push_point(out, p3);
        return;
    }
    let p01 = p0.midpoint(p1);
    let p12 = p1.midpoint(p2);
    let p23 = p2.midpoint(p3);
    let p012 = p01.midpoint(p12);
    let p123 = p12.midpoint(p23);
    let p0123 = p012.midpoint(p123);
    flatten_cubic(p0, p01, p012, p0123, tol, depth + 1, out);
    flatten_cubic(p0123, p123, p23, p3, tol, depth + 1, out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;
    use crate::geometry::PathDirection;

    #[test]
    fn rect_flattens_to_four_points_closed() {
        let c = Path::rect(Rect::new(0.0, 0.0, 10.0, 5.0), PathDirection::Cw).flatten(0.25);
        assert_eq!(c.len(), 1);
        assert!(c[0].closed);
        assert_eq!(c[0].points.len(), 4);
        assert_eq!(c[0].length(), 30.0);
    }

    #[test]
    fn lone_move_is_dropped() {
        let mut p = Path::new();
        p.move_to(1.0, 1.0);
        assert!(p.flatten(0.25).is_empty());
    }

    #[test]
    fn quad_points_stay_near_curve() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0).quad_to(50.0, 100.0, 100.0, 0.0);
        let c = &p.flatten(0.1)[0];
        assert!(c.points.len() > 8);
        // Apex of this quad is at (50, 50).
        let max_y = c.points.iter().map(|p| p.y).fold(0.0, f32::max);
        assert!((max_y - 50.0).abs() < 0.2);
    }

    #[test]
    fn quarter_circle_conic_lies_on_the_circle() {
        let mut p = Path::new();
        p.move_to(10.0, 0.0).conic_to(10.0, 10.0, 0.0, 10.0, std::f32::consts::FRAC_1_SQRT_2);
        let c = &p.flatten(0.01)[0];
        assert!(c.points.len() > 4);
        assert_eq!(c.points.last(), Some(&Vec2::new(0.0, 10.0)));
        for pt in &c.points {
            assert!((pt.length() - 10.0).abs() < 1e-3, "{pt:?}");
        }
    }

    #[test]
    fn signed_area_flips_with_direction() {
        let r = Rect::new(0.0, 0.0, 4.0, 4.0);
        let cw = &Path::rect(r, PathDirection::Cw).flatten(0.25)[0];
        let ccw = &Path::rect(r, PathDirection::Ccw).flatten(0.25)[0];
        let a = Contour::signed_area(&cw.points);
        let b = Contour::signed_area(&ccw.points);
        assert_eq!(a, -b);
        assert_eq!(a.abs(), 16.0);
    }
}
