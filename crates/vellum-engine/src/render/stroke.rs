//! Stroke-to-fill conversion.
//!
//! The outline is built as a set of small convex pieces (one quad per
//! segment, plus join and cap pieces), each oriented counter-clockwise.
//! Filled with the non-zero rule, overlapping pieces are covered exactly
//! once.

use std::f32::consts::PI;

use crate::coords::Vec2;
use crate::geometry::Path;
use crate::paint::{LineCap, LineJoin, Paint};

/// Stroke parameters captured from a [`Paint`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StrokeStyle {
    /// Zero means a one device pixel hairline.
    pub width: f32,
    pub cap: LineCap,
    pub join: LineJoin,
    pub miter_limit: f32,
}

impl StrokeStyle {
    pub fn from_paint(paint: &Paint) -> Self {
        Self {
            width: paint.stroke_width(),
            cap: paint.stroke_cap(),
            join: paint.stroke_join(),
            miter_limit: paint.stroke_miter(),
        }
    }
}

const MIN_ROUND_SEGMENTS: usize = 8;
const MAX_ROUND_SEGMENTS: usize = 256;

/// Builds outline pieces for `path` in its own coordinate space.
///
/// `tolerance` bounds both curve flattening and round join/cap deviation,
/// in path units.
pub(crate) fn stroke_outline(path: &Path, style: &StrokeStyle, tolerance: f32) -> Vec<Vec<Vec2>> {
    let hw = style.width * 0.5;
    if !(hw > 0.0) || !hw.is_finite() {
        return Vec::new();
    }
    let mut s = Stroker { hw, style, tolerance: tolerance.max(1e-4), pieces: Vec::new() };
    for contour in path.flatten(s.tolerance) {
        s.contour(&contour.points, contour.closed);
    }
    s.pieces
}

struct Stroker<'a> {
    hw: f32,
    style: &'a StrokeStyle,
    tolerance: f32,
    pieces: Vec<Vec<Vec2>>,
}

impl Stroker<'_> {
    fn contour(&mut self, points: &[Vec2], closed: bool) {
        let n = points.len();
        if n < 2 {
            return;
        }
        let seg_count = if closed { n } else { n - 1 };
        for i in 0..seg_count {
            let a = points[i];
            let b = points[(i + 1) % n];
            let Some(d) = (b - a).normalize() else { continue };
            let off = d.perp() * self.hw;
            self.push(vec![a + off, b + off, b - off, a - off]);
        }

        let join_count = if closed { n } else { n - 2 };
        for j in 0..join_count {
            let v = if closed { j } else { j + 1 };
            let prev = points[(v + n - 1) % n];
            let next = points[(v + 1) % n];
            let (Some(d0), Some(d1)) = ((points[v] - prev).normalize(), (next - points[v]).normalize()) else {
                continue;
            };
            self.join(points[v], d0, d1);
        }

        if !closed {
            let (Some(start), Some(end)) = (
                (points[1] - points[0]).normalize(),
                (points[n - 1] - points[n - 2]).normalize(),
            ) else {
                return;
            };
            self.cap(points[0], -start);
            self.cap(points[n - 1], end);
        }
    }

    fn join(&mut self, v: Vec2, d0: Vec2, d1: Vec2) {
        let cross = d0.cross(d1);
        let dot = d0.dot(d1);
        if cross.abs() <= 1e-6 && dot > 0.0 {
            return;
        }
        // Outer side of the turn; a U-turn picks either side.
        let side = if cross > 0.0 { -1.0 } else { 1.0 };
        let o0 = v + d0.perp() * (self.hw * side);
        let o1 = v + d1.perp() * (self.hw * side);
        let cos_half = ((1.0 + dot) * 0.5).max(0.0).sqrt();

        match self.style.join {
            LineJoin::Bevel => self.push(vec![v, o0, o1]),
            LineJoin::Miter => {
                if cos_half > 1e-6 && 1.0 / cos_half <= self.style.miter_limit {
                    let bisector = (d0.perp() + d1.perp()) * side;
                    if let Some(b) = bisector.normalize() {
                        let tip = v + b * (self.hw / cos_half);
                        self.push(vec![v, o0, tip, o1]);
                        return;
                    }
                }
                self.push(vec![v, o0, o1]);
            }
            LineJoin::Round => {
                // A bevel is already within tolerance of the arc.
                if self.hw * (1.0 - cos_half) <= self.tolerance {
                    self.push(vec![v, o0, o1]);
                } else {
                    self.disk(v);
                }
            }
        }
    }

    /// Cap at `p`, where `out` points away from the stroke.
    fn cap(&mut self, p: Vec2, out: Vec2) {
        let off = out.perp() * self.hw;
        match self.style.cap {
            LineCap::Butt => {}
            LineCap::Square => {
                let ext = out * self.hw;
                self.push(vec![p + off, p - off, p - off + ext, p + off + ext]);
            }
            LineCap::Round => self.disk(p),
        }
    }

    fn disk(&mut self, c: Vec2) {
        let ratio = (1.0 - self.tolerance / self.hw).clamp(-1.0, 1.0);
        let step = 2.0 * ratio.acos();
        let segments = if step > 0.0 { (2.0 * PI / step).ceil() as usize } else { MAX_ROUND_SEGMENTS };
        let segments = segments.clamp(MIN_ROUND_SEGMENTS, MAX_ROUND_SEGMENTS);
        let poly = (0..segments)
            .map(|i| {
                let (s, co) = (i as f32 * 2.0 * PI / segments as f32).sin_cos();
                c + Vec2::new(co, s) * self.hw
            })
            .collect();
        self.push(poly);
    }

    fn push(&mut self, mut piece: Vec<Vec2>) {
        let area = signed_area(&piece);
        if area.abs() <= f32::EPSILON {
            return;
        }
        if area < 0.0 {
            piece.reverse();
        }
        self.pieces.push(piece);
    }
}

fn signed_area(points: &[Vec2]) -> f32 {
    let mut sum = 0.0;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        sum += points[j].cross(points[i]);
        j = i;
    }
    sum * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;
    use crate::geometry::{FillType, PathDirection};
    use crate::render::Mesh;

    fn style(width: f32, cap: LineCap, join: LineJoin) -> StrokeStyle {
        StrokeStyle { width, cap, join, miter_limit: 4.0 }
    }

    fn mesh(path: &Path, st: &StrokeStyle) -> Mesh {
        Mesh::from_contours(stroke_outline(path, st, 0.1), FillType::NonZero)
    }

    fn hline() -> Path {
        let mut p = Path::new();
        p.move_to(10.0, 10.0).line_to(50.0, 10.0);
        p
    }

    #[test]
    fn pieces_are_counter_clockwise() {
        let rect = Path::rect(Rect::new(0.0, 0.0, 30.0, 20.0), PathDirection::Ccw);
        for piece in stroke_outline(&rect, &style(4.0, LineCap::Round, LineJoin::Round), 0.1) {
            assert!(signed_area(&piece) > 0.0);
        }
    }

    #[test]
    fn butt_line_covers_its_width_only() {
        let m = mesh(&hline(), &style(4.0, LineCap::Butt, LineJoin::Miter));
        assert!(m.covers(Vec2::new(30.0, 11.9)));
        assert!(!m.covers(Vec2::new(30.0, 12.1)));
        assert!(!m.covers(Vec2::new(9.0, 10.0)));
        assert!(!m.covers(Vec2::new(51.0, 10.0)));
    }

    #[test]
    fn square_and_round_caps_extend() {
        let sq = mesh(&hline(), &style(4.0, LineCap::Square, LineJoin::Miter));
        assert!(sq.covers(Vec2::new(8.5, 11.5)));
        assert!(!sq.covers(Vec2::new(7.5, 10.0)));

        let rd = mesh(&hline(), &style(4.0, LineCap::Round, LineJoin::Miter));
        assert!(rd.covers(Vec2::new(8.5, 10.0)));
        assert!(!rd.covers(Vec2::new(8.5, 11.5)));
    }

    #[test]
    fn miter_falls_back_to_bevel_past_limit() {
        let mut sharp = Path::new();
        sharp.move_to(0.0, 0.0).line_to(100.0, 0.0).line_to(0.0, 10.0);
        let mitered = mesh(&sharp, &StrokeStyle { miter_limit: 100.0, ..style(4.0, LineCap::Butt, LineJoin::Miter) });
        let beveled = mesh(&sharp, &style(4.0, LineCap::Butt, LineJoin::Miter));
        // Far past the corner along the miter tip.
        let tip = Vec2::new(110.0, -1.0);
        assert!(mitered.covers(tip));
        assert!(!beveled.covers(tip));
    }

    #[test]
    fn right_angle_miter_fills_corner() {
        let square = Path::rect(Rect::new(0.0, 0.0, 20.0, 20.0), PathDirection::Cw);
        let m = mesh(&square, &style(4.0, LineCap::Butt, LineJoin::Miter));
        assert!(m.covers(Vec2::new(-1.9, -1.9)));
        assert!(!m.covers(Vec2::new(10.0, 10.0)));

        let b = mesh(&square, &style(4.0, LineCap::Butt, LineJoin::Bevel));
        assert!(!b.covers(Vec2::new(-1.9, -1.9)));
    }

    #[test]
    fn round_caps_stay_within_tolerance_of_the_circle() {
        let tol = 0.1;
        let hw = 10.0;
        let pieces = stroke_outline(&hline(), &style(2.0 * hw, LineCap::Round, LineJoin::Miter), tol);
        let disks: Vec<_> = pieces.iter().filter(|p| p.len() > 4).collect();
        assert_eq!(disks.len(), 2);
        for (disk, c) in disks.into_iter().zip([Vec2::new(10.0, 10.0), Vec2::new(50.0, 10.0)]) {
            for (i, &v) in disk.iter().enumerate() {
                assert!((v.distance(c) - hw).abs() < 1e-3);
                let mid = v.midpoint(disk[(i + 1) % disk.len()]);
                assert!(hw - mid.distance(c) <= tol + 1e-4, "chord sags {}", hw - mid.distance(c));
            }
        }
    }

    #[test]
    fn round_joins_stay_within_tolerance_of_the_arc() {
        let tol = 0.1;
        let hw = 10.0;
        for turn in [4.0f32, 10.0, 60.0, 150.0] {
            let (s, c) = turn.to_radians().sin_cos();
            let mut p = Path::new();
            p.move_to(0.0, 0.0).line_to(100.0, 0.0).line_to(100.0 + 100.0 * c, 100.0 * s);
            let joint = Vec2::new(100.0, 0.0);
            for piece in stroke_outline(&p, &style(2.0 * hw, LineCap::Butt, LineJoin::Round), tol) {
                if piece.len() == 4 {
                    continue;
                }
                // Every outer edge of a join piece sits close to the arc.
                for (i, &v) in piece.iter().enumerate() {
                    let w = piece[(i + 1) % piece.len()];
                    if v == joint || w == joint {
                        continue;
                    }
                    let sag = hw - v.midpoint(w).distance(joint);
                    assert!(sag <= tol + 1e-4, "turn {turn}: sag {sag}");
                }
            }
        }
    }

    #[test]
    fn zero_width_and_zero_length_give_nothing() {
        assert!(stroke_outline(&hline(), &style(0.0, LineCap::Butt, LineJoin::Miter), 0.1).is_empty());
        let mut dot = Path::new();
        dot.move_to(1.0, 1.0).line_to(1.0, 1.0);
        assert!(stroke_outline(&dot, &style(4.0, LineCap::Round, LineJoin::Round), 0.1).is_empty());
    }
}
