//! Device-space fill meshes and scanline coverage queries.

use bytemuck::{Pod, Zeroable};

use crate::coords::{Rect, Vec2};
use crate::geometry::FillType;

// ── vertex ────────────────────────────────────────────────────────────────

/// GPU-uploadable vertex, device pixels.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 2],
}

impl From<Vec2> for Vertex {
    #[inline]
    fn from(p: Vec2) -> Self {
        Vertex { pos: [p.x, p.y] }
    }
}

// ── spans ─────────────────────────────────────────────────────────────────

/// Half-open `[x0, x1)` run on one scanline.
pub type Span = (f32, f32);

/// Merges two sorted, disjoint span lists according to `keep(in_a, in_b)`.
fn combine(a: &[Span], b: &[Span], keep: impl Fn(bool, bool) -> bool) -> Vec<Span> {
    let mut xs: Vec<f32> = a.iter().chain(b).flat_map(|&(x0, x1)| [x0, x1]).collect();
    xs.sort_by(f32::total_cmp);
    xs.dedup();

    let inside = |spans: &[Span], x: f32| spans.iter().any(|&(x0, x1)| x0 <= x && x < x1);
    let mut out: Vec<Span> = Vec::new();
    for w in xs.windows(2) {
        let mid = (w[0] + w[1]) * 0.5;
        if keep(inside(a, mid), inside(b, mid)) {
            match out.last_mut() {
                Some(last) if last.1 == w[0] => last.1 = w[1],
                _ => out.push((w[0], w[1])),
            }
        }
    }
    out
}

pub(crate) fn union_spans(a: &[Span], b: &[Span]) -> Vec<Span> {
    if a.is_empty() {
        return b.to_vec();
    }
    if b.is_empty() {
        return a.to_vec();
    }
    combine(a, b, |x, y| x || y)
}

pub(crate) fn intersect_spans(a: &[Span], b: &[Span]) -> Vec<Span> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    combine(a, b, |x, y| x && y)
}

pub(crate) fn subtract_spans(a: &[Span], b: &[Span]) -> Vec<Span> {
    if a.is_empty() || b.is_empty() {
        return a.to_vec();
    }
    combine(a, b, |x, y| x && !y)
}

// ── mesh ──────────────────────────────────────────────────────────────────

/// Filled region in device space.
///
/// `contours` are implicitly closed polygons. `vertices` triangulates each
/// contour as a fan around its first point, the layout a stencil-then-cover
/// GPU backend consumes: the signed count of fan triangles covering a point
/// is its winding number, and the fill rule is applied to that count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    fill_type: FillType,
    contours: Vec<Vec<Vec2>>,
    /// Per contour `(min_y, max_y)` for scanline culling.
    extents: Vec<(f32, f32)>,
    vertices: Vec<Vertex>,
    bounds: Option<Rect>,
}

impl Mesh {
    /// Builds a mesh from closed polygons. Polygons with fewer than three
    /// points or non-finite coordinates cover nothing and are dropped.
    pub fn from_contours(contours: Vec<Vec<Vec2>>, fill_type: FillType) -> Self {
        let contours: Vec<Vec<Vec2>> = contours
            .into_iter()
            .filter(|c| c.len() >= 3 && c.iter().all(|p| p.is_finite()))
            .collect();

        let mut vertices = Vec::new();
        for c in &contours {
            for i in 1..c.len() - 1 {
                vertices.extend([Vertex::from(c[0]), Vertex::from(c[i]), Vertex::from(c[i + 1])]);
            }
        }

        let extents = contours
            .iter()
            .map(|c| {
                c.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)))
            })
            .collect();
        let bounds = Rect::from_points(contours.iter().flatten().copied());

        Self { fill_type, contours, extents, vertices, bounds }
    }

    #[inline]
    pub fn fill_type(&self) -> FillType {
        self.fill_type
    }

    #[inline]
    pub fn contours(&self) -> &[Vec<Vec2>] {
        &self.contours
    }

    /// Fan triangles, three vertices each.
    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Bounds of every contour point; `None` for an empty mesh.
    #[inline]
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    /// Edge crossings of the horizontal line at `y`, as `(x, direction)`.
    /// Edges count on `[min_y, max_y)` so shared vertices are not counted
    /// twice.
    fn crossings(&self, y: f32) -> Vec<(f32, i32)> {
        let mut out = Vec::new();
        for (c, &(lo, hi)) in self.contours.iter().zip(&self.extents) {
            if y < lo || y >= hi {
                continue;
            }
            let mut a = c[c.len() - 1];
            for &b in c {
                let dir = if a.y <= y && y < b.y {
                    1
                } else if b.y <= y && y < a.y {
                    -1
                } else {
                    a = b;
                    continue;
                };
                let x = a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y);
                out.push((x, dir));
                a = b;
            }
        }
        out
    }

    /// Winding number at `p`, from edge crossings to the right of it.
    ///
    /// Counter-clockwise contours (positive shoelace area) wind `+1`.
    pub fn winding_at(&self, p: Vec2) -> i32 {
        self.crossings(p.y).iter().filter(|(x, _)| *x > p.x).map(|(_, d)| d).sum()
    }

    /// Winding number at `p` from the fan triangles: the sum of the
    /// orientation signs of every triangle containing `p`.
    ///
    /// Agrees with [`winding_at`](Self::winding_at) for points off every
    /// edge and fan diagonal.
    pub fn fan_winding_at(&self, p: Vec2) -> i32 {
        let mut winding = 0;
        for tri in self.vertices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|v| Vec2::new(v.pos[0], v.pos[1]));
            let area = (b - a).cross(c - a);
            if area == 0.0 {
                continue;
            }
            let s = area.signum();
            let inside = (b - a).cross(p - a) * s > 0.0
                && (c - b).cross(p - b) * s > 0.0
                && (a - c).cross(p - c) * s > 0.0;
            if inside {
                winding += s as i32;
            }
        }
        winding
    }

    /// True when the fill rule puts `p` inside.
    #[inline]
    pub fn covers(&self, p: Vec2) -> bool {
        self.fill_type.is_inside(self.winding_at(p))
    }

    /// Covered runs of the scanline at `y`, sorted and disjoint.
    pub fn spans(&self, y: f32) -> Vec<Span> {
        let mut xs = self.crossings(y);
        if xs.is_empty() {
            return Vec::new();
        }
        xs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut out: Vec<Span> = Vec::new();
        let mut winding = 0;
        for w in xs.windows(2) {
            winding += w[0].1;
            if w[1].0 > w[0].0 && self.fill_type.is_inside(winding) {
                match out.last_mut() {
                    Some(last) if last.1 == w[0].0 => last.1 = w[1].0,
                    _ => out.push((w[0].0, w[1].0)),
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f32, y: f32, s: f32) -> Vec<Vec2> {
        vec![Vec2::new(x, y), Vec2::new(x + s, y), Vec2::new(x + s, y + s), Vec2::new(x, y + s)]
    }

    // ── winding ──────────────────────────────────────────────────────────

    #[test]
    fn fan_and_crossing_winding_agree() {
        let star = vec![
            Vec2::new(50.0, 0.0),
            Vec2::new(79.4, 90.5),
            Vec2::new(2.4, 34.5),
            Vec2::new(97.6, 34.5),
            Vec2::new(20.6, 90.5),
        ];
        let mut outer = square(-10.0, -10.0, 120.0);
        outer.reverse();
        let mesh = Mesh::from_contours(vec![star, outer], FillType::NonZero);
        for i in 0..40 {
            for j in 0..40 {
                let p = Vec2::new(-7.3 + i as f32 * 3.01, -8.9 + j as f32 * 2.97);
                assert_eq!(mesh.winding_at(p), mesh.fan_winding_at(p), "at {p:?}");
            }
        }
    }

    #[test]
    fn nested_same_direction_winds_twice() {
        let mesh = Mesh::from_contours(vec![square(0.0, 0.0, 10.0), square(2.0, 2.0, 4.0)], FillType::NonZero);
        assert_eq!(mesh.winding_at(Vec2::new(4.0, 4.0)).abs(), 2);
        assert!(mesh.covers(Vec2::new(4.0, 4.0)));

        let eo = Mesh::from_contours(vec![square(0.0, 0.0, 10.0), square(2.0, 2.0, 4.0)], FillType::EvenOdd);
        assert!(!eo.covers(Vec2::new(4.0, 4.0)));
        assert!(eo.covers(Vec2::new(1.0, 1.0)));
    }

    #[test]
    fn degenerate_contours_are_dropped() {
        let mesh = Mesh::from_contours(vec![vec![Vec2::zero(), Vec2::new(1.0, 1.0)]], FillType::NonZero);
        assert!(mesh.is_empty());
        assert!(mesh.bounds().is_none());
        assert_eq!(mesh.triangle_count(), 0);
    }

    // ── spans ────────────────────────────────────────────────────────────

    #[test]
    fn spans_of_square_with_hole() {
        let mut hole = square(3.0, 3.0, 4.0);
        hole.reverse();
        let mesh = Mesh::from_contours(vec![square(0.0, 0.0, 10.0), hole], FillType::NonZero);
        assert_eq!(mesh.spans(5.0), vec![(0.0, 3.0), (7.0, 10.0)]);
        assert_eq!(mesh.spans(1.0), vec![(0.0, 10.0)]);
        assert!(mesh.spans(10.0).is_empty());
    }

    #[test]
    fn span_set_operations() {
        let a = [(0.0, 10.0)];
        let b = [(5.0, 15.0), (20.0, 25.0)];
        assert_eq!(union_spans(&a, &b), vec![(0.0, 15.0), (20.0, 25.0)]);
        assert_eq!(intersect_spans(&a, &b), vec![(5.0, 10.0)]);
        assert_eq!(subtract_spans(&a, &b), vec![(0.0, 5.0)]);
        assert_eq!(subtract_spans(&a, &[]), vec![(0.0, 10.0)]);
        assert!(intersect_spans(&a, &[]).is_empty());
    }

    #[test]
    fn vertices_are_pod() {
        let mesh = Mesh::from_contours(vec![square(0.0, 0.0, 1.0)], FillType::NonZero);
        let bytes: &[u8] = bytemuck::cast_slice(mesh.vertices());
        assert_eq!(bytes.len(), 6 * std::mem::size_of::<Vertex>());
    }
}
