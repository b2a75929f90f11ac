use crate::coords::Vec2;

use super::flatten::Contour;
use super::path::Path;

/// Arc-length parameterization of one flattened contour.
///
/// Closed contours carry their closing edge explicitly, so distance `length()`
/// lands back on the start point.
#[derive(Debug, Clone)]
pub struct ContourMeasure {
    points: Vec<Vec2>,
    /// `distances[i]` is the arc length from `points[0]` to `points[i]`.
    distances: Vec<f32>,
    closed: bool,
}

impl ContourMeasure {
    fn new(contour: &Contour, force_closed: bool) -> Option<Self> {
        let closed = contour.closed || force_closed;
        let mut points = contour.points.clone();
        if closed {
            points.push(contour.points[0]);
        }

        let mut distances = Vec::with_capacity(points.len());
        let mut acc = 0.0f32;
        distances.push(0.0);
        for w in points.windows(2) {
            acc += w[0].distance(w[1]);
            distances.push(acc);
        }
        if acc <= 0.0 || !acc.is_finite() {
            return None;
        }
        Some(Self { points, distances, closed })
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.distances.last().copied().unwrap_or(0.0)
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Index `i` of the segment `points[i]..points[i + 1]` containing `d`, and
    /// the interpolation factor within it.
    fn locate(&self, d: f32) -> (usize, f32) {
        let d = d.clamp(0.0, self.length());
        let i = self.distances.partition_point(|&x| x < d).saturating_sub(1);
        let i = i.min(self.points.len() - 2);
        let seg = self.distances[i + 1] - self.distances[i];
        let t = if seg > 0.0 { (d - self.distances[i]) / seg } else { 0.0 };
        (i, t.clamp(0.0, 1.0))
    }

    /// Position and unit tangent at arc length `distance` (clamped to the
    /// contour). `None` only if the tangent is degenerate.
    pub fn pos_tan(&self, distance: f32) -> Option<(Vec2, Vec2)> {
        let (i, t) = self.locate(distance);
        let a = self.points[i];
        let b = self.points[i + 1];
        let tangent = (b - a).normalize()?;
        Some((a.lerp(b, t), tangent))
    }

    /// Appends the piece between `start` and `stop` to `dst` as line segments.
    ///
    /// With `start_with_move` false the piece continues the current contour
    /// of `dst` (used to join a dash across a closed contour's seam).
    /// Returns false when the range is empty.
    pub fn segment(&self, start: f32, stop: f32, dst: &mut Path, start_with_move: bool) -> bool {
        let len = self.length();
        let start = start.max(0.0);
        let stop = stop.min(len);
        if !(start < stop) {
            return false;
        }

        let (si, st) = self.locate(start);
        let (ei, et) = self.locate(stop);
        let p0 = self.points[si].lerp(self.points[si + 1], st);
        if start_with_move {
            dst.move_to(p0.x, p0.y);
        } else {
            dst.line_to(p0.x, p0.y);
        }
        for p in &self.points[si + 1..=ei] {
            dst.line_to(p.x, p.y);
        }
        let p1 = self.points[ei].lerp(self.points[ei + 1], et);
        dst.line_to(p1.x, p1.y);
        true
    }
}

/// Iterates the measurable contours of a path.
///
/// Contours of zero length are skipped. `force_closed` treats every contour
/// as closed, as filling does.
#[derive(Debug, Clone)]
pub struct PathMeasure {
    contours: Vec<ContourMeasure>,
}

impl PathMeasure {
    pub fn new(path: &Path, force_closed: bool, tolerance: f32) -> Self {
        let contours = path
            .flatten(tolerance)
            .iter()
            .filter_map(|c| ContourMeasure::new(c, force_closed))
            .collect();
        Self { contours }
    }

    #[inline]
    pub fn contours(&self) -> &[ContourMeasure] {
        &self.contours
    }

    pub fn total_length(&self) -> f32 {
        self.contours.iter().map(ContourMeasure::length).sum()
    }
}

impl<'a> IntoIterator for &'a PathMeasure {
    type Item = &'a ContourMeasure;
    type IntoIter = std::slice::Iter<'a, ContourMeasure>;

    fn into_iter(self) -> Self::IntoIter {
        self.contours.iter()
    }
}
