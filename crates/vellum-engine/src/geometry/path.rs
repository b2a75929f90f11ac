use crate::coords::{Matrix, RRect, Rect, Vec2};
use crate::error::{Error, Result};

use super::flatten::{self, Contour};

/// Cubic control-point distance for a quarter circle: `4/3 * (sqrt(2) - 1)`.
pub const KAPPA: f32 = 0.552_284_8;

/// Interior classification for self-intersecting or nested contours.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum FillType {
    /// Inside where the winding number is non-zero.
    #[default]
    NonZero,
    /// Inside where the winding number is odd.
    EvenOdd,
}

impl FillType {
    #[inline]
    pub fn is_inside(self, winding: i32) -> bool {
        match self {
            FillType::NonZero => winding != 0,
            FillType::EvenOdd => winding & 1 != 0,
        }
    }
}

/// Contour direction for the primitive builders (`add_rect`, `add_oval`, ...).
///
/// `Cw` is clockwise as seen on a +Y-down screen: a rect starts at its
/// top-left corner and visits top-right next.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum PathDirection {
    #[default]
    Cw,
    Ccw,
}

/// Which of the two candidate ellipse arcs [`Path::elliptical_arc_to`] takes.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum ArcSize {
    #[default]
    Small,
    Large,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PathVerb {
    Move,
    Line,
    Quad,
    /// Rational quadratic; its weight is stored alongside the path.
    Conic,
    Cubic,
    Close,
}

impl PathVerb {
    /// Number of points the verb consumes.
    #[inline]
    pub const fn point_count(self) -> usize {
        match self {
            PathVerb::Move | PathVerb::Line => 1,
            PathVerb::Quad | PathVerb::Conic => 2,
            PathVerb::Cubic => 3,
            PathVerb::Close => 0,
        }
    }
}

/// Path element with resolved points, yielded by [`Path::iter`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PathEl {
    MoveTo(Vec2),
    LineTo(Vec2),
    QuadTo(Vec2, Vec2),
    /// Control point, end point and weight.
    ConicTo(Vec2, Vec2, f32),
    CubicTo(Vec2, Vec2, Vec2),
    Close,
}

/// Ordered sequence of verbs with their point data, plus a fill type.
///
/// Drawing never mutates a path; effects and transforms return new paths.
/// Drawing verbs issued without a preceding `move_to` start a contour at the
/// last move point (or the origin), as Skia does.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    verbs: Vec<PathVerb>,
    points: Vec<Vec2>,
    conic_weights: Vec<f32>,
    fill_type: FillType,
    last_move: Vec2,
    needs_move: bool,
}

impl Default for Path {
    fn default() -> Self {
        Self::new()
    }
}

impl Path {
    pub fn new() -> Self {
        Self {
            verbs: Vec::new(),
            points: Vec::new(),
            conic_weights: Vec::new(),
            fill_type: FillType::NonZero,
            last_move: Vec2::zero(),
            needs_move: true,
        }
    }

    pub fn with_fill_type(fill_type: FillType) -> Self {
        Self { fill_type, ..Self::new() }
    }

    /// Closed rectangle contour.
    pub fn rect(rect: Rect, dir: PathDirection) -> Self {
        let mut p = Path::new();
        p.add_rect(rect, dir);
        p
    }

    /// Closed ellipse contour inscribed in `rect`.
    pub fn oval(rect: Rect, dir: PathDirection) -> Self {
        let mut p = Path::new();
        p.add_oval(rect, dir);
        p
    }

    pub fn rrect(rrect: &RRect, dir: PathDirection) -> Self {
        let mut p = Path::new();
        p.add_rrect(rrect, dir);
        p
    }

    /// Circle of radius `r`. Negative radii are rejected; a zero radius gives
    /// an empty path.
    pub fn circle(cx: f32, cy: f32, r: f32, dir: PathDirection) -> Result<Self> {
        let mut p = Path::new();
        p.add_circle(cx, cy, r, dir)?;
        Ok(p)
    }

    #[inline]
    pub fn fill_type(&self) -> FillType {
        self.fill_type
    }

    #[inline]
    pub fn set_fill_type(&mut self, fill_type: FillType) {
        self.fill_type = fill_type;
    }

    #[inline]
    pub fn verbs(&self) -> &[PathVerb] {
        &self.verbs
    }

    #[inline]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// One weight per `Conic` verb, in verb order.
    #[inline]
    pub fn conic_weights(&self) -> &[f32] {
        &self.conic_weights
    }

    /// Where the next drawing verb starts.
    pub fn last_point(&self) -> Vec2 {
        if self.needs_move {
            self.last_move
        } else {
            self.points.last().copied().unwrap_or(self.last_move)
        }
    }

    /// True when the path has no drawing verbs (only moves, or nothing).
    pub fn is_empty(&self) -> bool {
        !self.verbs.iter().any(|v| !matches!(v, PathVerb::Move))
    }

    pub fn reset(&mut self) {
        let fill_type = self.fill_type;
        *self = Self::with_fill_type(fill_type);
    }

    // ── builders ──────────────────────────────────────────────────────────

    pub fn move_to(&mut self, x: f32, y: f32) -> &mut Self {
        let p = Vec2::new(x, y);
        // Consecutive moves collapse into the last one.
        if let Some(PathVerb::Move) = self.verbs.last() {
            if let Some(last) = self.points.last_mut() {
                *last = p;
            }
        } else {
            self.verbs.push(PathVerb::Move);
            self.points.push(p);
        }
        self.last_move = p;
        self.needs_move = false;
        self
    }

    pub fn line_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.inject_move();
        self.verbs.push(PathVerb::Line);
        self.points.push(Vec2::new(x, y));
        self
    }

    pub fn quad_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> &mut Self {
        self.inject_move();
        self.verbs.push(PathVerb::Quad);
        self.points.extend([Vec2::new(x1, y1), Vec2::new(x2, y2)]);
        self
    }

    /// Conic from the last point through `(x1, y1)` to `(x2, y2)`.
    ///
    /// A weight of 1 is a quad. Non-positive weights degrade to a line to the
    /// end point, an infinite weight to two lines through the control point.
    pub fn conic_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, weight: f32) -> &mut Self {
        if !(weight > 0.0) {
            return self.line_to(x2, y2);
        }
        if weight.is_infinite() {
            self.line_to(x1, y1);
            return self.line_to(x2, y2);
        }
        if weight == 1.0 {
            return self.quad_to(x1, y1, x2, y2);
        }
        self.inject_move();
        self.verbs.push(PathVerb::Conic);
        self.points.extend([Vec2::new(x1, y1), Vec2::new(x2, y2)]);
        self.conic_weights.push(weight);
        self
    }

    #[allow(clippy::too_many_arguments)]
    pub fn cubic_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) -> &mut Self {
        self.inject_move();
        self.verbs.push(PathVerb::Cubic);
        self.points.extend([Vec2::new(x1, y1), Vec2::new(x2, y2), Vec2::new(x3, y3)]);
        self
    }

    /// Circular arc of `radius` tangent to the lines from the last point to
    /// `(x1, y1)` and from there to `(x2, y2)`, preceded by a line to the
    /// first tangent point. Collinear input or a zero radius is a line to
    /// `(x1, y1)`.
    pub fn arc_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, radius: f32) -> &mut Self {
        if radius == 0.0 {
            return self.line_to(x1, y1);
        }
        let start = self.last_point();
        let (bx, by) = unit_f64(x1 as f64 - start.x as f64, y1 as f64 - start.y as f64);
        let (ax, ay) = unit_f64(x2 as f64 - x1 as f64, y2 as f64 - y1 as f64);
        let cos = bx * ax + by * ay;
        let sin = bx * ay - by * ax;
        if !(bx.is_finite() && ax.is_finite()) || (sin as f32).abs() <= NEARLY_ZERO {
            return self.line_to(x1, y1);
        }

        let dist = (radius as f64 * (1.0 - cos) / sin).abs();
        self.line_to((x1 as f64 - dist * bx) as f32, (y1 as f64 - dist * by) as f32);
        let weight = (0.5 + cos * 0.5).sqrt() as f32;
        self.conic_to(x1, y1, (x1 as f64 + ax * dist) as f32, (y1 as f64 + ay * dist) as f32, weight)
    }

    /// SVG-style elliptical arc from the last point to `(x, y)`.
    ///
    /// `x_axis_rotate` is in degrees, clockwise on screen. `sweep` picks the
    /// direction of travel: `Cw` sweeps clockwise as seen on screen. Radii
    /// too small to reach the end point are scaled up; a zero radius is a
    /// straight line.
    #[allow(clippy::too_many_arguments)]
    pub fn elliptical_arc_to(
        &mut self,
        rx: f32,
        ry: f32,
        x_axis_rotate: f32,
        size: ArcSize,
        sweep: PathDirection,
        x: f32,
        y: f32,
    ) -> &mut Self {
        let start = self.last_point();
        let end = Vec2::new(x, y);
        if start == end {
            return self;
        }
        let (mut rx, mut ry) = (rx.abs() as f64, ry.abs() as f64);
        if rx == 0.0 || ry == 0.0 || !rx.is_finite() || !ry.is_finite() {
            return self.line_to(x, y);
        }

        let (sin_phi, cos_phi) = (x_axis_rotate as f64).to_radians().sin_cos();
        let hx = (start.x as f64 - x as f64) * 0.5;
        let hy = (start.y as f64 - y as f64) * 0.5;
        let x1p = cos_phi * hx + sin_phi * hy;
        let y1p = -sin_phi * hx + cos_phi * hy;

        let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
        if lambda > 1.0 {
            rx *= lambda.sqrt();
            ry *= lambda.sqrt();
        }

        let clockwise = sweep == PathDirection::Cw;
        let num = rx * rx * ry * ry - rx * rx * y1p * y1p - ry * ry * x1p * x1p;
        let den = rx * rx * y1p * y1p + ry * ry * x1p * x1p;
        let mut coef = if den > 0.0 { (num / den).max(0.0).sqrt() } else { 0.0 };
        if (size == ArcSize::Large) == clockwise {
            coef = -coef;
        }
        let cxp = coef * rx * y1p / ry;
        let cyp = -coef * ry * x1p / rx;
        let cx = cos_phi * cxp - sin_phi * cyp + (start.x as f64 + x as f64) * 0.5;
        let cy = sin_phi * cxp + cos_phi * cyp + (start.y as f64 + y as f64) * 0.5;

        let theta1 = ((y1p - cyp) / ry).atan2((x1p - cxp) / rx);
        let theta2 = ((-y1p - cyp) / ry).atan2((-x1p - cxp) / rx);
        let mut delta = theta2 - theta1;
        if clockwise && delta < 0.0 {
            delta += std::f64::consts::TAU;
        } else if !clockwise && delta > 0.0 {
            delta -= std::f64::consts::TAU;
        }

        // Quarter turns at most, one conic each.
        let segments = (delta.abs() / std::f64::consts::FRAC_PI_2 - 1e-6).ceil().max(1.0) as usize;
        let step = delta / segments as f64;
        let weight = (step * 0.5).cos();
        let map = |ux: f64, uy: f64| {
            let px = ux * rx;
            let py = uy * ry;
            ((cos_phi * px - sin_phi * py + cx) as f32, (sin_phi * px + cos_phi * py + cy) as f32)
        };
        for i in 0..segments {
            let a0 = theta1 + step * i as f64;
            let mid = a0 + step * 0.5;
            let (cx1, cy1) = map(mid.cos() / weight, mid.sin() / weight);
            let (ex, ey) = if i + 1 == segments { (x, y) } else { map((a0 + step).cos(), (a0 + step).sin()) };
            self.conic_to(cx1, cy1, ex, ey, weight as f32);
        }
        self
    }

    pub fn close(&mut self) -> &mut Self {
        // A lone move has nothing to close.
        if !matches!(self.verbs.last(), None | Some(PathVerb::Close) | Some(PathVerb::Move)) {
            self.verbs.push(PathVerb::Close);
        }
        self.needs_move = true;
        self
    }

    pub fn add_rect(&mut self, rect: Rect, dir: PathDirection) -> &mut Self {
        let r = rect.normalized();
        let (l, t, rt, b) = (r.left(), r.top(), r.right(), r.bottom());
        self.move_to(l, t);
        match dir {
            PathDirection::Cw => {
                self.line_to(rt, t);
                self.line_to(rt, b);
                self.line_to(l, b);
            }
            PathDirection::Ccw => {
                self.line_to(l, b);
                self.line_to(rt, b);
                self.line_to(rt, t);
            }
        }
        self.close()
    }

    /// Ellipse inscribed in `rect`, as four cubic arcs starting at the
    /// right-most point.
    pub fn add_oval(&mut self, rect: Rect, dir: PathDirection) -> &mut Self {
        let r = rect.normalized();
        if r.is_empty() {
            return self;
        }
        let c = r.center();
        let rx = r.width() * 0.5;
        let ry = r.height() * 0.5;
        let kx = rx * KAPPA;
        let ky = ry * KAPPA;

        self.move_to(c.x + rx, c.y);
        match dir {
            PathDirection::Cw => {
                self.cubic_to(c.x + rx, c.y + ky, c.x + kx, c.y + ry, c.x, c.y + ry);
                self.cubic_to(c.x - kx, c.y + ry, c.x - rx, c.y + ky, c.x - rx, c.y);
                self.cubic_to(c.x - rx, c.y - ky, c.x - kx, c.y - ry, c.x, c.y - ry);
                self.cubic_to(c.x + kx, c.y - ry, c.x + rx, c.y - ky, c.x + rx, c.y);
            }
            PathDirection::Ccw => {
                self.cubic_to(c.x + rx, c.y - ky, c.x + kx, c.y - ry, c.x, c.y - ry);
                self.cubic_to(c.x - kx, c.y - ry, c.x - rx, c.y - ky, c.x - rx, c.y);
                self.cubic_to(c.x - rx, c.y + ky, c.x - kx, c.y + ry, c.x, c.y + ry);
                self.cubic_to(c.x + kx, c.y + ry, c.x + rx, c.y + ky, c.x + rx, c.y);
            }
        }
        self.close()
    }

    pub fn add_circle(&mut self, cx: f32, cy: f32, r: f32, dir: PathDirection) -> Result<&mut Self> {
        if !r.is_finite() || r < 0.0 {
            return Err(Error::invalid(format!("circle radius must be finite and >= 0, got {r}")));
        }
        if r == 0.0 {
            return Ok(self);
        }
        Ok(self.add_oval(Rect::new(cx - r, cy - r, 2.0 * r, 2.0 * r), dir))
    }

    pub fn add_rrect(&mut self, rrect: &RRect, dir: PathDirection) -> &mut Self {
        let r = rrect.rect();
        if r.is_empty() {
            return self;
        }
        if rrect.is_rect() {
            return self.add_rect(r, dir);
        }
        if rrect.is_oval() {
            return self.add_oval(r, dir);
        }

        let mut cw = Path::new();
        let radii = rrect.radii();
        let (l, t, rt, b) = (r.left(), r.top(), r.right(), r.bottom());
        let (tl, tr, br, bl) = (radii.top_left, radii.top_right, radii.bottom_right, radii.bottom_left);

        cw.move_to(l + tl.x, t);
        cw.line_to(rt - tr.x, t);
        if tr != Vec2::zero() {
            cw.cubic_to(rt - tr.x * (1.0 - KAPPA), t, rt, t + tr.y * (1.0 - KAPPA), rt, t + tr.y);
        }
        cw.line_to(rt, b - br.y);
        if br != Vec2::zero() {
            cw.cubic_to(rt, b - br.y * (1.0 - KAPPA), rt - br.x * (1.0 - KAPPA), b, rt - br.x, b);
        }
        cw.line_to(l + bl.x, b);
        if bl != Vec2::zero() {
            cw.cubic_to(l + bl.x * (1.0 - KAPPA), b, l, b - bl.y * (1.0 - KAPPA), l, b - bl.y);
        }
        cw.line_to(l, t + tl.y);
        if tl != Vec2::zero() {
            cw.cubic_to(l, t + tl.y * (1.0 - KAPPA), l + tl.x * (1.0 - KAPPA), t, l + tl.x, t);
        }
        cw.close();

        match dir {
            PathDirection::Cw => self.add_path(&cw),
            PathDirection::Ccw => self.add_path(&cw.reversed()),
        }
    }

    /// Appends every contour of `other`.
    pub fn add_path(&mut self, other: &Path) -> &mut Self {
        for el in other.iter() {
            match el {
                PathEl::MoveTo(p) => {
                    self.move_to(p.x, p.y);
                }
                PathEl::LineTo(p) => {
                    self.line_to(p.x, p.y);
                }
                PathEl::QuadTo(c, p) => {
                    self.quad_to(c.x, c.y, p.x, p.y);
                }
                PathEl::ConicTo(c, p, w) => {
                    self.conic_to(c.x, c.y, p.x, p.y, w);
                }
                PathEl::CubicTo(c1, c2, p) => {
                    self.cubic_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y);
                }
                PathEl::Close => {
                    self.close();
                }
            }
        }
        self
    }

    fn inject_move(&mut self) {
        if self.needs_move {
            let p = self.last_move;
            self.move_to(p.x, p.y);
        }
    }

    // ── queries ───────────────────────────────────────────────────────────

    pub fn iter(&self) -> PathIter<'_> {
        PathIter { path: self, verb: 0, point: 0, weight: 0 }
    }

    /// Bounds of all points, control points included. `None` for a path
    /// without points.
    pub fn bounds(&self) -> Option<Rect> {
        Rect::from_points(self.points.iter().copied())
    }

    /// Returns a copy with every point mapped through `matrix`.
    pub fn transformed(&self, matrix: &Matrix) -> Path {
        if matrix.is_identity() {
            return self.clone();
        }
        let mut out = self.clone();
        for p in &mut out.points {
            *p = matrix.map_point(*p);
        }
        out.last_move = matrix.map_point(out.last_move);
        out
    }

    /// Returns a copy with every contour traversed in the opposite direction.
    pub fn reversed(&self) -> Path {
        let mut out = Path::with_fill_type(self.fill_type);
        for contour in self.split_contours() {
            let Some(&start) = contour.points.first() else { continue };
            let end = contour.points.last().copied().unwrap_or(start);
            out.move_to(end.x, end.y);

            // Walk segments backwards; each segment's own point run reverses.
            let mut idx = contour.points.len() - 1;
            let mut weights = contour.weights.iter().rev();
            for verb in contour.verbs.iter().rev() {
                let n = verb.point_count();
                let seg = &contour.points[idx - n..=idx];
                match verb {
                    PathVerb::Line => {
                        out.line_to(seg[0].x, seg[0].y);
                    }
                    PathVerb::Quad => {
                        out.quad_to(seg[1].x, seg[1].y, seg[0].x, seg[0].y);
                    }
                    PathVerb::Conic => {
                        let w = weights.next().copied().unwrap_or(1.0);
                        out.conic_to(seg[1].x, seg[1].y, seg[0].x, seg[0].y, w);
                    }
                    PathVerb::Cubic => {
                        out.cubic_to(seg[2].x, seg[2].y, seg[1].x, seg[1].y, seg[0].x, seg[0].y);
                    }
                    PathVerb::Move | PathVerb::Close => {}
                }
                idx -= n;
            }
            if contour.closed {
                out.close();
            }
        }
        out
    }

    /// Flattens every contour into a polyline whose distance from the true
    /// curve is at most `tolerance` (in this path's units).
    pub fn flatten(&self, tolerance: f32) -> Vec<Contour> {
        flatten::flatten(self, tolerance)
    }

    fn split_contours(&self) -> Vec<RawContour> {
        let mut out: Vec<RawContour> = Vec::new();
        let mut pi = 0usize;
        let mut wi = 0usize;
        for &verb in &self.verbs {
            match verb {
                PathVerb::Move => {
                    out.push(RawContour {
                        points: vec![self.points[pi]],
                        verbs: Vec::new(),
                        weights: Vec::new(),
                        closed: false,
                    });
                }
                PathVerb::Close => {
                    if let Some(c) = out.last_mut() {
                        c.closed = true;
                    }
                }
                _ => {
                    if let Some(c) = out.last_mut() {
                        c.verbs.push(verb);
                        c.points.extend_from_slice(&self.points[pi..pi + verb.point_count()]);
                        if verb == PathVerb::Conic {
                            c.weights.push(self.conic_weights[wi]);
                        }
                    }
                    if verb == PathVerb::Conic {
                        wi += 1;
                    }
                }
            }
            pi += verb.point_count();
        }
        out.retain(|c| !c.verbs.is_empty());
        out
    }
}

struct RawContour {
    points: Vec<Vec2>,
    verbs: Vec<PathVerb>,
    weights: Vec<f32>,
    closed: bool,
}

/// Below this, a sine is treated as zero (Skia's `SK_ScalarNearlyZero`).
const NEARLY_ZERO: f32 = 1.0 / 4096.0;

fn unit_f64(x: f64, y: f64) -> (f64, f64) {
    let len = (x * x + y * y).sqrt();
    (x / len, y / len)
}

/// Iterator over [`PathEl`]s.
pub struct PathIter<'a> {
    path: &'a Path,
    verb: usize,
    point: usize,
    weight: usize,
}

impl Iterator for PathIter<'_> {
    type Item = PathEl;

    fn next(&mut self) -> Option<PathEl> {
        let verb = *self.path.verbs.get(self.verb)?;
        let pts = &self.path.points[self.point..self.point + verb.point_count()];
        self.verb += 1;
        self.point += verb.point_count();
        Some(match verb {
            PathVerb::Move => PathEl::MoveTo(pts[0]),
            PathVerb::Line => PathEl::LineTo(pts[0]),
            PathVerb::Quad => PathEl::QuadTo(pts[0], pts[1]),
            PathVerb::Conic => {
                let w = self.path.conic_weights[self.weight];
                self.weight += 1;
                PathEl::ConicTo(pts[0], pts[1], w)
            }
            PathVerb::Cubic => PathEl::CubicTo(pts[0], pts[1], pts[2]),
            PathVerb::Close => PathEl::Close,
        })
    }
}
