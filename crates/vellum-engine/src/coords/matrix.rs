use super::{Rect, Vec2};

/// 3x3 transform, row-major:
///
/// ```text
/// | sx  kx  tx |
/// | ky  sy  ty |
/// | p0  p1  p2 |
/// ```
///
/// Points are column vectors: `p' = M * p`. Composition is explicit:
/// [`Matrix::multiply`]`(a, b)` is `a ∘ b`, i.e. `b` is applied to points
/// first and `a` second.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Matrix {
    m: [f32; 9],
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix { m: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0] };

    #[allow(clippy::too_many_arguments)]
    #[inline]
    pub const fn new(sx: f32, kx: f32, tx: f32, ky: f32, sy: f32, ty: f32, p0: f32, p1: f32, p2: f32) -> Self {
        Self { m: [sx, kx, tx, ky, sy, ty, p0, p1, p2] }
    }

    #[inline]
    pub const fn translate(dx: f32, dy: f32) -> Self {
        Self::new(1.0, 0.0, dx, 0.0, 1.0, dy, 0.0, 0.0, 1.0)
    }

    #[inline]
    pub const fn scale(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, 0.0, sy, 0.0, 0.0, 0.0, 1.0)
    }

    /// Rotation by `degrees` about the origin. With +Y down, positive angles
    /// turn clockwise on screen.
    pub fn rotate(degrees: f32) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        Self::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0)
    }

    /// Rotation by `degrees` about `(px, py)`.
    pub fn rotate_about(degrees: f32, px: f32, py: f32) -> Self {
        Matrix::multiply(
            &Matrix::translate(px, py),
            &Matrix::multiply(&Matrix::rotate(degrees), &Matrix::translate(-px, -py)),
        )
    }

    #[inline]
    pub const fn skew(kx: f32, ky: f32) -> Self {
        Self::new(1.0, kx, 0.0, ky, 1.0, 0.0, 0.0, 0.0, 1.0)
    }

    /// `a ∘ b`: the result maps a point through `b`, then through `a`.
    pub fn multiply(a: &Matrix, b: &Matrix) -> Matrix {
        let a = &a.m;
        let b = &b.m;
        let mut out = [0.0f32; 9];
        for row in 0..3 {
            for col in 0..3 {
                out[row * 3 + col] = a[row * 3] * b[col]
                    + a[row * 3 + 1] * b[3 + col]
                    + a[row * 3 + 2] * b[6 + col];
            }
        }
        Matrix { m: out }
    }

    /// `self ∘ other`: `other` is applied to points first.
    #[inline]
    pub fn pre_concat(&self, other: &Matrix) -> Matrix {
        Matrix::multiply(self, other)
    }

    /// `other ∘ self`: `other` is applied after `self`.
    #[inline]
    pub fn post_concat(&self, other: &Matrix) -> Matrix {
        Matrix::multiply(other, self)
    }

    #[inline]
    pub fn values(&self) -> [f32; 9] {
        self.m
    }

    #[inline]
    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.m[2], self.m[5])
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    #[inline]
    pub fn has_perspective(&self) -> bool {
        self.m[6] != 0.0 || self.m[7] != 0.0 || self.m[8] != 1.0
    }

    pub fn map_point(&self, p: Vec2) -> Vec2 {
        let m = &self.m;
        let x = m[0] * p.x + m[1] * p.y + m[2];
        let y = m[3] * p.x + m[4] * p.y + m[5];
        if !self.has_perspective() {
            return Vec2::new(x, y);
        }
        let w = m[6] * p.x + m[7] * p.y + m[8];
        if w.abs() <= f32::EPSILON {
            return Vec2::new(x, y);
        }
        Vec2::new(x / w, y / w)
    }

    /// Maps a direction (ignores translation and perspective).
    #[inline]
    pub fn map_vector(&self, v: Vec2) -> Vec2 {
        Vec2::new(self.m[0] * v.x + self.m[1] * v.y, self.m[3] * v.x + self.m[4] * v.y)
    }

    /// Bounds of the four mapped corners.
    pub fn map_rect(&self, r: Rect) -> Rect {
        let r = r.normalized();
        let corners = [
            Vec2::new(r.left(), r.top()),
            Vec2::new(r.right(), r.top()),
            Vec2::new(r.right(), r.bottom()),
            Vec2::new(r.left(), r.bottom()),
        ];
        Rect::from_points(corners.map(|c| self.map_point(c))).unwrap_or_default()
    }

    /// Largest stretch factor of the linear part (the larger singular value).
    ///
    /// Used to turn a device-space tolerance into a local-space one.
    pub fn max_scale(&self) -> f32 {
        let (a, b, c, d) = (self.m[0], self.m[1], self.m[3], self.m[4]);
        let s = (a * a + b * b + c * c + d * d) * 0.5;
        let det = a * d - b * c;
        let disc = (s * s - det * det).max(0.0).sqrt();
        (s + disc).max(0.0).sqrt()
    }

    pub fn invert(&self) -> Option<Matrix> {
        let m = &self.m;
        let c00 = m[4] * m[8] - m[5] * m[7];
        let c01 = m[5] * m[6] - m[3] * m[8];
        let c02 = m[3] * m[7] - m[4] * m[6];
        let det = m[0] * c00 + m[1] * c01 + m[2] * c02;
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv_det = 1.0 / det;
        let out = [
            c00 * inv_det,
            (m[2] * m[7] - m[1] * m[8]) * inv_det,
            (m[1] * m[5] - m[2] * m[4]) * inv_det,
            c01 * inv_det,
            (m[0] * m[8] - m[2] * m[6]) * inv_det,
            (m[2] * m[3] - m[0] * m[5]) * inv_det,
            c02 * inv_det,
            (m[1] * m[6] - m[0] * m[7]) * inv_det,
            (m[0] * m[4] - m[1] * m[3]) * inv_det,
        ];
        if out.iter().all(|v| v.is_finite()) {
            Some(Matrix { m: out })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        a.approx_eq(b, 1e-4)
    }

    #[test]
    fn multiply_applies_right_operand_first() {
        let t = Matrix::translate(10.0, 0.0);
        let s = Matrix::scale(2.0, 2.0);
        // scale first, then translate
        let ts = Matrix::multiply(&t, &s);
        assert!(close(ts.map_point(Vec2::new(1.0, 1.0)), Vec2::new(12.0, 2.0)));
        // translate first, then scale
        let st = Matrix::multiply(&s, &t);
        assert!(close(st.map_point(Vec2::new(1.0, 1.0)), Vec2::new(22.0, 2.0)));
    }

    #[test]
    fn rotate_quarter_turn() {
        let r = Matrix::rotate(90.0);
        assert!(close(r.map_point(Vec2::new(1.0, 0.0)), Vec2::new(0.0, 1.0)));
    }

    #[test]
    fn rotate_about_keeps_pivot() {
        let r = Matrix::rotate_about(45.0, 5.0, 7.0);
        assert!(close(r.map_point(Vec2::new(5.0, 7.0)), Vec2::new(5.0, 7.0)));
    }

    #[test]
    fn invert_round_trips() {
        let m = Matrix::multiply(&Matrix::translate(3.0, -4.0), &Matrix::rotate(30.0));
        let inv = m.invert().unwrap();
        let p = Vec2::new(12.5, -3.0);
        assert!(close(inv.map_point(m.map_point(p)), p));
        assert!(Matrix::multiply(&m, &inv).values().iter().zip(Matrix::IDENTITY.values()).all(|(a, b)| (a - b).abs() < 1e-5));
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        assert!(Matrix::scale(0.0, 1.0).invert().is_none());
    }

    #[test]
    fn max_scale_of_uniform_scale() {
        let m = Matrix::multiply(&Matrix::rotate(33.0), &Matrix::scale(3.0, 3.0));
        assert!((m.max_scale() - 3.0).abs() < 1e-4);
        assert!((Matrix::scale(2.0, 5.0).max_scale() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn perspective_divides() {
        let m = Matrix::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 2.0);
        assert!(close(m.map_point(Vec2::new(4.0, 6.0)), Vec2::new(2.0, 3.0)));
    }
}
