use std::sync::Arc;

use crate::canvas::ClipRegion;
use crate::coords::{Matrix, Rect, Vec2};
use crate::effect::{BlurMask, BlurStyle};
use crate::error::Result;
use crate::geometry::{FillType, Path};
use crate::paint::{BlendMode, Color, Color4f, LineCap, Paint, ShaderKind};

use super::mesh::{Mesh, Span, union_spans};
use super::stroke::{StrokeStyle, stroke_outline};

/// Default flattening tolerance, in device pixels.
pub const DEFAULT_TOLERANCE: f32 = 0.25;

/// Converts paths into device-space meshes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Tessellator {
    tolerance: f32,
}

impl Default for Tessellator {
    fn default() -> Self {
        Self { tolerance: DEFAULT_TOLERANCE }
    }
}

impl Tessellator {
    /// `tolerance` is the maximum distance, in device pixels, between a
    /// curve and its polygonal approximation.
    pub fn new(tolerance: f32) -> Self {
        let tolerance = if tolerance.is_finite() && tolerance > 0.0 { tolerance } else { DEFAULT_TOLERANCE };
        Self { tolerance }
    }

    #[inline]
    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    /// The device tolerance expressed in the local units of `matrix`.
    pub fn local_tolerance(&self, matrix: &Matrix) -> f32 {
        let scale = matrix.max_scale();
        if scale > f32::EPSILON && scale.is_finite() { self.tolerance / scale } else { self.tolerance }
    }

    /// Interior of `path` under its own fill rule.
    pub fn fill(&self, path: &Path, matrix: &Matrix) -> Mesh {
        let contours = path
            .transformed(matrix)
            .flatten(self.tolerance)
            .into_iter()
            .map(|c| c.points)
            .collect();
        Mesh::from_contours(contours, path.fill_type())
    }

    /// Stroke outline of `path`. Built in local space so the stroke width
    /// scales with `matrix`; a zero width is a one pixel hairline.
    pub fn stroke(&self, path: &Path, style: &StrokeStyle, matrix: &Matrix) -> Mesh {
        let mut style = *style;
        if style.width == 0.0 {
            let scale = matrix.max_scale();
            style.width = if scale > f32::EPSILON { 1.0 / scale } else { 1.0 };
            style.cap = LineCap::Butt;
        }
        let pieces = stroke_outline(path, &style, self.local_tolerance(matrix))
            .into_iter()
            .map(|piece| piece.into_iter().map(|p| matrix.map_point(p)).collect())
            .collect();
        Mesh::from_contours(pieces, FillType::NonZero)
    }

    /// Meshes for `path` drawn with `paint`: one for Fill or Stroke, fill
    /// then stroke for StrokeAndFill. Empty meshes are omitted.
    pub fn tessellate(&self, path: &Path, paint: &Paint, matrix: &Matrix) -> Vec<Mesh> {
        let mut meshes = Vec::with_capacity(2);
        if paint.is_filled() {
            meshes.push(self.fill(path, matrix));
        }
        if paint.is_stroked() {
            meshes.push(self.stroke(path, &StrokeStyle::from_paint(paint), matrix));
        }
        meshes.retain(|m| !m.is_empty());
        meshes
    }
}

// ── primitive paint ───────────────────────────────────────────────────────

/// A shader pinned to the CTM it was drawn under.
#[derive(Debug, Clone)]
pub struct ShaderInstance {
    shader: Arc<ShaderKind>,
    inverse_ctm: Option<Matrix>,
}

impl ShaderInstance {
    #[inline]
    pub fn shader(&self) -> &ShaderKind {
        &self.shader
    }

    /// Straight color at a device-space point.
    pub fn eval(&self, p: Vec2) -> Color {
        match &self.inverse_ctm {
            Some(inv) => self.shader.eval_device(p, inv),
            None => Color::TRANSPARENT,
        }
    }
}

/// Resolved paint state of a primitive: everything the device needs to
/// shade covered pixels.
#[derive(Debug, Clone)]
pub struct PrimitivePaint {
    pub color: Color,
    pub shader: Option<ShaderInstance>,
    pub mask_filter: Option<BlurMask>,
    pub blend_mode: BlendMode,
    pub anti_alias: bool,
}

impl PrimitivePaint {
    /// Snapshots `paint` under `ctm`. Fails if the paint's shader or mask
    /// filter was released.
    pub fn resolve(paint: &Paint, ctm: &Matrix) -> Result<Self> {
        let shader = match paint.shader() {
            Some(handle) => Some(ShaderInstance { shader: handle.share()?, inverse_ctm: ctm.invert() }),
            None => None,
        };
        let mask_filter = match paint.mask_filter() {
            Some(handle) => Some(*handle.get()?),
            None => None,
        };
        Ok(Self {
            color: paint.color(),
            shader,
            mask_filter,
            blend_mode: paint.blend_mode(),
            anti_alias: paint.is_anti_alias(),
        })
    }

    /// Premultiplied source color at a device-space point. A shader's
    /// color is modulated by the paint alpha.
    pub fn color_at(&self, p: Vec2) -> Color4f {
        match &self.shader {
            Some(s) => Color4f::from_color(s.eval(p)).scale(self.color.a() as f32 / 255.0),
            None => Color4f::from_color(self.color),
        }
    }
}

// ── primitive ─────────────────────────────────────────────────────────────

/// One draw call, ready for a device: meshes covered as a union, clipped,
/// and shaded by a paint snapshot.
#[derive(Debug, Clone)]
pub struct RenderablePrimitive {
    meshes: Vec<Mesh>,
    paint: PrimitivePaint,
    clip: Arc<ClipRegion>,
    bounds: Option<Rect>,
}

impl RenderablePrimitive {
    pub fn new(meshes: Vec<Mesh>, paint: PrimitivePaint, clip: Arc<ClipRegion>) -> Self {
        let meshes: Vec<Mesh> = meshes.into_iter().filter(|m| !m.is_empty()).collect();
        let bounds = meshes
            .iter()
            .filter_map(Mesh::bounds)
            .reduce(|a, b| a.union(b));
        Self { meshes, paint, clip, bounds }
    }

    #[inline]
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    #[inline]
    pub fn paint(&self) -> &PrimitivePaint {
        &self.paint
    }

    #[inline]
    pub fn clip(&self) -> &ClipRegion {
        &self.clip
    }

    /// Device-space bounds of the geometry, before clipping.
    #[inline]
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    /// Geometry bounds grown by the reach of the mask filter, if any.
    pub fn filtered_bounds(&self) -> Option<Rect> {
        let b = self.bounds?;
        match self.paint.mask_filter {
            Some(blur) if blur.style() != BlurStyle::Inner => {
                let e = blur.extent() as f32;
                Some(b.inset(-e, -e))
            }
            _ => Some(b),
        }
    }

    /// Filtered bounds intersected with the clip bounds.
    pub fn clipped_bounds(&self) -> Option<Rect> {
        let b = self.filtered_bounds()?;
        match self.clip.bounds() {
            Some(c) => b.intersect(c),
            None => Some(b),
        }
    }

    /// True when nothing would be drawn.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Exact coverage test at a device-space point.
    pub fn covers(&self, p: Vec2) -> bool {
        self.meshes.iter().any(|m| m.covers(p)) && self.clip.contains(p)
    }

    /// Covered runs of the scanline at `y` after clipping.
    pub fn spans(&self, y: f32) -> Vec<Span> {
        self.clip.clip_spans(y, self.geometry_spans(y))
    }

    /// Covered runs of the scanline at `y`, ignoring the clip.
    pub fn geometry_spans(&self, y: f32) -> Vec<Span> {
        self.meshes.iter().fold(Vec::new(), |acc, m| union_spans(&acc, &m.spans(y)))
    }

    #[inline]
    pub fn color_at(&self, p: Vec2) -> Color4f {
        self.paint.color_at(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::RRect;
    use crate::effect::MaskFilter;
    use crate::geometry::PathDirection;
    use crate::paint::{LineJoin, Shader, Style};

    fn prim(meshes: Vec<Mesh>, paint: &Paint) -> RenderablePrimitive {
        let paint = PrimitivePaint::resolve(paint, &Matrix::IDENTITY).unwrap();
        RenderablePrimitive::new(meshes, paint, Arc::new(ClipRegion::default()))
    }

    /// Five-point star drawn as one self-intersecting contour, 144 degrees
    /// per step around a regular pentagon.
    fn pentagram(fill_type: FillType) -> Path {
        let mut p = Path::with_fill_type(fill_type);
        for i in 0..5 {
            let a = (-90.0f32 + 144.0 * i as f32).to_radians();
            let (x, y) = (100.0 + 80.0 * a.cos(), 100.0 + 80.0 * a.sin());
            if i == 0 {
                p.move_to(x, y);
            } else {
                p.line_to(x, y);
            }
        }
        p.close();
        p
    }

    // ── fill ─────────────────────────────────────────────────────────────

    #[test]
    fn star_center_depends_on_fill_rule() {
        let t = Tessellator::default();
        let center = Vec2::new(100.0, 100.0);
        let arm = Vec2::new(100.0, 35.0);

        let nz = t.fill(&pentagram(FillType::NonZero), &Matrix::IDENTITY);
        let eo = t.fill(&pentagram(FillType::EvenOdd), &Matrix::IDENTITY);
        assert!(nz.covers(center));
        assert!(!eo.covers(center));
        assert!(nz.covers(arm) && eo.covers(arm));
        assert_eq!(nz.fan_winding_at(center).abs(), 2);
    }

    #[test]
    fn zero_radius_rrect_matches_rect() {
        let t = Tessellator::default();
        let r = Rect::new(10.0, 10.0, 100.0, 160.0);
        let rr = RRect::from_rect_xy(r, 0.0, 0.0).unwrap();
        let a = t.fill(&Path::rrect(&rr, PathDirection::Cw), &Matrix::IDENTITY);
        let b = t.fill(&Path::rect(r, PathDirection::Cw), &Matrix::IDENTITY);
        assert_eq!(a, b);
        for y in [10.0, 10.5, 90.0, 169.9] {
            assert_eq!(a.spans(y), b.spans(y));
        }
    }

    #[test]
    fn fill_applies_matrix() {
        let t = Tessellator::default();
        let m = t.fill(&Path::rect(Rect::new(0.0, 0.0, 10.0, 10.0), PathDirection::Cw), &Matrix::translate(0.0, 300.0));
        assert_eq!(m.bounds().unwrap().to_ltrb(), [0.0, 300.0, 10.0, 310.0]);
    }

    #[test]
    fn degenerate_input_is_empty_not_error() {
        let t = Tessellator::default();
        let zero_circle = Path::circle(5.0, 5.0, 0.0, PathDirection::Cw).unwrap();
        assert!(t.tessellate(&zero_circle, &Paint::default(), &Matrix::IDENTITY).is_empty());

        let mut dot = Path::new();
        dot.move_to(3.0, 3.0).line_to(3.0, 3.0);
        let mut paint = Paint::stroke(Color::BLACK, 4.0);
        paint.set_stroke_cap(LineCap::Round);
        assert!(t.tessellate(&dot, &paint, &Matrix::IDENTITY).is_empty());
        assert!(prim(Vec::new(), &paint).is_empty());
    }

    // ── stroke ───────────────────────────────────────────────────────────

    #[test]
    fn stroke_width_scales_with_matrix() {
        let t = Tessellator::default();
        let mut line = Path::new();
        line.move_to(0.0, 0.0).line_to(10.0, 0.0);
        let style = StrokeStyle { width: 2.0, cap: LineCap::Butt, join: LineJoin::Miter, miter_limit: 4.0 };
        let m = t.stroke(&line, &style, &Matrix::scale(3.0, 3.0));
        assert_eq!(m.bounds().unwrap().to_ltrb(), [0.0, -3.0, 30.0, 3.0]);
    }

    #[test]
    fn hairline_is_one_device_pixel() {
        let t = Tessellator::default();
        let mut line = Path::new();
        line.move_to(0.0, 0.0).line_to(10.0, 0.0);
        let style = StrokeStyle { width: 0.0, cap: LineCap::Round, join: LineJoin::Miter, miter_limit: 4.0 };
        let m = t.stroke(&line, &style, &Matrix::scale(4.0, 4.0));
        let b = m.bounds().unwrap();
        assert!((b.height() - 1.0).abs() < 1e-4);
        assert_eq!(b.width(), 40.0);
    }

    #[test]
    fn stroke_and_fill_covers_union_once() {
        let t = Tessellator::default();
        let rect = Path::rect(Rect::new(0.0, 0.0, 20.0, 20.0), PathDirection::Cw);
        let mut paint = Paint::stroke(Color::BLACK, 4.0);
        paint.set_style(Style::StrokeAndFill);
        let meshes = t.tessellate(&rect, &paint, &Matrix::IDENTITY);
        assert_eq!(meshes.len(), 2);
        let p = prim(meshes, &paint);
        // Overlap of fill and stroke is a single run.
        assert_eq!(p.spans(10.0), vec![(-2.0, 22.0)]);
        let b = p.bounds().unwrap();
        assert!(b.min().approx_eq(Vec2::new(-2.0, -2.0), 1e-4));
        assert!(b.max().approx_eq(Vec2::new(22.0, 22.0), 1e-4));
    }

    // ── paint ────────────────────────────────────────────────────────────

    #[test]
    fn shader_evaluates_in_local_space() {
        let t = Tessellator::default();
        let shader = Shader::linear(Vec2::zero(), Vec2::new(200.0, 0.0), &[Color::CYAN, Color::RED]).unwrap();
        let mut paint = Paint::fill(Color::BLACK);
        paint.set_shader(Some(shader.clone()));
        let ctm = Matrix::translate(520.0, 0.0);
        let pp = PrimitivePaint::resolve(&paint, &ctm).unwrap();
        assert_eq!(pp.color_at(Vec2::new(520.0, 0.0)).to_color(), Color::CYAN);
        assert_eq!(pp.color_at(Vec2::new(720.0, 0.0)).to_color(), Color::RED);

        shader.release();
        assert!(PrimitivePaint::resolve(&paint, &ctm).is_err());
        // A snapshot taken before release keeps working.
        let rect = Path::rect(Rect::new(0.0, 0.0, 10.0, 10.0), PathDirection::Cw);
        let p = RenderablePrimitive::new(t.tessellate(&rect, &paint, &ctm), pp, Arc::new(ClipRegion::default()));
        assert_eq!(p.color_at(Vec2::new(520.0, 5.0)).to_color(), Color::CYAN);
    }

    #[test]
    fn shader_alpha_follows_paint_alpha() {
        let shader = Shader::linear(Vec2::zero(), Vec2::new(10.0, 0.0), &[Color::RED, Color::RED]).unwrap();
        let mut paint = Paint::fill(Color(0x8000_0000));
        paint.set_shader(Some(shader));
        let c = PrimitivePaint::resolve(&paint, &Matrix::IDENTITY).unwrap().color_at(Vec2::zero());
        assert_eq!(c.to_color().a(), 0x80);
        assert_eq!(c.to_color().r(), 0xFF);
    }

    #[test]
    fn blur_grows_bounds_except_inner() {
        let t = Tessellator::default();
        let rect = Path::rect(Rect::new(10.0, 10.0, 20.0, 20.0), PathDirection::Cw);
        let mut paint = Paint::fill(Color::BLACK);
        let filter = MaskFilter::blur(BlurStyle::Normal, 4.0).unwrap();
        let e = filter.get().unwrap().extent() as f32;
        paint.set_mask_filter(Some(filter.clone()));
        let p = prim(t.tessellate(&rect, &paint, &Matrix::IDENTITY), &paint);
        assert_eq!(p.bounds().unwrap().to_ltrb(), [10.0, 10.0, 30.0, 30.0]);
        assert_eq!(p.clipped_bounds().unwrap().to_ltrb(), [10.0 - e, 10.0 - e, 30.0 + e, 30.0 + e]);

        paint.set_mask_filter(Some(MaskFilter::blur(BlurStyle::Inner, 4.0).unwrap()));
        let inner = prim(t.tessellate(&rect, &paint, &Matrix::IDENTITY), &paint);
        assert_eq!(inner.clipped_bounds(), inner.bounds());

        paint.set_mask_filter(Some(filter.clone()));
        filter.release();
        assert!(matches!(
            PrimitivePaint::resolve(&paint, &Matrix::IDENTITY),
            Err(crate::error::Error::UseAfterRelease("mask filter"))
        ));
    }
}
