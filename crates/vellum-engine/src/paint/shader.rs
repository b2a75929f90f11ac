use std::sync::Arc;

use crate::coords::{Matrix, Vec2};
use crate::device::Pixmap;
use crate::error::{Error, Result};
use crate::resource::{Handle, Resource};

use super::{Color, Color4f};

/// Gradient spread behavior outside [0, 1] range.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum SpreadMode {
    /// Clamp to edge stops.
    #[default]
    Pad,
    /// Repeat the gradient pattern.
    Repeat,
    /// Mirror-repeat the gradient pattern.
    Reflect,
}

impl SpreadMode {
    fn apply(self, t: f32) -> f32 {
        match self {
            SpreadMode::Pad => t.clamp(0.0, 1.0),
            SpreadMode::Repeat => t - t.floor(),
            SpreadMode::Reflect => {
                let m = t.rem_euclid(2.0);
                if m > 1.0 { 2.0 - m } else { m }
            }
        }
    }
}

/// Color space gradient stops are blended in.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum Interpolation {
    /// Lerp straight-alpha channels, then premultiply the result.
    #[default]
    Unpremul,
    /// Premultiply each stop first, then lerp.
    Premul,
}

/// A single gradient stop. `t` lies in [0, 1] and stops are ascending.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorStop {
    pub t: f32,
    pub color: Color,
}

impl ColorStop {
    #[inline]
    pub const fn new(t: f32, color: Color) -> Self {
        Self { t, color }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum GradientKind {
    /// `t` is the projection onto `start -> end`, normalized by its length.
    Linear { start: Vec2, end: Vec2 },
    /// `t` is the distance from `center` divided by `radius`.
    Radial { center: Vec2, radius: f32 },
}

/// Gradient color function, defined in the local space of the geometry it
/// is drawn with.
///
/// By default interpolation happens between straight-alpha 8-bit channels;
/// see [`Interpolation`]. Evaluating exactly at a stop position returns that
/// stop's color unchanged. Where two stops share a position, the later one
/// wins.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    kind: GradientKind,
    stops: Vec<ColorStop>,
    spread: SpreadMode,
    interpolation: Interpolation,
    local_matrix: Matrix,
    inverse_local: Option<Matrix>,
}

impl Gradient {
    pub fn linear(start: Vec2, end: Vec2, colors: &[Color]) -> Result<Self> {
        Self::build(GradientKind::Linear { start, end }, colors, None)
    }

    pub fn linear_with_pos(start: Vec2, end: Vec2, colors: &[Color], positions: &[f32]) -> Result<Self> {
        Self::build(GradientKind::Linear { start, end }, colors, Some(positions))
    }

    pub fn radial(center: Vec2, radius: f32, colors: &[Color]) -> Result<Self> {
        Self::build(GradientKind::Radial { center, radius }, colors, None)
    }

    pub fn radial_with_pos(center: Vec2, radius: f32, colors: &[Color], positions: &[f32]) -> Result<Self> {
        Self::build(GradientKind::Radial { center, radius }, colors, Some(positions))
    }

    fn build(kind: GradientKind, colors: &[Color], positions: Option<&[f32]>) -> Result<Self> {
        match kind {
            GradientKind::Linear { start, end } => {
                if !start.is_finite() || !end.is_finite() {
                    return Err(Error::invalid("linear gradient endpoints must be finite"));
                }
                if start == end {
                    return Err(Error::invalid("linear gradient endpoints must differ"));
                }
            }
            GradientKind::Radial { center, radius } => {
                if !center.is_finite() {
                    return Err(Error::invalid("radial gradient center must be finite"));
                }
                if !radius.is_finite() || radius < 0.0 {
                    return Err(Error::invalid(format!("radial gradient radius must be >= 0, got {radius}")));
                }
            }
        }

        if colors.len() < 2 {
            return Err(Error::invalid(format!("gradient needs at least 2 colors, got {}", colors.len())));
        }

        let stops = match positions {
            None => {
                let last = (colors.len() - 1) as f32;
                colors
                    .iter()
                    .enumerate()
                    .map(|(i, &c)| ColorStop::new(i as f32 / last, c))
                    .collect()
            }
            Some(pos) => {
                validate_positions(pos, colors.len())?;
                pos.iter().zip(colors).map(|(&t, &c)| ColorStop::new(t, c)).collect()
            }
        };

        Ok(Self {
            kind,
            stops,
            spread: SpreadMode::Pad,
            interpolation: Interpolation::Unpremul,
            local_matrix: Matrix::IDENTITY,
            inverse_local: Some(Matrix::IDENTITY),
        })
    }

    pub fn with_spread(mut self, spread: SpreadMode) -> Self {
        self.spread = spread;
        self
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Maps gradient space into geometry space. Points are inverse-mapped
    /// through `m` before evaluation; a singular `m` evaluates to transparent.
    pub fn with_local_matrix(mut self, m: Matrix) -> Self {
        self.local_matrix = m;
        self.inverse_local = m.invert();
        self
    }

    #[inline]
    pub fn kind(&self) -> GradientKind {
        self.kind
    }

    #[inline]
    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    #[inline]
    pub fn spread(&self) -> SpreadMode {
        self.spread
    }

    #[inline]
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    #[inline]
    pub fn local_matrix(&self) -> Matrix {
        self.local_matrix
    }

    /// Color at `p`, in the coordinate space the gradient was defined in.
    pub fn eval(&self, p: Vec2) -> Color {
        let Some(inv) = self.inverse_local else {
            return Color::TRANSPARENT;
        };
        let p = inv.map_point(p);
        let t = match self.kind {
            GradientKind::Linear { start, end } => {
                let axis = end - start;
                (p - start).dot(axis) / axis.dot(axis)
            }
            GradientKind::Radial { center, radius } => {
                if radius == 0.0 {
                    1.0
                } else {
                    p.distance(center) / radius
                }
            }
        };
        self.color_at(self.spread.apply(t))
    }

    fn color_at(&self, t: f32) -> Color {
        if !t.is_finite() {
            return self.stops[0].color;
        }
        let idx = self.stops.partition_point(|s| s.t <= t);
        if idx == 0 {
            return self.stops[0].color;
        }
        if idx == self.stops.len() {
            return self.stops[idx - 1].color;
        }
        let lo = self.stops[idx - 1];
        let hi = self.stops[idx];
        if lo.t == t {
            return lo.color;
        }
        let k = (t - lo.t) / (hi.t - lo.t);
        if self.interpolation == Interpolation::Premul {
            return Color4f::from_color(lo.color).lerp(Color4f::from_color(hi.color), k).to_color();
        }
        let mix = |a: u8, b: u8| {
            let v = a as f32 + (b as f32 - a as f32) * k;
            v.round().clamp(0.0, 255.0) as u8
        };
        let [la, lr, lg, lb] = lo.color.channels();
        let [ha, hr, hg, hb] = hi.color.channels();
        Color::from_argb(mix(la, ha), mix(lr, hr), mix(lg, hg), mix(lb, hb))
    }
}

fn validate_positions(pos: &[f32], count: usize) -> Result<()> {
    if pos.len() != count {
        return Err(Error::invalid(format!(
            "gradient has {count} colors but {} positions",
            pos.len()
        )));
    }
    if pos.iter().any(|t| !(0.0..=1.0).contains(t)) {
        return Err(Error::invalid("gradient positions must lie in [0, 1]"));
    }
    if pos.windows(2).any(|w| w[1] < w[0]) {
        return Err(Error::invalid("gradient positions must be ascending"));
    }
    if pos[0] != 0.0 || pos[count - 1] != 1.0 {
        return Err(Error::invalid("gradient positions must start at 0 and end at 1"));
    }
    Ok(())
}

// ── image ─────────────────────────────────────────────────────────────────

/// Pixmap tiled over the plane, sampled at the nearest texel.
///
/// Texel `(i, j)` covers `[i, i + 1] x [j, j + 1]` in the shader's local
/// space. Outside the image, each axis follows its own [`SpreadMode`]:
/// `Pad` repeats the edge texels.
#[derive(Debug, Clone)]
pub struct ImageShader {
    image: Arc<Pixmap>,
    tile_x: SpreadMode,
    tile_y: SpreadMode,
    local_matrix: Matrix,
    inverse_local: Option<Matrix>,
}

impl ImageShader {
    pub fn new(image: Arc<Pixmap>) -> Self {
        Self {
            image,
            tile_x: SpreadMode::Pad,
            tile_y: SpreadMode::Pad,
            local_matrix: Matrix::IDENTITY,
            inverse_local: Some(Matrix::IDENTITY),
        }
    }

    pub fn with_tile_modes(mut self, tile_x: SpreadMode, tile_y: SpreadMode) -> Self {
        self.tile_x = tile_x;
        self.tile_y = tile_y;
        self
    }

    pub fn with_local_matrix(mut self, m: Matrix) -> Self {
        self.local_matrix = m;
        self.inverse_local = m.invert();
        self
    }

    #[inline]
    pub fn image(&self) -> &Pixmap {
        &self.image
    }

    #[inline]
    pub fn tile_modes(&self) -> (SpreadMode, SpreadMode) {
        (self.tile_x, self.tile_y)
    }

    #[inline]
    pub fn local_matrix(&self) -> Matrix {
        self.local_matrix
    }

    pub fn eval(&self, p: Vec2) -> Color {
        let Some(inv) = self.inverse_local else {
            return Color::TRANSPARENT;
        };
        let p = inv.map_point(p);
        let (w, h) = (self.image.width(), self.image.height());
        let (Some(x), Some(y)) = (texel(p.x, w, self.tile_x), texel(p.y, h, self.tile_y)) else {
            return Color::TRANSPARENT;
        };
        self.image.pixel(x, y).unwrap_or(Color::TRANSPARENT)
    }
}

/// Texel index for local coordinate `v` along an axis of `size` texels.
fn texel(v: f32, size: u32, mode: SpreadMode) -> Option<u32> {
    if !v.is_finite() {
        return None;
    }
    let size_f = size as f32;
    let t = mode.apply(v / size_f) * size_f;
    Some((t.floor().max(0.0) as u32).min(size - 1))
}

// ── shader resource ───────────────────────────────────────────────────────

/// Source color function of a paint.
#[derive(Debug, Clone)]
pub enum ShaderKind {
    Gradient(Gradient),
    Image(ImageShader),
}

impl Resource for ShaderKind {
    const KIND: &'static str = "shader";
}

impl ShaderKind {
    /// Straight color at `p`, in the space the shader was defined in.
    pub fn eval(&self, p: Vec2) -> Color {
        match self {
            ShaderKind::Gradient(g) => g.eval(p),
            ShaderKind::Image(i) => i.eval(p),
        }
    }

    /// Color at a device-space point, given the inverse of the CTM the
    /// shader was drawn under.
    #[inline]
    pub fn eval_device(&self, p: Vec2, inverse_ctm: &Matrix) -> Color {
        self.eval(inverse_ctm.map_point(p))
    }

    pub fn as_gradient(&self) -> Option<&Gradient> {
        match self {
            ShaderKind::Gradient(g) => Some(g),
            ShaderKind::Image(_) => None,
        }
    }

    fn with_local_matrix(self, m: Matrix) -> Self {
        match self {
            ShaderKind::Gradient(g) => ShaderKind::Gradient(g.with_local_matrix(m)),
            ShaderKind::Image(i) => ShaderKind::Image(i.with_local_matrix(m)),
        }
    }
}

/// Shared, releasable shader referenced by paints.
pub type Shader = Handle<ShaderKind>;

impl Handle<ShaderKind> {
    pub fn linear(start: Vec2, end: Vec2, colors: &[Color]) -> Result<Shader> {
        Gradient::linear(start, end, colors).map(Self::from_gradient)
    }

    pub fn linear_with_pos(start: Vec2, end: Vec2, colors: &[Color], positions: &[f32]) -> Result<Shader> {
        Gradient::linear_with_pos(start, end, colors, positions).map(Self::from_gradient)
    }

    pub fn radial(center: Vec2, radius: f32, colors: &[Color]) -> Result<Shader> {
        Gradient::radial(center, radius, colors).map(Self::from_gradient)
    }

    pub fn radial_with_pos(center: Vec2, radius: f32, colors: &[Color], positions: &[f32]) -> Result<Shader> {
        Gradient::radial_with_pos(center, radius, colors, positions).map(Self::from_gradient)
    }

    /// Wraps a configured gradient (spread, interpolation, local matrix).
    pub fn from_gradient(gradient: Gradient) -> Shader {
        Handle::new(ShaderKind::Gradient(gradient))
    }

    pub fn image(image: Arc<Pixmap>, tile_x: SpreadMode, tile_y: SpreadMode) -> Shader {
        Handle::new(ShaderKind::Image(ImageShader::new(image).with_tile_modes(tile_x, tile_y)))
    }

    /// A new shader with `m` as its local matrix. The original is unchanged.
    pub fn with_local_matrix(&self, m: Matrix) -> Result<Shader> {
        Ok(Handle::new(self.get()?.clone().with_local_matrix(m)))
    }

    pub fn eval(&self, p: Vec2) -> Result<Color> {
        Ok(self.get()?.eval(p))
    }
}
