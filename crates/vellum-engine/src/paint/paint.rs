use std::fmt;
use std::sync::Arc;

use crate::effect::{MaskFilter, PathEffect};
use crate::text::Typeface;

use super::{Color, Shader};

/// Which parts of a shape a draw covers.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum Style {
    #[default]
    Fill,
    Stroke,
    /// Interior and outline, covered once as a union.
    StrokeAndFill,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// Porter-Duff and separable blend modes, applied on premultiplied color.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum BlendMode {
    Clear,
    Src,
    #[default]
    SrcOver,
    DstOver,
    Plus,
    Multiply,
    Screen,
}

pub const DEFAULT_STROKE_MITER: f32 = 4.0;
pub const DEFAULT_TEXT_SIZE: f32 = 14.0;

/// Drawing attributes.
///
/// A `Paint` is mutated freely between draws; every draw call takes a
/// snapshot, so later changes never reach already-recorded primitives.
/// Shaders, path effects and typefaces are referenced, not copied.
#[derive(Clone)]
pub struct Paint {
    color: Color,
    style: Style,
    stroke_width: f32,
    cap: LineCap,
    join: LineJoin,
    miter: f32,
    shader: Option<Shader>,
    path_effect: Option<PathEffect>,
    mask_filter: Option<MaskFilter>,
    text_size: f32,
    typeface: Option<Arc<dyn Typeface>>,
    blend_mode: BlendMode,
    anti_alias: bool,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            style: Style::Fill,
            stroke_width: 1.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            miter: DEFAULT_STROKE_MITER,
            shader: None,
            path_effect: None,
            mask_filter: None,
            text_size: DEFAULT_TEXT_SIZE,
            typeface: None,
            blend_mode: BlendMode::SrcOver,
            anti_alias: true,
        }
    }
}

impl fmt::Debug for Paint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Paint")
            .field("color", &format_args!("{:#010X}", self.color.0))
            .field("style", &self.style)
            .field("stroke_width", &self.stroke_width)
            .field("cap", &self.cap)
            .field("join", &self.join)
            .field("miter", &self.miter)
            .field("shader", &self.shader.is_some())
            .field("path_effect", &self.path_effect.is_some())
            .field("mask_filter", &self.mask_filter.is_some())
            .field("text_size", &self.text_size)
            .field("typeface", &self.typeface.is_some())
            .field("blend_mode", &self.blend_mode)
            .field("anti_alias", &self.anti_alias)
            .finish()
    }
}

impl Paint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill paint in `color`.
    pub fn fill(color: impl Into<Color>) -> Self {
        let mut p = Self::default();
        p.set_color(color);
        p
    }

    /// Stroke paint in `color` with the given width.
    pub fn stroke(color: impl Into<Color>, width: f32) -> Self {
        let mut p = Self::fill(color);
        p.set_style(Style::Stroke);
        p.set_stroke_width(width);
        p
    }

    // ── color ────────────────────────────────────────────────────────────

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: impl Into<Color>) {
        self.color = color.into();
    }

    pub fn set_argb(&mut self, a: u8, r: u8, g: u8, b: u8) {
        self.color = Color::from_argb(a, r, g, b);
    }

    /// Replaces only the alpha channel.
    pub fn set_alpha(&mut self, a: u8) {
        self.color = self.color.with_alpha(a);
    }

    /// Alpha as a float in [0, 1].
    pub fn set_alpha_f(&mut self, a: f32) {
        self.set_alpha((a.clamp(0.0, 1.0) * 255.0).round() as u8);
    }

    // ── style and stroke ─────────────────────────────────────────────────

    #[inline]
    pub fn style(&self) -> Style {
        self.style
    }

    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    #[inline]
    pub fn stroke_width(&self) -> f32 {
        self.stroke_width
    }

    /// Negative or non-finite widths are ignored. Zero is a hairline.
    pub fn set_stroke_width(&mut self, width: f32) {
        if width.is_finite() && width >= 0.0 {
            self.stroke_width = width;
        } else {
            log::debug!("ignoring stroke width {width}");
        }
    }

    #[inline]
    pub fn stroke_cap(&self) -> LineCap {
        self.cap
    }

    pub fn set_stroke_cap(&mut self, cap: LineCap) {
        self.cap = cap;
    }

    #[inline]
    pub fn stroke_join(&self) -> LineJoin {
        self.join
    }

    pub fn set_stroke_join(&mut self, join: LineJoin) {
        self.join = join;
    }

    #[inline]
    pub fn stroke_miter(&self) -> f32 {
        self.miter
    }

    /// Miter limits below 1 are meaningless and ignored.
    pub fn set_stroke_miter(&mut self, miter: f32) {
        if miter.is_finite() && miter >= 1.0 {
            self.miter = miter;
        } else {
            log::debug!("ignoring stroke miter {miter}");
        }
    }

    // ── shader and effect ────────────────────────────────────────────────

    #[inline]
    pub fn shader(&self) -> Option<&Shader> {
        self.shader.as_ref()
    }

    pub fn set_shader(&mut self, shader: Option<Shader>) {
        self.shader = shader;
    }

    #[inline]
    pub fn path_effect(&self) -> Option<&PathEffect> {
        self.path_effect.as_ref()
    }

    pub fn set_path_effect(&mut self, effect: Option<PathEffect>) {
        self.path_effect = effect;
    }

    #[inline]
    pub fn mask_filter(&self) -> Option<&MaskFilter> {
        self.mask_filter.as_ref()
    }

    pub fn set_mask_filter(&mut self, filter: Option<MaskFilter>) {
        self.mask_filter = filter;
    }

    // ── text ─────────────────────────────────────────────────────────────

    #[inline]
    pub fn text_size(&self) -> f32 {
        self.text_size
    }

    pub fn set_text_size(&mut self, size: f32) {
        self.text_size = size;
    }

    #[inline]
    pub fn typeface(&self) -> Option<&Arc<dyn Typeface>> {
        self.typeface.as_ref()
    }

    pub fn set_typeface(&mut self, typeface: Option<Arc<dyn Typeface>>) {
        self.typeface = typeface;
    }

    // ── compositing ──────────────────────────────────────────────────────

    #[inline]
    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend_mode = mode;
    }

    #[inline]
    pub fn is_anti_alias(&self) -> bool {
        self.anti_alias
    }

    pub fn set_anti_alias(&mut self, aa: bool) {
        self.anti_alias = aa;
    }

    /// True when the paint produces a stroke outline.
    #[inline]
    pub fn is_stroked(&self) -> bool {
        matches!(self.style, Style::Stroke | Style::StrokeAndFill)
    }

    /// True when the paint covers the interior.
    #[inline]
    pub fn is_filled(&self) -> bool {
        matches!(self.style, Style::Fill | Style::StrokeAndFill)
    }
}
