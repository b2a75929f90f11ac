//! Paint model: colors, stroke parameters, gradients and blending.
//!
//! Scope:
//! - straight ARGB8888 colors at the API, premultiplied `Color4f` for blending
//! - `Paint`, the mutable attribute bag snapshotted by every draw
//! - gradient and image shaders
//!
//! Geometry types remain in `coords`.

pub mod color;
#[allow(clippy::module_inception)]
pub mod paint;
pub mod shader;

pub use color::{Color, Color4f, color_set_argb};
pub use paint::{BlendMode, LineCap, LineJoin, Paint, Style};
pub use shader::{ColorStop, Gradient, GradientKind, ImageShader, Interpolation, Shader, ShaderKind, SpreadMode};
