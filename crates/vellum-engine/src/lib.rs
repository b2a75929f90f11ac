//! Vellum engine crate.
//!
//! An immediate-mode 2D vector canvas. Draw calls (shapes, paths, text
//! blobs) are tessellated into device-space meshes under the current
//! matrix and clip, batched, and submitted in order to a [`Device`].
//!
//! ```no_run
//! use vellum_engine::{Canvas, Color, Paint, Rect, SoftwareDevice};
//!
//! let mut canvas = Canvas::make(SoftwareDevice::default(), "main", 256, 256, 4)?;
//! canvas.clear(Color::WHITE)?;
//! canvas.draw_rect(Rect::new(10.0, 10.0, 100.0, 160.0), &Paint::fill(0xFF42_85F4))?;
//! canvas.flush()?;
//! # Ok::<(), vellum_engine::Error>(())
//! ```

pub mod canvas;
pub mod coords;
pub mod device;
pub mod effect;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod paint;
pub mod render;
pub mod resource;
pub mod text;

pub use canvas::{Canvas, CanvasConfig, CanvasState, ClipOp};
pub use coords::{CornerRadii, Matrix, RRect, Rect, Vec2};
pub use device::{Device, Pixmap, RasterConfig, SoftwareDevice};
pub use effect::{BlurStyle, MaskFilter, PathEffect};
pub use error::{Error, Result};
pub use geometry::{ArcSize, FillType, Path, PathDirection};
pub use paint::{
    BlendMode, Color, Gradient, Interpolation, LineCap, LineJoin, Paint, Shader, SpreadMode, Style, color_set_argb,
};
pub use text::{FontdueTypeface, TextBlob, TextBlobBuilder, Typeface};
