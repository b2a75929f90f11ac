//! Coordinate and geometry value types.
//!
//! Canonical space:
//! - origin top-left, +X right, +Y down
//! - local (user) coordinates are mapped to device pixels by the canvas
//!   matrix; see [`Matrix`] for the composition convention

mod corner_radii;
mod matrix;
mod rect;
mod rrect;
mod vec2;

pub use corner_radii::CornerRadii;
pub use matrix::Matrix;
pub use rect::Rect;
pub use rrect::RRect;
pub use vec2::Vec2;
