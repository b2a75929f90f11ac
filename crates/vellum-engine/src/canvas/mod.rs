//! Canvas frontend: matrix/clip stack, draw recording and batch submission.

mod batch;
#[allow(clippy::module_inception)]
mod canvas;
mod clip;
mod config;

pub use batch::Batch;
pub use canvas::{Canvas, CanvasState};
pub use clip::{ClipElement, ClipOp, ClipRegion};
pub use config::CanvasConfig;
