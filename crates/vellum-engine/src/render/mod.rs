//! Tessellation: paths and paints become device-space meshes.
//!
//! Convention:
//! - meshes are in device pixels (top-left origin, +Y down)
//! - a mesh is a set of closed polygons plus their fan triangulation; the
//!   fill rule is applied to the winding count, never baked into triangles
//! - strokes are converted to fills before they reach a mesh

mod mesh;
mod stroke;
mod tessellate;

pub use mesh::{Mesh, Span, Vertex};
pub(crate) use mesh::{intersect_spans, subtract_spans};
pub use stroke::StrokeStyle;
pub use tessellate::{DEFAULT_TOLERANCE, PrimitivePaint, RenderablePrimitive, ShaderInstance, Tessellator};
