//! Path geometry: the `Path` container, primitive builders, curve
//! flattening, and arc-length measurement.

mod flatten;
mod measure;
mod path;

pub use flatten::Contour;
pub use measure::{ContourMeasure, PathMeasure};
pub use path::{ArcSize, FillType, KAPPA, Path, PathDirection, PathEl, PathIter, PathVerb};
