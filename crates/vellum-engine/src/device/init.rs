use crate::paint::Color;

/// Initialization parameters for [`SoftwareDevice`](super::SoftwareDevice).
///
/// Keep this structure minimal. Add fields only when a concrete consumer
/// needs them.
#[derive(Debug, Clone)]
pub struct RasterConfig {
    /// Coverage samples per pixel axis for anti-aliased primitives on
    /// multisampled surfaces (`n * n` samples per pixel).
    ///
    /// Surfaces created with `sample_count <= 1` and primitives drawn without
    /// anti-aliasing use a single sample at the pixel center.
    pub samples_per_axis: u32,

    /// Initial contents of every new surface.
    pub background: Color,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            samples_per_axis: 4,
            background: Color::TRANSPARENT,
        }
    }
}
