use crate::render::DEFAULT_TOLERANCE;

/// Canvas construction parameters.
#[derive(Debug, Clone)]
pub struct CanvasConfig {
    /// Maximum distance, in device pixels, between a curve and the polygon
    /// that replaces it. Also bounds round join and cap approximation.
    pub tolerance: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self { tolerance: DEFAULT_TOLERANCE }
    }
}
