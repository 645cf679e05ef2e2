//! Configuration for mesh generation.

/// Configuration for the geometry kernel.
///
/// # Example
///
/// ```
/// use plan_mesh::MeshConfig;
///
/// let config = MeshConfig::default().with_uv_scale(0.5);
/// assert!(config.uv_scale < 1.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MeshConfig {
    /// Vertices within this distance are merged, in meters. Prevents
    /// sliver triangles at coincident grid seams.
    pub weld_epsilon: f64,
    /// Multiplier from meters to UV units. At 1.0 a texture tile spans one
    /// meter of wall.
    pub uv_scale: f64,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            weld_epsilon: 1e-6,
            uv_scale: 1.0,
        }
    }
}

impl MeshConfig {
    /// Set the weld epsilon.
    #[must_use]
    pub fn with_weld_epsilon(mut self, epsilon: f64) -> Self {
        self.weld_epsilon = epsilon.abs();
        self
    }

    /// Set the UV scale.
    #[must_use]
    pub fn with_uv_scale(mut self, scale: f64) -> Self {
        self.uv_scale = scale;
        self
    }
}
