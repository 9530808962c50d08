//! Render configuration.

/// How a Phong material's diffuse-vs-specular sampling threshold is
/// derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThresholdMethod {
    /// Closed form balancing expected specular energy against the total:
    /// `t = (n+1)(1 - 0.5^(1/(n+1)))`, threshold `t / (t+1)`.
    #[default]
    Balanced,
    /// Ratio of per-channel maxima:
    /// `max(diffuse) / (max(diffuse) + max(specular))`.
    PeakRatio,
}

/// All tunable constants of the tracer in one place.
///
/// Defaults mirror the values the renderer has historically shipped with;
/// nothing here is hard-coded elsewhere.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Near-zero threshold for intersection and shadow tests.
    pub epsilon: f32,
    /// Largest triangle count a BVH leaf may hold before splitting.
    pub bvh_leaf_limit: usize,
    /// Per-pixel stratified jitter grid is `stratify_size` squared cells.
    pub stratify_size: u32,
    /// Bounce count after which Russian roulette starts killing paths.
    pub rr_threshold: u32,
    /// Probability a path survives each roulette round.
    pub rr_probability: f32,
    /// Passes the caller is expected to request for a converged image.
    pub samples_per_pixel: u32,
    /// Light samples drawn per light per shading point.
    pub samples_per_light: u32,
    /// Hard recursion cap. Roulette makes deep paths improbable, not
    /// impossible; this bounds worst-case stack use.
    pub max_depth: u32,
    /// Threshold derivation for Phong materials.
    pub threshold_method: ThresholdMethod,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            epsilon: 1e-7,
            bvh_leaf_limit: 1,
            stratify_size: 10,
            rr_threshold: 3,
            rr_probability: 0.9,
            samples_per_pixel: 64,
            samples_per_light: 1,
            max_depth: 32,
            threshold_method: ThresholdMethod::Balanced,
        }
    }
}
