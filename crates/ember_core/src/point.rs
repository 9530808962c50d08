//! Surface sample points.

use ember_math::{Vec2, Vec3};

/// A point on a surface: position, normal, and texture coordinate.
///
/// Points come from two places: barycentric interpolation of a triangle's
/// vertices at a ray hit, or area-uniform sampling of a light surface.
/// The normal is unit length by convention.
#[derive(Debug, Clone, Copy, Default)]
pub struct Point {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

impl Point {
    /// Create a new surface point.
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }

    /// Interpolate three vertices with barycentric weights.
    ///
    /// `w0 + w1 + w2` is expected to be 1. The interpolated normal is
    /// renormalized.
    pub fn barycentric(p0: &Point, p1: &Point, p2: &Point, w0: f32, w1: f32, w2: f32) -> Self {
        Self {
            position: w0 * p0.position + w1 * p1.position + w2 * p2.position,
            normal: (w0 * p0.normal + w1 * p1.normal + w2 * p2.normal).normalize_or_zero(),
            uv: w0 * p0.uv + w1 * p1.uv + w2 * p2.uv,
        }
    }
}
