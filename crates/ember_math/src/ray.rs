//! Ray type for path tracing.

use glam::Vec3;

/// A ray with an origin and a direction.
///
/// Directions are normalized by whoever builds the ray; the type itself
/// does not enforce unit length.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
}

impl Ray {
    /// Create a new ray.
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Get the ray's origin point.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the ray's direction vector.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Compute a point along the ray at parameter t.
    /// P(t) = origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + t * self.direction
    }

    /// Mirror-reflect the ray direction about a surface normal.
    ///
    /// Returns a normalized direction.
    #[inline]
    pub fn reflect(&self, normal: Vec3) -> Vec3 {
        (self.direction - 2.0 * self.direction.dot(normal) * normal).normalize()
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            direction: Vec3::Z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));

        assert_eq!(ray.at(0.0), Vec3::ZERO);
        assert_eq!(ray.at(1.0), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(ray.at(2.5), Vec3::new(2.5, 0.0, 0.0));
    }

    #[test]
    fn test_ray_reflect() {
        // 45 degree incidence onto the XZ plane
        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, -1.0, 0.0).normalize());
        let reflected = ray.reflect(Vec3::Y);

        let expected = Vec3::new(1.0, 1.0, 0.0).normalize();
        assert!((reflected - expected).length() < 1e-6);

        // Reflection preserves unit length
        assert!((reflected.length() - 1.0).abs() < 1e-6);
    }
}
