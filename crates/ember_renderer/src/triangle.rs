//! Triangle primitive.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection and
//! square-root warping for area-uniform sampling.

use ember_core::Point;
use ember_math::{Aabb, Ray, Vec3};
use rand::Rng;

/// A triangle built from three surface points, with a cached centroid.
///
/// The centroid is only used as a BVH sort key.
#[derive(Clone, Debug)]
pub struct Triangle {
    p0: Point,
    p1: Point,
    p2: Point,
    center: Vec3,
}

impl Triangle {
    /// Create a triangle from three vertices.
    pub fn new(p0: Point, p1: Point, p2: Point) -> Self {
        let center = (p0.position + p1.position + p2.position) / 3.0;
        Self { p0, p1, p2, center }
    }

    /// The centroid, cached at construction.
    #[inline]
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Surface area: half the cross product magnitude of two edges.
    pub fn area(&self) -> f32 {
        let edge1 = self.p1.position - self.p0.position;
        let edge2 = self.p2.position - self.p0.position;
        edge1.cross(edge2).length() * 0.5
    }

    /// Bounding box covering the three vertices.
    pub fn aabb(&self) -> Aabb {
        let mut aabb = Aabb::EMPTY;
        aabb.add(self.p0.position);
        aabb.add(self.p1.position);
        aabb.add(self.p2.position);
        aabb
    }

    /// Möller-Trumbore ray-triangle intersection.
    ///
    /// Returns the ray parameter and the barycentrically interpolated
    /// surface point, or `None` for a miss. Hits behind the ray origin
    /// (t <= epsilon) and outside the barycentric triangle are rejected.
    pub fn intersect(&self, ray: &Ray, epsilon: f32) -> Option<(f32, Point)> {
        let edge1 = self.p1.position - self.p0.position;
        let edge2 = self.p2.position - self.p0.position;

        let h = ray.direction().cross(edge2);
        let det = edge1.dot(h);

        // Ray parallel to the triangle plane
        if det.abs() < epsilon {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = ray.origin() - self.p0.position;
        let u = inv_det * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = inv_det * ray.direction().dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = inv_det * edge2.dot(q);
        if t <= epsilon {
            return None;
        }

        let point = Point::barycentric(&self.p0, &self.p1, &self.p2, 1.0 - u - v, u, v);
        Some((t, point))
    }

    /// Draw a point uniformly distributed over the triangle's area.
    ///
    /// Square-root warping of two uniform variates:
    /// `(1 - sqrt(r1), r2 * sqrt(r1), rest)`.
    pub fn sample(&self, rng: &mut impl Rng) -> Point {
        let r1: f32 = rng.gen();
        let r2: f32 = rng.gen();

        let sqrt_r1 = r1.sqrt();
        let w0 = 1.0 - sqrt_r1;
        let w1 = r2 * sqrt_r1;
        let w2 = 1.0 - w0 - w1;

        Point::barycentric(&self.p0, &self.p1, &self.p2, w0, w1, w2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_math::Vec2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const EPS: f32 = 1e-7;

    fn xy_triangle() -> Triangle {
        // In the z = -1 plane, facing +Z
        Triangle::new(
            Point::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::Z, Vec2::new(0.0, 0.0)),
            Point::new(Vec3::new(1.0, -1.0, -1.0), Vec3::Z, Vec2::new(1.0, 0.0)),
            Point::new(Vec3::new(0.0, 1.0, -1.0), Vec3::Z, Vec2::new(0.5, 1.0)),
        )
    }

    #[test]
    fn test_intersect_through_centroid() {
        let tri = xy_triangle();
        let target = tri.center();
        let ray = Ray::new(Vec3::ZERO, (target - Vec3::ZERO).normalize());

        let (t, point) = tri.intersect(&ray, EPS).expect("centroid ray must hit");
        assert!((ray.at(t) - target).length() < 1e-5);

        // Equal barycentric weights interpolate uv to the vertex average
        let expected_uv = Vec2::new(0.5, 1.0 / 3.0);
        assert!((point.uv - expected_uv).length() < 1e-5);
        assert!((point.normal - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_intersect_misses_plane() {
        let tri = xy_triangle();

        // Pointing away from the plane entirely
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        assert!(tri.intersect(&ray, EPS).is_none());

        // Parallel to the plane
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert!(tri.intersect(&ray, EPS).is_none());
    }

    #[test]
    fn test_intersect_outside_barycentric_range() {
        let tri = xy_triangle();

        // In the plane of the triangle, but outside it
        let ray = Ray::new(Vec3::new(5.0, 5.0, 0.0), -Vec3::Z);
        assert!(tri.intersect(&ray, EPS).is_none());
    }

    #[test]
    fn test_rejects_hit_behind_origin() {
        let tri = xy_triangle();
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), -Vec3::Z);
        assert!(tri.intersect(&ray, EPS).is_none());
    }

    #[test]
    fn test_area() {
        let tri = xy_triangle();
        // Base 2, height 2
        assert!((tri.area() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_sample_stays_inside_and_averages_to_centroid() {
        let tri = xy_triangle();
        let mut rng = StdRng::seed_from_u64(7);

        let n = 20_000;
        let mut mean = Vec3::ZERO;
        for _ in 0..n {
            let p = tri.sample(&mut rng);

            // Inside the convex hull: recover barycentrics and check range
            mean += p.position;
            assert!(p.position.z == -1.0 || (p.position.z + 1.0).abs() < 1e-6);
            assert!(p.position.y >= -1.0 - 1e-6 && p.position.y <= 1.0 + 1e-6);
        }
        mean /= n as f32;
        assert!((mean - tri.center()).length() < 0.02);
    }
}
