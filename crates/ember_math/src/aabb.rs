use crate::{Interval, Ray, Vec3};

/// Axis-Aligned Bounding Box for spatial acceleration structures (BVH).
///
/// An AABB is defined by three intervals (one per axis) that bound a 3D
/// volume. A fresh box is empty (min = +inf, max = -inf); it only ever
/// grows through [`Aabb::add`] and [`Aabb::combine`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Create an AABB from two corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            x: Interval::new(a.x.min(b.x), a.x.max(b.x)),
            y: Interval::new(a.y.min(b.y), a.y.max(b.y)),
            z: Interval::new(a.z.min(b.z), a.z.max(b.z)),
        }
    }

    /// Grow the box to cover a point. No-op if the point is already inside.
    pub fn add(&mut self, point: Vec3) {
        self.x.cover(point.x);
        self.y.cover(point.y);
        self.z.cover(point.z);
    }

    /// Grow the box to the union with another box.
    pub fn combine(&mut self, other: &Aabb) {
        self.x = Interval::surrounding(&self.x, &other.x);
        self.y = Interval::surrounding(&self.y, &other.y);
        self.z = Interval::surrounding(&self.z, &other.z);
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest
    /// extent. Ties resolve X over Y over Z.
    pub fn longest_axis(&self) -> usize {
        let x_size = self.x.size();
        let y_size = self.y.size();
        let z_size = self.z.size();

        if x_size >= y_size && x_size >= z_size {
            0
        } else if y_size >= z_size {
            1
        } else {
            2
        }
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        Vec3::new(
            (self.x.min + self.x.max) * 0.5,
            (self.y.min + self.y.max) * 0.5,
            (self.z.min + self.z.max) * 0.5,
        )
    }

    /// Test whether a forward ray intersects this AABB.
    ///
    /// Slab method: each axis shrinks the running [t0, t1] interval, with
    /// entry and exit faces picked by the sign of the direction component.
    /// A direction component smaller than `epsilon` means the ray runs
    /// parallel to that axis' slabs, so the test degenerates to origin
    /// containment on that axis rather than a division that would produce
    /// NaN. Only intersections at t >= 0 count.
    pub fn hit(&self, ray: &Ray, epsilon: f32) -> bool {
        let o = ray.origin();
        let d = ray.direction();

        let mut t0 = 0.0f32;
        let mut t1 = f32::INFINITY;

        for axis in 0..3 {
            let slab = match axis {
                0 => self.x,
                1 => self.y,
                _ => self.z,
            };
            let (o, d) = (o[axis], d[axis]);

            if d.abs() > epsilon {
                let near = if d > 0.0 { slab.min } else { slab.max };
                let far = if d > 0.0 { slab.max } else { slab.min };
                t0 = t0.max((near - o) / d);
                t1 = t1.min((far - o) / d);
                if t0 > t1 {
                    return false;
                }
            } else if !slab.contains(o) {
                return false;
            }
        }

        true
    }

    /// The empty box: contains nothing, absorbs everything it is combined
    /// with.
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };
}
