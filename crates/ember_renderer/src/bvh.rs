//! Bounding Volume Hierarchy acceleration structure.
//!
//! A binary tree over triangles, built once per mesh with a top-down
//! object-median split, answering nearest-hit queries in sub-linear time.

use ember_core::Point;
use ember_math::{Aabb, Ray};

use crate::Triangle;

/// BVH node: either a branch with two owned children or a leaf with a
/// small triangle list.
///
/// An enum with exclusive child ownership makes deep copy and drop safe
/// without any pointer juggling; `Clone` recursively duplicates the tree.
#[derive(Clone, Debug)]
pub enum Bvh {
    /// Internal node bounding both children.
    Branch {
        bbox: Aabb,
        left: Box<Bvh>,
        right: Box<Bvh>,
    },
    /// Leaf node holding at most `leaf_limit` triangles.
    Leaf { bbox: Aabb, triangles: Vec<Triangle> },
    /// No geometry at all.
    Empty,
}

impl Bvh {
    /// Build a BVH over a triangle list.
    ///
    /// `leaf_limit` is the largest triangle count a leaf may hold; the
    /// split is always at the median index of the dominant-axis centroid
    /// order, so the tree is balanced by count, not by surface area.
    pub fn new(triangles: Vec<Triangle>, leaf_limit: usize) -> Self {
        if triangles.is_empty() {
            return Bvh::Empty;
        }
        Self::build(triangles, leaf_limit.max(1))
    }

    fn build(mut triangles: Vec<Triangle>, leaf_limit: usize) -> Self {
        let bbox = triangles
            .iter()
            .fold(Aabb::EMPTY, |mut acc, tri| {
                acc.combine(&tri.aabb());
                acc
            });

        if triangles.len() <= leaf_limit {
            return Bvh::Leaf { bbox, triangles };
        }

        // Dominant axis of the covering box; ties resolve X > Y > Z
        let axis = bbox.longest_axis();
        triangles.sort_unstable_by(|a, b| {
            a.center()[axis]
                .partial_cmp(&b.center()[axis])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        // Median split by object count
        let mid = triangles.len() / 2;
        let right_triangles = triangles.split_off(mid);
        let left_triangles = triangles;

        Bvh::Branch {
            bbox,
            left: Box::new(Self::build(left_triangles, leaf_limit)),
            right: Box::new(Self::build(right_triangles, leaf_limit)),
        }
    }

    /// Nearest intersection of a ray with the subtree.
    ///
    /// A failed box test prunes the whole subtree. Branches visit both
    /// children and keep the nearer hit; leaves linear-scan.
    pub fn intersect(&self, ray: &Ray, epsilon: f32) -> Option<(f32, Point)> {
        match self {
            Bvh::Empty => None,

            Bvh::Leaf { bbox, triangles } => {
                if !bbox.hit(ray, epsilon) {
                    return None;
                }
                let mut nearest: Option<(f32, Point)> = None;
                for tri in triangles {
                    if let Some((t, point)) = tri.intersect(ray, epsilon) {
                        if nearest.map_or(true, |(best, _)| t < best) {
                            nearest = Some((t, point));
                        }
                    }
                }
                nearest
            }

            Bvh::Branch { bbox, left, right } => {
                if !bbox.hit(ray, epsilon) {
                    return None;
                }
                let hit_left = left.intersect(ray, epsilon);
                let hit_right = right.intersect(ray, epsilon);
                match (hit_left, hit_right) {
                    (Some(l), Some(r)) => Some(if l.0 < r.0 { l } else { r }),
                    (hit, None) | (None, hit) => hit,
                }
            }
        }
    }

    /// The box bounding this subtree.
    pub fn bounding_box(&self) -> Aabb {
        match self {
            Bvh::Empty => Aabb::EMPTY,
            Bvh::Leaf { bbox, .. } | Bvh::Branch { bbox, .. } => *bbox,
        }
    }
}
