//! A renderable mesh: BVH, material, texture, and area table.

use ember_core::{MeshData, Point, Texture};
use ember_math::{Ray, Vec2, Vec3};
use rand::Rng;

use crate::{Bvh, Material, RenderSettings};

/// One object of the scene: a triangle set behind a BVH, one material,
/// one optional texture, and per-triangle areas for light sampling.
///
/// The triangle list handed to the BVH is the same set the area table is
/// built from, so area-weighted sampling and intersection always agree.
pub struct Mesh {
    /// Per-triangle areas, index-aligned with `triangles`.
    areas: Vec<f32>,
    /// Total surface area; equals the sum of `areas`.
    area: f32,
    triangles: Vec<crate::Triangle>,
    bvh: Bvh,
    material: Material,
    texture: Texture,
}

impl Mesh {
    /// Build a mesh from imported data.
    pub fn new(data: MeshData, material: Material, settings: &RenderSettings) -> Self {
        let triangles: Vec<crate::Triangle> = data
            .triangles
            .into_iter()
            .map(|[p0, p1, p2]| crate::Triangle::new(p0, p1, p2))
            .collect();

        let areas: Vec<f32> = triangles.iter().map(|t| t.area()).collect();
        let area = areas.iter().sum();
        let bvh = Bvh::new(triangles.clone(), settings.bvh_leaf_limit);

        Self {
            areas,
            area,
            triangles,
            bvh,
            material,
            texture: data.texture,
        }
    }

    /// Total surface area.
    pub fn area(&self) -> f32 {
        self.area
    }

    /// The mesh's material.
    pub fn material(&self) -> &Material {
        &self.material
    }

    /// True if the material emits light.
    pub fn is_emissive(&self) -> bool {
        self.material.is_emissive()
    }

    /// Texture color at a uv coordinate; white when untextured.
    pub fn color(&self, uv: Vec2) -> Vec3 {
        self.texture.color(uv)
    }

    /// Nearest intersection of a ray with this mesh.
    pub fn intersect(&self, ray: &Ray, epsilon: f32) -> Option<(f32, Point)> {
        self.bvh.intersect(ray, epsilon)
    }

    /// Draw a point uniformly over the mesh surface.
    ///
    /// Picks a triangle with probability proportional to its area, then
    /// samples it uniformly. Returns `None` for a zero-area mesh instead
    /// of propagating NaN weights.
    pub fn sample(&self, rng: &mut impl Rng) -> Option<Point> {
        if self.area <= 0.0 || self.triangles.is_empty() {
            return None;
        }

        let mut remaining = rng.gen::<f32>() * self.area;
        for (triangle, &area) in self.triangles.iter().zip(&self.areas) {
            remaining -= area;
            if remaining <= 0.0 {
                return Some(triangle.sample(rng));
            }
        }
        // Rounding pushed the draw past the last bucket
        self.triangles.last().map(|t| t.sample(rng))
    }
}
