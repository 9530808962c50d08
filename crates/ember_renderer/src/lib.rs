//! Ember Renderer - CPU Path Tracing
//!
//! A Monte Carlo path tracer for physically-based rendering: BVH-accelerated
//! triangle meshes, Phong and dielectric materials, area-light sampling with
//! next-event estimation, and pass-based parallel rendering over rayon.

mod bvh;
mod camera;
mod film;
mod material;
mod mesh;
mod scene;
mod settings;
mod triangle;

pub use bvh::Bvh;
pub use camera::Camera;
pub use film::Film;
pub use material::Material;
pub use mesh::Mesh;
pub use scene::{Scene, SceneHit};
pub use settings::{RenderSettings, ThresholdMethod};
pub use triangle::Triangle;

/// Re-export the scene-description types from ember_core
pub use ember_core::{
    Environment, MaterialParams, MeshData, Point, SceneData, SceneError, Texture,
};
/// Re-export common math types from ember_math
pub use ember_math::{Aabb, Interval, Ray, Vec2, Vec3};
