//! Scene construction input contracts.
//!
//! An importer (model parser, test fixture, procedural builder) produces a
//! [`SceneData`]: triangle soups tagged with resolved material parameters
//! and optional textures, plus optional emissive overrides and an optional
//! background map. The renderer consumes nothing else.

use std::collections::HashMap;

use ember_math::Vec3;
use thiserror::Error;

use crate::{Environment, Point, Texture};

/// Errors surfaced while turning imported data into a renderable scene.
#[derive(Error, Debug)]
pub enum SceneError {
    /// Import yielded no geometry. Rendering would silently produce a
    /// black image indistinguishable from a correctly dark scene, so this
    /// is a distinct signal instead.
    #[error("scene contains no meshes")]
    EmptyScene,

    /// A light source has no area to sample from.
    #[error("mesh '{0}' has zero surface area and cannot be sampled")]
    DegenerateMesh(String),
}

/// Resolved material parameters for one triangle soup.
///
/// Which reflectance model applies is encoded by `ior`: above 1 the
/// surface is a dielectric (glass), otherwise a Phong opaque surface.
#[derive(Clone, Debug)]
pub struct MaterialParams {
    /// Material name, used to match emissive overrides.
    pub name: String,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub emissive: Vec3,
    pub shininess: f32,
    /// Transmitted color for dielectrics.
    pub transmittance: Vec3,
    /// Index of refraction; > 1 selects the dielectric model.
    pub ior: f32,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            name: String::new(),
            diffuse: Vec3::new(0.5, 0.5, 0.5),
            specular: Vec3::ZERO,
            emissive: Vec3::ZERO,
            shininess: 1.0,
            transmittance: Vec3::ONE,
            ior: 0.0,
        }
    }
}

impl MaterialParams {
    /// Create opaque diffuse parameters with just a name and color.
    pub fn diffuse(name: impl Into<String>, diffuse: Vec3) -> Self {
        Self {
            name: name.into(),
            diffuse,
            ..Default::default()
        }
    }

    /// True if the material emits light.
    pub fn is_emissive(&self) -> bool {
        self.emissive.length_squared() > 0.0
    }
}

/// One triangle soup with its material and optional texture.
#[derive(Clone, Debug)]
pub struct MeshData {
    /// Triangles as vertex triples; winding fixes the geometric normal.
    pub triangles: Vec<[Point; 3]>,
    pub material: MaterialParams,
    pub texture: Texture,
}

impl MeshData {
    /// Create an untextured mesh.
    pub fn new(triangles: Vec<[Point; 3]>, material: MaterialParams) -> Self {
        Self {
            triangles,
            material,
            texture: Texture::empty(),
        }
    }

    /// Attach a diffuse texture.
    pub fn with_texture(mut self, texture: Texture) -> Self {
        self.texture = texture;
        self
    }
}

/// Everything the renderer needs to build a scene.
#[derive(Clone, Debug, Default)]
pub struct SceneData {
    pub meshes: Vec<MeshData>,
    /// Emission overrides keyed by material name, applied at scene build.
    /// This is how area lights are usually declared: the model file gives
    /// the geometry, a sidecar gives the radiance.
    pub emissive_overrides: HashMap<String, Vec3>,
    /// Optional background light.
    pub environment: Environment,
}

impl SceneData {
    /// Start an empty scene description.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mesh.
    pub fn push(&mut self, mesh: MeshData) {
        self.meshes.push(mesh);
    }

    /// Declare an emission override for a material name.
    pub fn override_emissive(&mut self, material_name: impl Into<String>, radiance: Vec3) {
        self.emissive_overrides.insert(material_name.into(), radiance);
    }
}
