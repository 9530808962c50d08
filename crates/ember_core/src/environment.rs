//! Environment background light.

use std::f32::consts::PI;

use ember_math::{Vec2, Vec3};

use crate::Texture;

/// An infinite background light sampled by direction.
///
/// The backing texture is interpreted as an equirectangular (lat-long)
/// map. An empty texture means no environment: lookups return black.
#[derive(Clone, Debug, Default)]
pub struct Environment {
    texture: Texture,
}

impl Environment {
    /// Wrap a lat-long texture as an environment.
    pub fn new(texture: Texture) -> Self {
        Self { texture }
    }

    /// The absent environment (black in every direction).
    pub fn none() -> Self {
        Self {
            texture: Texture::empty(),
        }
    }

    /// True if there is no backing map.
    pub fn is_empty(&self) -> bool {
        self.texture.is_empty()
    }

    /// Radiance arriving from a direction.
    ///
    /// Directions map to spherical coordinates: the horizontal angle gives
    /// u, the elevation gives v. The poles compress, as lat-long maps do.
    pub fn color(&self, direction: Vec3) -> Vec3 {
        if self.texture.is_empty() {
            return Vec3::ZERO;
        }
        let u = 0.5 - f32::atan2(-direction.z, -direction.x) / (2.0 * PI);
        let v = 0.5 - f32::asin(direction.y.clamp(-1.0, 1.0)) / PI;
        self.texture.color(Vec2::new(u, v))
    }
}
