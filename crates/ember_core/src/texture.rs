//! Texture lookup for materials.
//!
//! A [`Texture`] is an opaque "color by uv" object. It may be empty, in
//! which case lookups return the identity color so untextured surfaces
//! shade with their material color alone.

use std::path::Path;

use ember_math::{Vec2, Vec3};
use thiserror::Error;

/// Errors that can occur while decoding a texture image.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("failed to load texture: {0}")]
    Load(String),

    #[error("image decoding error: {0}")]
    Image(#[from] image::ImageError),
}

/// Pixel data behind a non-empty texture.
#[derive(Clone, Debug)]
struct TextureImage {
    width: u32,
    height: u32,
    /// Linear RGB, row-major.
    pixels: Vec<[f32; 3]>,
}

/// A 2-D color lookup, possibly absent.
#[derive(Clone, Debug, Default)]
pub struct Texture {
    image: Option<TextureImage>,
}

impl Texture {
    /// The empty texture: every lookup returns white.
    pub fn empty() -> Self {
        Self { image: None }
    }

    /// Build a texture from raw linear RGB pixels, row-major.
    ///
    /// An empty pixel buffer yields the empty texture.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<[f32; 3]>) -> Self {
        if pixels.is_empty() || width == 0 || height == 0 {
            return Self::empty();
        }
        debug_assert_eq!(pixels.len(), (width * height) as usize);
        Self {
            image: Some(TextureImage {
                width,
                height,
                pixels,
            }),
        }
    }

    /// Load a texture from an image file, converting sRGB to linear.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|e| TextureError::Load(format!("{}: {}", path.display(), e)))?;

        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();
        let pixels: Vec<[f32; 3]> = rgb
            .pixels()
            .map(|p| {
                [
                    srgb_to_linear(p[0]),
                    srgb_to_linear(p[1]),
                    srgb_to_linear(p[2]),
                ]
            })
            .collect();

        log::debug!(
            "loaded texture {} ({}x{})",
            path.display(),
            width,
            height
        );

        Ok(Self::from_pixels(width, height, pixels))
    }

    /// True if no image backs this texture.
    pub fn is_empty(&self) -> bool {
        self.image.is_none()
    }

    /// Look up the color at a uv coordinate.
    ///
    /// Bilinear filtering with wrap addressing; the empty texture returns
    /// white.
    pub fn color(&self, uv: Vec2) -> Vec3 {
        let Some(image) = &self.image else {
            return Vec3::ONE;
        };

        let u = uv.x.rem_euclid(1.0);
        let v = uv.y.rem_euclid(1.0);

        let x = u * (image.width as f32 - 1.0);
        let y = v * (image.height as f32 - 1.0);

        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let x1 = (x0 + 1).min(image.width - 1);
        let y1 = (y0 + 1).min(image.height - 1);

        let fx = x.fract();
        let fy = y.fract();

        let p00 = image.pixel(x0, y0);
        let p10 = image.pixel(x1, y0);
        let p01 = image.pixel(x0, y1);
        let p11 = image.pixel(x1, y1);

        let top = p00.lerp(p10, fx);
        let bottom = p01.lerp(p11, fx);
        top.lerp(bottom, fy)
    }
}

impl TextureImage {
    fn pixel(&self, x: u32, y: u32) -> Vec3 {
        let p = self.pixels[(y * self.width + x) as usize];
        Vec3::new(p[0], p[1], p[2])
    }
}

/// Convert an sRGB byte value to linear float.
fn srgb_to_linear(value: u8) -> f32 {
    let v = value as f32 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}
